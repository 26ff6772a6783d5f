// Avatar state persistence
// Versioned JSON envelope behind an injectable key-value adapter

pub mod adapter;
pub mod error;
pub mod format;
pub mod migration;

pub use adapter::{FileStorage, InMemoryStorage, PersistenceAdapter};
pub use error::{SaveError, StorageError};
pub use format::{deserialize_save, serialize_save, AvatarSave, SavedState};
pub use migration::migrate_save;

/// Fixed key of the persisted blob
pub const STORAGE_KEY: &str = "avatar-state-v1";
pub const SAVE_VERSION: u32 = 1;
