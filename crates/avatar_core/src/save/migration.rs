use super::error::SaveError;
use super::format::AvatarSave;
use super::SAVE_VERSION;

/// Bring a loaded blob to the current version and re-establish the state
/// invariants (clamped measurements, bounded history).
pub fn migrate_save(
    mut save: AvatarSave,
    history_capacity: usize,
) -> Result<AvatarSave, SaveError> {
    let original_version = save.version;

    save = match save.version {
        0 => migrate_v0_to_v1(save),
        1 => save, // Current version, no migration needed
        v if v > SAVE_VERSION => {
            // Future version - might be compatible
            log::warn!(
                "Loading avatar state from future version {} (current: {})",
                v,
                SAVE_VERSION
            );
            save
        }
        _ => {
            return Err(SaveError::VersionMismatch { found: save.version, expected: SAVE_VERSION });
        }
    };

    normalize(&mut save, history_capacity);
    save.version = SAVE_VERSION;

    if original_version != SAVE_VERSION {
        save.update_timestamp();
        log::info!("Migrated avatar state from version {} to {}", original_version, SAVE_VERSION);
    }

    Ok(save)
}

/// v0 had no garment selections or fit history; serde defaults filled them
/// empty. Only stale selections need dropping.
fn migrate_v0_to_v1(mut save: AvatarSave) -> AvatarSave {
    log::info!("Migrating avatar state from version 0 to 1");

    let before = save.state.garment_selections.len();
    save.state.garment_selections.retain(|id| !id.trim().is_empty());
    if save.state.garment_selections.len() != before {
        let dropped = before - save.state.garment_selections.len();
        log::warn!("Dropped {} empty garment selections", dropped);
    }

    save
}

fn normalize(save: &mut AvatarSave, history_capacity: usize) {
    let state = &mut save.state;
    state.measurements = state.measurements.normalized();
    state.fit_history.set_capacity(history_capacity);
}

/// Check if a blob needs migration
pub fn needs_migration(save: &AvatarSave) -> bool {
    save.version < SAVE_VERSION
}
