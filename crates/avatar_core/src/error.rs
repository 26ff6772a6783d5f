use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog contains no usable garments")]
    Empty,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid config: {0}")]
    Inconsistent(String),
}
