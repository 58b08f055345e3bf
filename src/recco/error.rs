#[derive(Debug, thiserror::Error)]
pub enum ReccoError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config field {field}: {reason}")]
    InvalidConfig { field: String, reason: String },
}
