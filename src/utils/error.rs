use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("feed request failed: {0}")]
    Feed(#[from] reqwest::Error),

    #[error("feed returned unusable payload: {message}")]
    Adapter { message: String },

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error in {field}: {message}")]
    Config { field: String, message: String },

    #[error("store rejected write for player {player}: {message}")]
    StoreWrite { player: String, message: String },
}

pub type Result<T> = std::result::Result<T, SyncError>;
