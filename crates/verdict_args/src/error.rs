use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArgsError {
    #[error("invalid argument payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no object literal found in payload")]
    MissingObject,
}

pub type Result<T> = std::result::Result<T, ArgsError>;
