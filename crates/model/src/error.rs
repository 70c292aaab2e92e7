use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Unknown table index {0}")]
    UnknownTable(usize),

    #[error("Duplicate table alias '{0}'")]
    DuplicateTable(String),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
