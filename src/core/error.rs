use thiserror::Error;

#[derive(Error, Debug)]
pub enum BindError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Ambiguous entity match for parameter: {0}")]
    AmbiguousEntity(String),

    #[error("NLU service error: {0}")]
    Nlu(String),

    #[error("Schema catalog error: {0}")]
    Catalog(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BindError>;
