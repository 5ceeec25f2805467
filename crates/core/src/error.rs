use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Roster parse error: {0}")]
    Roster(#[from] serde_yaml::Error),

    #[error("Duplicate roster id: {0}")]
    DuplicateRosterId(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
