use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database file not found: {0}")]
    DatabaseMissing(String),
}

pub type Result<T> = std::result::Result<T, LibraryError>;
