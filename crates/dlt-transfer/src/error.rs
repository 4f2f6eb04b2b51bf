use std::path::PathBuf;

/// Errors from file transfer operations.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// A path argument was empty or otherwise malformed.
    #[error("{0}")]
    InvalidArgument(String),

    /// The source file does not exist.
    #[error("no such file: {}", .0.display())]
    NotFound(PathBuf),

    /// A file with the same name already exists at the destination.
    #[error("destination already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// Any other I/O failure, with its original kind preserved.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransferError {
    /// Returns `true` for the benign destination-collision case that a
    /// merge tolerates.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}

/// Result alias for transfer operations.
pub type TransferResult<T> = Result<T, TransferError>;
