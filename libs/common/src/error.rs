use thiserror::Error;

/// Basic library error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Logging bootstrap error
    #[error("Logging error: {0}")]
    Logging(String),
}

/// Error result type
pub type Result<T> = std::result::Result<T, Error>;

// Figment error converting
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(err.to_string())
    }
}
