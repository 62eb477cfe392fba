use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid buffer capacity: {0} (must be greater than zero)")]
    InvalidCapacity(usize),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("stream closed")]
    Closed,

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("remote error: {0}")]
    Remote(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// True when the failure came from the underlying source rather than
    /// from how the stream was configured or called.
    pub fn is_source_failure(&self) -> bool {
        matches!(self, Error::Io(_) | Error::NotFound(_) | Error::Remote(_))
    }

    fn io_kind(&self) -> io::ErrorKind {
        match self {
            Error::InvalidCapacity(_) | Error::InvalidArgument(_) | Error::InvalidInput(_) => {
                io::ErrorKind::InvalidInput
            }
            Error::NotFound(_) => io::ErrorKind::NotFound,
            Error::Io(e) => e.kind(),
            Error::Closed | Error::Remote(_) => io::ErrorKind::Other,
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => e,
            other => io::Error::new(other.io_kind(), other),
        }
    }
}
