//! Error types for the GridFan system

use thiserror::Error;

/// The four failure classes a controller operation can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport could not be opened or written, or the device stayed silent
    CommunicationFailure,
    /// The device answered, but not with what the command expects
    UnexpectedResponse,
    /// A channel, speed or command shape was rejected before any I/O
    InvalidArgument,
    /// The engine was misused
    InternalError,
}

/// Core error type for GridFan operations
#[derive(Error, Debug)]
pub enum GridFanError {
    /// Transport open/write errors, or no response where data was expected
    #[error("Communication failure: {0}")]
    CommunicationFailure(String),

    /// Wrong-length or semantically invalid response
    #[error("Unexpected response from controller: {0}")]
    UnexpectedResponse(String),

    /// Invalid input or arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Engine misuse
    #[error("Internal error: {0}")]
    Internal(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GridFanError {
    /// Classify this error into the controller's failure taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            GridFanError::CommunicationFailure(_) | GridFanError::Io(_) => {
                ErrorKind::CommunicationFailure
            }
            GridFanError::UnexpectedResponse(_) => ErrorKind::UnexpectedResponse,
            GridFanError::InvalidArgument(_) | GridFanError::Config(_) => {
                ErrorKind::InvalidArgument
            }
            GridFanError::Internal(_) => ErrorKind::InternalError,
        }
    }
}

/// Result type alias for GridFan operations
pub type Result<T> = std::result::Result<T, GridFanError>;

impl From<toml::de::Error> for GridFanError {
    fn from(err: toml::de::Error) -> Self {
        GridFanError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GridFanError = io_err.into();

        match err {
            GridFanError::Io(ref e) => {
                assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("Expected Io error"),
        }
        assert_eq!(err.kind(), ErrorKind::CommunicationFailure);
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("= nope").unwrap_err();
        let err: GridFanError = toml_err.into();

        assert!(matches!(err, GridFanError::Config(_)));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            GridFanError::CommunicationFailure("x".into()).kind(),
            ErrorKind::CommunicationFailure
        );
        assert_eq!(
            GridFanError::UnexpectedResponse("x".into()).kind(),
            ErrorKind::UnexpectedResponse
        );
        assert_eq!(
            GridFanError::InvalidArgument("x".into()).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            GridFanError::Internal("x".into()).kind(),
            ErrorKind::InternalError
        );
    }

    #[test]
    fn test_error_display() {
        let err = GridFanError::InvalidArgument("Fan channel must be between 1 and 6.".into());
        assert_eq!(
            format!("{}", err),
            "Invalid argument: Fan channel must be between 1 and 6."
        );

        let err = GridFanError::UnexpectedResponse("[02]".into());
        assert_eq!(
            format!("{}", err),
            "Unexpected response from controller: [02]"
        );
    }
}
