//! Domain error types for server startup.
//!
//! Startup composes every library crate; each step maps its crate's error
//! into a `StartupError` and the `?` operator turns that into a rootcause
//! `Report`.

use std::fmt;

/// Reasons the server fails to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupError {
    /// A startup argument is not of the form `--key=value`.
    InvalidArgument { argument: String },
    /// The layered configuration could not be loaded.
    Configuration { details: String },
    /// Documentation metadata could not be bound.
    Documentation { details: String },
    /// A connection factory could not be created or registered.
    ConnectionFactory { details: String },
    /// The security chain is inconsistent.
    SecurityChain { details: String },
    /// The listener could not be bound.
    Bind { addr: String, details: String },
    /// The server stopped with an error.
    Serve { details: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { argument } => {
                write!(f, "invalid startup argument '{argument}', expected --key=value")
            }
            Self::Configuration { details } => write!(f, "invalid configuration: {details}"),
            Self::Documentation { details } => {
                write!(f, "failed to load documentation projects: {details}")
            }
            Self::ConnectionFactory { details } => {
                write!(f, "connection factory setup failed: {details}")
            }
            Self::SecurityChain { details } => {
                write!(f, "security chain setup failed: {details}")
            }
            Self::Bind { addr, details } => write!(f, "failed to bind {addr}: {details}"),
            Self::Serve { details } => write!(f, "server error: {details}"),
        }
    }
}

impl std::error::Error for StartupError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_display() {
        let err = StartupError::InvalidArgument {
            argument: "verbose".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid startup argument 'verbose', expected --key=value"
        );
    }

    #[test]
    fn bind_display_names_address() {
        let err = StartupError::Bind {
            addr: "127.0.0.1:80".to_string(),
            details: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("127.0.0.1:80"));
    }
}
