//! Application error types with rich context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Intake Errors (client-facing)
    // ─────────────────────────────────────────────────────────────
    #[error("Too many messages (queue capacity {capacity})")]
    QueueFull { capacity: usize },

    #[error("Unrecognized argument: {key}")]
    UnrecognizedArgument { key: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    // ─────────────────────────────────────────────────────────────
    // Render Process Errors
    // ─────────────────────────────────────────────────────────────
    #[error("No media files found in: {dir}")]
    NoMediaFound { dir: PathBuf },

    #[error("Render executable not found: {program}")]
    ExecutableNotFound { program: PathBuf },

    #[error("Failed to launch {program}: {reason}")]
    ProcessLaunch { program: PathBuf, reason: String },

    #[error("Render process error: {message}")]
    Process { message: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration: {message}")]
    ConfigInvalid { message: String },

    // ─────────────────────────────────────────────────────────────
    // Runtime Errors
    // ─────────────────────────────────────────────────────────────
    #[error("HTTP server error: {message}")]
    Server { message: String },

    #[error("Signal handling error: {message}")]
    Signal { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn queue_full(capacity: usize) -> Self {
        Self::QueueFull { capacity }
    }

    pub fn unrecognized_argument(key: impl Into<String>) -> Self {
        Self::UnrecognizedArgument { key: key.into() }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn no_media_found(dir: impl Into<PathBuf>) -> Self {
        Self::NoMediaFound { dir: dir.into() }
    }

    pub fn process_launch(program: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ProcessLaunch {
            program: program.into(),
            reason: reason.into(),
        }
    }

    pub fn process(message: impl Into<String>) -> Self {
        Self::Process {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            message: message.into(),
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    pub fn signal(message: impl Into<String>) -> Self {
        Self::Signal {
            message: message.into(),
        }
    }

    /// Errors caused by the HTTP client; answered with a 400 and never retried
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::QueueFull { .. } | Error::UnrecognizedArgument { .. } | Error::InvalidRequest { .. }
        )
    }

    /// Check if this is a recoverable error
    ///
    /// The arbiter retries (demos) or skips (text) on these.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::NoMediaFound { .. }
                | Error::ExecutableNotFound { .. }
                | Error::ProcessLaunch { .. }
                | Error::Process { .. }
        )
    }

    /// Check if this error should trigger application exit
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::ConfigNotFound { .. }
                | Error::ConfigInvalid { .. }
                | Error::Server { .. }
                | Error::Signal { .. }
        )
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::queue_full(10);
        assert_eq!(err.to_string(), "Too many messages (queue capacity 10)");

        let err = Error::unrecognized_argument("unknownkey");
        assert_eq!(err.to_string(), "Unrecognized argument: unknownkey");

        let err = Error::no_media_found("/home/pi/videos");
        assert_eq!(err.to_string(), "No media files found in: /home/pi/videos");

        let err = Error::process_launch("/opt/demo", "permission denied");
        assert_eq!(err.to_string(), "Failed to launch /opt/demo: permission denied");
    }

    #[test]
    fn test_client_errors() {
        assert!(Error::queue_full(10).is_client_error());
        assert!(Error::unrecognized_argument("x").is_client_error());
        assert!(Error::invalid_request("missing message").is_client_error());
        assert!(!Error::no_media_found("/tmp").is_client_error());
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(Error::no_media_found("/tmp").is_recoverable());
        assert!(Error::process_launch("/bin/x", "boom").is_recoverable());
        assert!(Error::ExecutableNotFound {
            program: PathBuf::from("/bin/x")
        }
        .is_recoverable());
        assert!(!Error::queue_full(1).is_recoverable());
    }

    #[test]
    fn test_fatal_errors() {
        assert!(Error::config_invalid("capacity must be at least 1").is_fatal());
        assert!(Error::server("bind failed").is_fatal());
        assert!(!Error::process("exited").is_fatal());
        assert!(Error::signal("no handler").is_fatal());
        assert!(!Error::queue_full(1).is_fatal());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_result_ext_keeps_error() {
        let res: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = res.context("reading media dir").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
