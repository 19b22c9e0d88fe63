//! Error handling for subprobe

use thiserror::Error;

/// Main error type for subprobe
#[derive(Error, Debug, Clone)]
pub enum SubprobeError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Network error: {message}")]
    Network {
        message: String,
        url: Option<String>,
    },

    #[error("Timeout error: {operation} timed out after {timeout_secs}s")]
    Timeout {
        operation: String,
        timeout_secs: u64,
    },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SubprobeError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>, url: Option<String>) -> Self {
        Self::Network {
            message: message.into(),
            url,
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, timeout_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_secs,
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an IO error
    pub fn io(message: impl Into<String>, path: Option<String>) -> Self {
        Self::Io {
            message: message.into(),
            path,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message } => {
                format!("❌ Configuration problem: {}\n💡 Check your flags, .env file or config file", message)
            }
            Self::Network { message, url } => {
                let target = url.as_ref().map_or(String::new(), |u| format!(" ({})", u));
                format!("❌ Network error{}: {}\n💡 Check your internet connection", target, message)
            }
            Self::Timeout { operation, timeout_secs } => {
                format!("⏱️  Operation '{}' timed out after {}s\n💡 Try increasing --timeout", operation, timeout_secs)
            }
            Self::Parse { message } => {
                format!("❌ Parse error: {}\n💡 Check the config file syntax", message)
            }
            Self::Validation { message } => {
                format!("❌ Validation error: {}\n💡 Labels may only use letters, digits and hyphens, at most 63 characters", message)
            }
            Self::Io { message, path } => {
                let path_info = path.as_ref().map_or(String::new(), |p| format!(" ({})", p));
                format!("❌ File error{}: {}\n💡 Check file permissions and paths", path_info, message)
            }
            Self::Internal { message } => {
                format!("❌ Internal error: {}\n💡 This is a bug, please report it", message)
            }
        }
    }
}

/// Render an error together with its source chain on one line.
///
/// reqwest's top-level message ("error sending request for url ...") hides the
/// actual cause (DNS, refused connection, TLS), which lives in the sources.
pub fn describe_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

/// Convert from common error types
impl From<reqwest::Error> for SubprobeError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string());

        if err.is_timeout() {
            Self::network(format!("request timed out: {}", describe_chain(&err)), url)
        } else if err.is_connect() {
            Self::network(format!("connection failed: {}", describe_chain(&err)), url)
        } else {
            Self::network(describe_chain(&err), url)
        }
    }
}

impl From<serde_json::Error> for SubprobeError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(err.to_string())
    }
}

impl From<std::io::Error> for SubprobeError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string(), None)
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SubprobeError>;

/// Helper macro for configuration errors
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::error::SubprobeError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::SubprobeError::config(format!($fmt, $($arg)*))
    };
}

/// Helper macro for per-field validation errors
#[macro_export]
macro_rules! validation_error {
    ($msg:expr) => {
        $crate::error::SubprobeError::validation($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::SubprobeError::validation(format!($fmt, $($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Inner;

    impl std::fmt::Display for Inner {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "dns error: no record found")
        }
    }

    impl std::error::Error for Inner {}

    #[derive(Debug)]
    struct Outer(Inner);

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "error sending request")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_describe_chain_includes_sources() {
        let text = describe_chain(&Outer(Inner));
        assert_eq!(text, "error sending request: dns error: no record found");
    }

    #[test]
    fn test_config_macro() {
        let err = config_error!("bad length {}", 3);
        assert!(matches!(err, SubprobeError::Config { .. }));
        assert!(err.to_string().contains("bad length 3"));
    }

    #[test]
    fn test_validation_macro() {
        let err = validation_error!("fragment '{}' is not a valid label", "a#");
        assert!(matches!(err, SubprobeError::Validation { .. }));
        assert!(err.user_message().contains("a#"));
    }

    #[test]
    fn test_user_message_hints() {
        let msg = SubprobeError::config("missing domain").user_message();
        assert!(msg.contains("missing domain"));
        assert!(msg.contains("💡"));
    }
}
