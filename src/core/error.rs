//! Error types for the logfmt layout

pub type Result<T> = std::result::Result<T, LayoutError>;

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// Invalid configuration with details
    ///
    /// Raised only while a layout is being built, never while encoding.
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Settings could not be deserialized
    #[error("Invalid settings: {0}")]
    SettingsError(#[from] serde_json::Error),
}

impl LayoutError {
    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LayoutError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LayoutError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Whether this error was raised by configuration validation
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LayoutError::InvalidConfiguration { .. } | LayoutError::SettingsError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LayoutError::config("Label", "name cannot be empty");
        assert!(matches!(err, LayoutError::InvalidConfiguration { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_error_display() {
        let err = LayoutError::config("LabelEmitter", "no resolver available");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for LabelEmitter: no resolver available"
        );
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = LayoutError::io_operation("writing encoded line", "destination closed", io_err);

        assert!(matches!(err, LayoutError::IoOperation { .. }));
        assert!(!err.is_configuration());
        assert!(err.to_string().contains("writing encoded line"));
        assert!(err.to_string().contains("destination closed"));
    }

    #[test]
    fn test_settings_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: LayoutError = json_err.into();
        assert!(err.is_configuration());
        assert!(err.to_string().starts_with("Invalid settings:"));
    }
}
