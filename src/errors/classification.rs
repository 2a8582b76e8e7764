use super::types::OpsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub exit_code: i32,
}

impl OpsError {
    /// Classify this error to determine how it is reported and which exit code
    /// the process terminates with.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            // Operator errors, raised before any network activity
            OpsError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                exit_code: 2,
            },
            OpsError::Usage(_) => ErrorClassification {
                error_type: "UsageError",
                exit_code: 2,
            },
            OpsError::Cli(_) => ErrorClassification {
                error_type: "UsageError",
                exit_code: 2,
            },

            // Transport
            OpsError::Network(_) => ErrorClassification {
                error_type: "NetworkError",
                exit_code: 3,
            },
            OpsError::Http { .. } => ErrorClassification {
                error_type: "HttpError",
                exit_code: 3,
            },

            OpsError::Authentication(_) => ErrorClassification {
                error_type: "AuthenticationError",
                exit_code: 4,
            },
            OpsError::Resolution(_) => ErrorClassification {
                error_type: "ResolutionError",
                exit_code: 5,
            },

            OpsError::Validation(_) => ErrorClassification {
                error_type: "ValidationError",
                exit_code: 1,
            },
            OpsError::Prompt(_) => ErrorClassification {
                error_type: "PromptError",
                exit_code: 1,
            },
            OpsError::KeyStaging(_) => ErrorClassification {
                error_type: "KeyStagingError",
                exit_code: 1,
            },
            OpsError::Export(_) => ErrorClassification {
                error_type: "ExportError",
                exit_code: 1,
            },
            OpsError::Incomplete(_) => ErrorClassification {
                error_type: "IncompleteError",
                exit_code: 1,
            },
            OpsError::Io(_) => ErrorClassification {
                error_type: "IoError",
                exit_code: 1,
            },
            OpsError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                exit_code: 1,
            },
            OpsError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                exit_code: 1,
            },
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.classify().exit_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_errors_exit_with_usage_code() {
        assert_eq!(OpsError::Config("missing server".into()).exit_code(), 2);
        assert_eq!(OpsError::Usage("no command".into()).exit_code(), 2);
    }

    #[test]
    fn test_resolution_error_has_own_exit_code() {
        let err = OpsError::Resolution("no policy or template matches name 'x'".into());
        assert_eq!(err.classify().error_type, "ResolutionError");
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_http_error_message_includes_status() {
        let err = OpsError::Http {
            status: 404,
            url: "https://scanner:8834/policies/7".into(),
            message: "not found".into(),
        };
        assert_eq!(err.to_string(), "HTTP 404 from https://scanner:8834/policies/7: not found");
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_io_error_defaults_to_generic_failure() {
        let err: OpsError = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert_eq!(err.exit_code(), 1);
    }
}
