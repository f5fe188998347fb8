//! Error types for the openHAB provider.

use thiserror::Error;

/// Errors that can occur while serving provider requests.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested resource was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// An internal error, usually a broken host contract (ill-typed attribute values).
    #[error("SDK error: {0}")]
    Sdk(String),

    /// A configuration error occurred, or the provider is not configured yet.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A gRPC transport error occurred.
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// The HTTP request to openHAB could not be sent or its body not read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// openHAB answered with a status the provider does not handle.
    #[error("openHAB API error (HTTP {status}): {message}")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The response body or status text.
        message: String,
    },

    /// Permission denied (invalid or missing API token).
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Rate limit exceeded.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// openHAB is temporarily unavailable.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Operation failed due to current state (e.g. an item that is not editable).
    #[error("Failed precondition: {0}")]
    FailedPrecondition(String),

    /// Operation not supported by the resource.
    #[error("Unimplemented: {0}")]
    Unimplemented(String),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// Get the error message as a string.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(msg) => msg,
            Self::Sdk(msg) => msg,
            Self::Configuration(msg) => msg,
            Self::UnknownResource(msg) => msg,
            Self::Serialization(_err) => "serialization error (see Debug output)",
            Self::Transport(_err) => "transport error (see Debug output)",
            Self::Http(_err) => "http error (see Debug output)",
            Self::Api { message, .. } => message,
            Self::PermissionDenied(msg) => msg,
            Self::ResourceExhausted(msg) => msg,
            Self::Unavailable(msg) => msg,
            Self::FailedPrecondition(msg) => msg,
            Self::Unimplemented(msg) => msg,
            Self::InvalidRequest(msg) => msg,
        }
    }

    /// Classify an unexpected openHAB response status.
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        let message = if body.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        } else {
            body
        };

        match status.as_u16() {
            400 => Self::InvalidRequest(message),
            401 | 403 => Self::PermissionDenied(message),
            404 => Self::NotFound(message),
            405 => Self::FailedPrecondition(message),
            429 => Self::ResourceExhausted(message),
            500..=599 => Self::Unavailable(message),
            code => Self::Api {
                status: code,
                message,
            },
        }
    }
}

impl From<ProviderError> for tonic::Status {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound(msg) => tonic::Status::not_found(msg),
            ProviderError::Configuration(msg) => tonic::Status::failed_precondition(msg),
            ProviderError::UnknownResource(msg) => tonic::Status::not_found(msg),
            ProviderError::Sdk(msg) => tonic::Status::internal(msg),
            ProviderError::Serialization(err) => {
                tonic::Status::invalid_argument(format!("Serialization error: {}", err))
            },
            ProviderError::Transport(err) => {
                tonic::Status::unavailable(format!("Transport error: {}", err))
            },
            ProviderError::Http(err) => {
                tonic::Status::unavailable(format!("HTTP error: {}", err))
            },
            ProviderError::Api { status, message } => {
                tonic::Status::unknown(format!("HTTP {}: {}", status, message))
            },
            ProviderError::PermissionDenied(msg) => tonic::Status::permission_denied(msg),
            ProviderError::ResourceExhausted(msg) => tonic::Status::resource_exhausted(msg),
            ProviderError::Unavailable(msg) => tonic::Status::unavailable(msg),
            ProviderError::FailedPrecondition(msg) => tonic::Status::failed_precondition(msg),
            ProviderError::Unimplemented(msg) => tonic::Status::unimplemented(msg),
            ProviderError::InvalidRequest(msg) => tonic::Status::invalid_argument(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_error_display() {
        let err = ProviderError::NotFound("item Kitchen_Light".to_string());
        assert_eq!(format!("{}", err), "Resource not found: item Kitchen_Light");

        let err = ProviderError::UnknownResource("openhab_thing".to_string());
        assert_eq!(format!("{}", err), "Unknown resource type: openhab_thing");

        let err = ProviderError::Api {
            status: 418,
            message: "teapot".to_string(),
        };
        assert_eq!(format!("{}", err), "openHAB API error (HTTP 418): teapot");
    }

    #[test]
    fn test_from_status() {
        let err = ProviderError::from_status(StatusCode::UNAUTHORIZED, String::new());
        assert!(matches!(err, ProviderError::PermissionDenied(_)));
        assert_eq!(err.message(), "Unauthorized");

        let err = ProviderError::from_status(StatusCode::METHOD_NOT_ALLOWED, "not editable".into());
        assert!(matches!(err, ProviderError::FailedPrecondition(_)));
        assert_eq!(err.message(), "not editable");

        let err = ProviderError::from_status(StatusCode::BAD_GATEWAY, String::new());
        assert!(matches!(err, ProviderError::Unavailable(_)));

        let err = ProviderError::from_status(StatusCode::CONFLICT, "conflict".into());
        assert!(matches!(err, ProviderError::Api { status: 409, .. }));
    }

    #[test]
    fn test_error_to_status() {
        let err = ProviderError::NotFound("test".to_string());
        let status: tonic::Status = err.into();
        assert_eq!(status.code(), tonic::Code::NotFound);

        let err = ProviderError::Configuration("test".to_string());
        let status: tonic::Status = err.into();
        assert_eq!(status.code(), tonic::Code::FailedPrecondition);

        let err = ProviderError::Sdk("test".to_string());
        let status: tonic::Status = err.into();
        assert_eq!(status.code(), tonic::Code::Internal);

        let err = ProviderError::PermissionDenied("test".to_string());
        let status: tonic::Status = err.into();
        assert_eq!(status.code(), tonic::Code::PermissionDenied);

        let err = ProviderError::Unimplemented("test".to_string());
        let status: tonic::Status = err.into();
        assert_eq!(status.code(), tonic::Code::Unimplemented);
    }

    #[test]
    fn test_message_method() {
        let err = ProviderError::Configuration("endpoint is not a URL".to_string());
        assert_eq!(err.message(), "endpoint is not a URL");

        let err = ProviderError::Api {
            status: 409,
            message: "conflict".to_string(),
        };
        assert_eq!(err.message(), "conflict");
    }
}
