use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

/// Field-level validation messages returned by the backend on 422.
///
/// The payload carries a human-readable `message` plus a map of field name
/// to the messages for that field. The map is preserved verbatim so forms
/// can render per-field feedback without re-parsing raw error bodies.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ValidationErrors {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: HashMap<String, Vec<String>>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - session is no longer valid")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Security token expired (419)")]
    CsrfExpired,

    #[error("Validation failed: {}", .0.message)]
    Validation(ValidationErrors),

    #[error("Login rejected: {0}")]
    LoginRejected(String),

    #[error("Login response did not include an access token")]
    MissingToken,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data.
    /// Body text can be Arabic, so back off to a char boundary.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            419 => ApiError::CsrfExpired,
            422 => {
                let payload = serde_json::from_str::<ValidationErrors>(body).unwrap_or_else(|_| {
                    ValidationErrors {
                        message: truncated,
                        errors: HashMap::new(),
                    }
                });
                ApiError::Validation(payload)
            }
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }
}
