use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

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
    /// The cut must land on a char boundary; bodies can echo non-ASCII
    /// user input.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut cut = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..cut],
                body.len()
            )
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            400 => ApiError::Validation(truncated),
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// True when this is an auth failure the UI should treat as a forced
    /// logout (the refresh protocol already ran and did not recover).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "{\"detail\": \"Only admin can approve.\"}"),
            ApiError::AccessDenied(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, "{\"units\": [\"required\"]}"),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, ""),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, ""),
            ApiError::ServerError(_)
        ));
    }

    #[test]
    fn test_long_bodies_are_truncated() {
        let body = "x".repeat(2000);
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        let msg = err.to_string();
        assert!(msg.len() < 700);
        assert!(msg.contains("truncated"));
    }

    #[test]
    fn test_truncation_lands_on_char_boundary() {
        // 3 bytes per char, so the byte limit falls mid-character
        let body = "あ".repeat(200);
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        let msg = err.to_string();
        assert!(msg.contains("truncated"));
        assert!(msg.contains("600 total bytes"));

        // Mixed ASCII and multibyte around the limit
        let body = format!("{}é{}", "x".repeat(499), "y".repeat(100));
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, &body);
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_is_unauthorized() {
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert!(!ApiError::NotFound(String::new()).is_unauthorized());
    }
}
