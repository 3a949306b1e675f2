//! Response envelope expected by callers of the core.
//!
//! `{ "success": bool, "data"?: T, "error"?: { "code", "message", "details"? } }`

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Error body of the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Machine-readable error code (e.g. `CONFLICT`).
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Optional structured details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Response envelope wrapping either data or an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Payload on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    /// Wraps a successful payload.
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Wraps an error.
    #[must_use]
    pub fn err(error: &AppError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError::from(error)),
        }
    }
}

impl From<&AppError> for ApiError {
    fn from(error: &AppError) -> Self {
        Self {
            code: error.error_code().to_string(),
            message: error.message().to_string(),
            details: None,
        }
    }
}

impl<T> From<AppResult<T>> for ApiResponse<T> {
    fn from(result: AppResult<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_serializes_integer_amounts() {
        let response = ApiResponse::ok(json!({ "balance": 50_000_i64 }));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({ "success": true, "data": { "balance": 50000 } }));
    }

    #[test]
    fn test_error_envelope() {
        let result: AppResult<i64> = Err(AppError::BadRequest("insufficient balance".into()));
        let response = ApiResponse::from(result);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "success": false,
                "error": { "code": "BAD_REQUEST", "message": "insufficient balance" }
            })
        );
    }

    #[test]
    fn test_envelope_roundtrip_keeps_data() {
        let raw = r#"{"success":true,"data":30000}"#;
        let parsed: ApiResponse<i64> = serde_json::from_str(raw).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.data, Some(30_000));
        assert!(parsed.error.is_none());
    }
}
