//! REST request and response bodies.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::protocol::{AlertStatus, User};

// ============================================================================
// Envelopes
// ============================================================================

/// Standard response envelope.
///
/// `data` is absent on most failures, so it is optional here and checked
/// by [`into_data`](Self::into_data).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the server handled the request.
    pub success: bool,
    /// Result payload.
    pub data: Option<T>,
    /// Human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error description when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Fails unless `success` is set.
    pub fn ensure_success(&self, status: u16) -> Result<()> {
        if self.success {
            return Ok(());
        }
        let message = self
            .error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "Request failed".to_string());
        Err(Error::api(status, message))
    }

    /// Returns the payload of a successful response.
    pub fn into_data(self, status: u16) -> Result<T> {
        self.ensure_success(status)?;
        self.data
            .ok_or_else(|| Error::protocol("Response is missing data"))
    }
}

/// Page position reported with list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based page number.
    pub page: u32,
    /// Items per page.
    pub limit: u32,
    /// Total items across all pages.
    pub total: u64,
    /// Page count.
    pub total_pages: u32,
}

/// Paged list envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// Whether the server handled the request.
    pub success: bool,
    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    /// Page position.
    pub pagination: Option<Pagination>,
    /// Human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error description when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Page position.
    pub pagination: Pagination,
}

impl<T> PaginatedResponse<T> {
    /// Returns the page of a successful response.
    pub fn into_page(self, status: u16) -> Result<Page<T>> {
        if !self.success {
            let message = self
                .error
                .or(self.message)
                .unwrap_or_else(|| "Request failed".to_string());
            return Err(Error::api(status, message));
        }
        let pagination = self
            .pagination
            .ok_or_else(|| Error::protocol("Response is missing pagination"))?;
        Ok(Page {
            items: self.data,
            pagination,
        })
    }
}

// ============================================================================
// Auth Bodies
// ============================================================================

/// `POST /auth/login` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Password.
    pub password: String,
}

impl LoginRequest {
    /// Creates a login body.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// `POST /auth/register` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Login email.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Authenticated user.
    pub user: User,
    /// Bearer token.
    pub token: String,
    /// Refresh token.
    pub refresh_token: String,
}

/// `PUT /alerts/:id/status` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct AlertStatusUpdate {
    pub(crate) status: AlertStatus,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_failure_prefers_error_field() {
        let response: ApiResponse<u32> = serde_json::from_value(json!({
            "success": false,
            "message": "generic",
            "error": "Invalid credentials"
        }))
        .unwrap();

        let err = response.into_data(200).unwrap_err();
        assert!(matches!(err, Error::Api { status: 200, ref message } if message == "Invalid credentials"));
    }

    #[test]
    fn test_missing_data_is_protocol_error() {
        let response: ApiResponse<u32> =
            serde_json::from_value(json!({ "success": true })).unwrap();
        assert!(matches!(response.into_data(200), Err(Error::Protocol { .. })));
    }

    #[test]
    fn test_null_data_as_unit() {
        let response: ApiResponse<serde_json::Value> =
            serde_json::from_value(json!({ "success": true, "data": null })).unwrap();
        assert!(response.ensure_success(200).is_ok());
    }

    #[test]
    fn test_page_decodes() {
        let response: PaginatedResponse<u32> = serde_json::from_value(json!({
            "success": true,
            "data": [1, 2, 3],
            "pagination": { "page": 2, "limit": 3, "total": 9, "totalPages": 3 }
        }))
        .unwrap();

        let page = response.into_page(200).unwrap();
        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.pagination.total_pages, 3);
    }

    #[test]
    fn test_register_body_is_camel_case() {
        let body = RegisterRequest {
            first_name: "Ada".into(),
            last_name: "Mugisha".into(),
            email: "ada@example.com".into(),
            password: "secret".into(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["firstName"], "Ada");
        assert_eq!(value["lastName"], "Mugisha");
    }
}
