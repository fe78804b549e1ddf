//! Shared types for the second-opinion backend and its HTTP clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =====================================================
// Domain Types
// =====================================================

/// A single stored medical note.
///
/// Notes are append-only: once written, `details` and `created_at` never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalDetail {
    pub id: i64,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

// =====================================================
// Form Types
// =====================================================

/// `POST /medical-details`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateDetailForm {
    #[serde(default)]
    pub details: Option<String>,
}

/// `POST /delete-detail`
///
/// The id arrives as raw form text so a missing or malformed value can be
/// reported in the response body instead of failing extraction.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DeleteDetailForm {
    #[serde(default)]
    pub id: Option<String>,
}

// =====================================================
// Response Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateDetailResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<MedicalDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CreateDetailResponse {
    pub fn ok(detail: MedicalDetail) -> Self {
        Self {
            ok: true,
            detail: Some(detail),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            detail: None,
            error: Some(msg.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteDetailResponse {
    pub ok: bool,
    /// Whether a row was actually removed. Deleting an unknown id is still `ok`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeleteDetailResponse {
    pub fn ok(deleted: bool) -> Self {
        Self {
            ok: true,
            deleted: Some(deleted),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            deleted: None,
            error: Some(msg.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListDetailsResponse {
    pub ok: bool,
    #[serde(default)]
    pub details: Vec<MedicalDetail>,
}

/// Generic failure body used when an action fails outside its own response shape.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_response_omits_empty_fields() {
        let json = serde_json::to_value(DeleteDetailResponse::err("No id provided")).unwrap();
        assert_eq!(json, serde_json::json!({ "ok": false, "error": "No id provided" }));

        let json = serde_json::to_value(DeleteDetailResponse::ok(false)).unwrap();
        assert_eq!(json, serde_json::json!({ "ok": true, "deleted": false }));
    }

    #[test]
    fn test_forms_tolerate_missing_fields() {
        let form: DeleteDetailForm = serde_json::from_str("{}").unwrap();
        assert!(form.id.is_none());

        let form: CreateDetailForm = serde_json::from_str(r#"{"details":"fever"}"#).unwrap();
        assert_eq!(form.details.as_deref(), Some("fever"));
    }
}
