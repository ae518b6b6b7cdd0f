use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Server error variants.
///
/// Not-found and access-denied collapse on purpose for tenant-owned rows:
/// a cross-tenant read fails closed as "not found" so callers cannot probe
/// for the existence of foreign records.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("tenant not found")]
    TenantNotFound,
    #[error("tenant access denied")]
    TenantAccessDenied,
    #[error("merchant access denied")]
    MerchantAccessDenied,
    #[error("merchant id required")]
    MerchantIdRequired,
    #[error("invalid email")]
    InvalidEmail,
    #[error("missing data")]
    MissingData,
    #[error("merchant not found or access denied")]
    MerchantNotFound,
    #[error("queue not found or access denied")]
    QueueNotFound,
    #[error("queue entry not found or access denied")]
    EntryNotFound,
    #[error("chat session not found or access denied")]
    ChatSessionNotFound,
    #[error("queue is closed")]
    QueueClosed,
    #[error("queue is full")]
    QueueFull,
    #[error("invalid entry status")]
    InvalidEntryStatus,
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ServerError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::TenantNotFound => "TENANT_NOT_FOUND",
            Self::TenantAccessDenied => "TENANT_ACCESS_DENIED",
            Self::MerchantAccessDenied => "MERCHANT_ACCESS_DENIED",
            Self::MerchantIdRequired => "MERCHANT_ID_REQUIRED",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::MissingData => "MISSING_DATA",
            Self::MerchantNotFound => "MERCHANT_NOT_FOUND",
            Self::QueueNotFound => "QUEUE_NOT_FOUND",
            Self::EntryNotFound => "ENTRY_NOT_FOUND",
            Self::ChatSessionNotFound => "CHAT_SESSION_NOT_FOUND",
            Self::QueueClosed => "QUEUE_CLOSED",
            Self::QueueFull => "QUEUE_FULL",
            Self::InvalidEntryStatus => "INVALID_ENTRY_STATUS",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::TenantNotFound
            | Self::MerchantIdRequired
            | Self::InvalidEmail
            | Self::MissingData
            | Self::InvalidEntryStatus => StatusCode::BAD_REQUEST,
            Self::TenantAccessDenied | Self::MerchantAccessDenied => StatusCode::FORBIDDEN,
            Self::MerchantNotFound
            | Self::QueueNotFound
            | Self::EntryNotFound
            | Self::ChatSessionNotFound => StatusCode::NOT_FOUND,
            Self::QueueClosed | Self::QueueFull => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // The original error text never reaches the client; it is logged
        // server-side in full and replaced with a generic body.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, code = "INTERNAL_ERROR", "internal error");
        }
        let body = serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        (status, axum::Json(body)).into_response()
    }
}
