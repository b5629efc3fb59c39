//! Mapping from domain errors to HTTP responses
//!
//! Every domain error variant maps to a distinct, inspectable status
//! so clients can react to slot conflicts, lifecycle violations and
//! locked bookings without parsing message strings.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::ApiResponse;
use crate::domain::DomainError;

/// Wrapper that lets handlers return `DomainError` with `?`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::SlotUnavailable { .. }
            | DomainError::InvalidTransition { .. }
            | DomainError::BookingLocked { .. }
            | DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Storage details stay in the log, not in the client response.
        let message = match &self.0 {
            DomainError::Storage(_) => {
                tracing::error!(error = %self.0, "Storage error surfaced to API");
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BookingStatus;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn status_mapping() {
        let cases = [
            (
                DomainError::Validation("bad".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                DomainError::SlotUnavailable {
                    resource_id: Uuid::new_v4(),
                    start: Utc::now(),
                    end: Utc::now(),
                },
                StatusCode::CONFLICT,
            ),
            (
                DomainError::InvalidTransition {
                    from: BookingStatus::Rejected,
                    event: "approve",
                },
                StatusCode::CONFLICT,
            ),
            (
                DomainError::BookingLocked {
                    id: Uuid::new_v4(),
                    status: BookingStatus::Approved,
                },
                StatusCode::CONFLICT,
            ),
            (
                DomainError::NotFound {
                    entity: "Booking",
                    field: "id",
                    value: "x".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                DomainError::Conflict("duplicate".into()),
                StatusCode::CONFLICT,
            ),
            (
                DomainError::Storage("db gone".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).status_code(), expected);
        }
    }
}
