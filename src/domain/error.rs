//! Domain errors

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::booking::BookingStatus;

#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("Validation: {0}")]
    Validation(String),

    #[error("Slot unavailable: resource {resource_id} already booked between {start} and {end}")]
    SlotUnavailable {
        resource_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid transition: cannot {event} a booking in status {from}")]
    InvalidTransition {
        from: BookingStatus,
        event: &'static str,
    },

    #[error("Booking {id} is locked: status is {status}, edits are only allowed while pending")]
    BookingLocked { id: Uuid, status: BookingStatus },

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// Whether this error is likely transient (e.g. DB connection lost)
    /// and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, DomainError::Storage(_))
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
