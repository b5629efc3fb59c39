//! Resource availability checking
//!
//! A candidate window is unavailable when any booking on the same
//! resource in a confirmed-occupying status (approved or paid)
//! strictly overlaps it. Back-to-back bookings, where one ends exactly
//! when another starts, are allowed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult, RepositoryProvider};

/// Pure query over current booking state; no side effects.
pub struct AvailabilityChecker {
    repos: Arc<dyn RepositoryProvider>,
}

impl AvailabilityChecker {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Whether `[start, end)` is free on the resource.
    ///
    /// `exclude_booking_id` omits a booking's own prior self on the
    /// update path.
    pub async fn is_available(
        &self,
        resource_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_booking_id: Option<Uuid>,
    ) -> DomainResult<bool> {
        if start >= end {
            return Err(DomainError::Validation(
                "start_time must be strictly before end_time".to_string(),
            ));
        }

        let overlapping = self
            .repos
            .bookings()
            .find_overlapping(resource_id, start, end, exclude_booking_id)
            .await?;
        Ok(overlapping.is_empty())
    }

    /// Like [`is_available`](Self::is_available), but resolves the
    /// unavailable case to a `SlotUnavailable` error.
    pub async fn ensure_available(
        &self,
        resource_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_booking_id: Option<Uuid>,
    ) -> DomainResult<()> {
        if self
            .is_available(resource_id, start, end, exclude_booking_id)
            .await?
        {
            Ok(())
        } else {
            Err(DomainError::SlotUnavailable {
                resource_id,
                start,
                end,
            })
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::domain::Booking;
    use crate::infrastructure::memory::InMemoryRepositoryProvider;

    #[tokio::test]
    async fn inverted_window_is_a_validation_error() {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        let checker = AvailabilityChecker::new(repos);
        let now = Utc::now();
        let err = checker
            .is_available(Uuid::new_v4(), now, now - Duration::hours(1), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn exclude_omits_the_bookings_own_row() {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        let checker = AvailabilityChecker::new(repos.clone());

        let resource_id = Uuid::new_v4();
        let start = Utc::now() + Duration::hours(24);
        let end = start + Duration::hours(2);
        let mut booking =
            Booking::new(resource_id, None, "Assemblea", start, end, 5).unwrap();
        booking.approve(None).unwrap();
        let booking = repos.bookings().insert_checked(booking).await.unwrap();

        assert!(!checker
            .is_available(resource_id, start, end, None)
            .await
            .unwrap());
        assert!(checker
            .is_available(resource_id, start, end, Some(booking.id))
            .await
            .unwrap());
        assert!(checker
            .ensure_available(resource_id, start, end, Some(booking.id))
            .await
            .is_ok());
    }
}
