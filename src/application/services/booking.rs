//! Booking orchestration service
//!
//! Entry point for the HTTP layer: creation (account and manual/guest
//! paths), pending-only updates, lifecycle delegation and the read
//! surface. Validation failures are rejected before persistence is
//! touched; the availability check re-runs atomically with the insert
//! or reschedule inside the repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::application::services::availability::AvailabilityChecker;
use crate::application::services::lifecycle::BookingLifecycle;
use crate::application::services::pricing::Quote;
use crate::domain::{
    AdditionalResource, Booking, BookingFilter, BookingStatus, DomainError, DomainResult,
    PaymentMethod, RejectionReason, RepositoryProvider,
};
use crate::shared::types::{PaginatedResult, PaginationParams};

/// Request to create a booking.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub resource_id: Uuid,
    /// Requesting account; `None` only on the manual path
    pub requester_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub attendees: i32,
    pub additional_resources: Vec<AdditionalResource>,
    pub is_private: bool,
    /// Guest contact for manual bookings
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    /// Admin manual path: skip the pending stage, same availability guard
    pub auto_approve: bool,
}

/// Patch for a pending booking. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct BookingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub attendees: Option<i32>,
    pub is_private: Option<bool>,
    pub additional_resources: Option<Vec<AdditionalResource>>,
}

pub struct BookingService {
    repos: Arc<dyn RepositoryProvider>,
    lifecycle: BookingLifecycle,
    availability: AvailabilityChecker,
}

impl BookingService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, lifecycle: BookingLifecycle) -> Self {
        let availability = AvailabilityChecker::new(repos.clone());
        Self {
            repos,
            lifecycle,
            availability,
        }
    }

    /// Create a booking for an account holder.
    pub async fn create(&self, request: NewBooking) -> DomainResult<Booking> {
        if request.requester_id.is_none() {
            return Err(DomainError::Validation(
                "requester_id is required; use the manual path for guest bookings".to_string(),
            ));
        }
        self.create_inner(request).await
    }

    /// Create a booking on behalf of a non-account guest (staff path).
    /// `requester_id` is left unset; contact goes through the guest
    /// fields.
    pub async fn create_manual(&self, mut request: NewBooking) -> DomainResult<Booking> {
        request.requester_id = None;
        if request
            .guest_name
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .is_empty()
        {
            return Err(DomainError::Validation(
                "guest_name is required for manual bookings".to_string(),
            ));
        }
        self.create_inner(request).await
    }

    async fn create_inner(&self, request: NewBooking) -> DomainResult<Booking> {
        let resource = self
            .repos
            .resources()
            .find_by_id(request.resource_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Resource",
                field: "id",
                value: request.resource_id.to_string(),
            })?;
        if !resource.is_active {
            return Err(DomainError::Validation(format!(
                "resource '{}' is not bookable",
                resource.name
            )));
        }
        for extra in &request.additional_resources {
            if extra.quantity < 1 {
                return Err(DomainError::Validation(
                    "additional resource quantity must be positive".to_string(),
                ));
            }
            self.repos
                .resources()
                .find_by_id(extra.resource_id)
                .await?
                .ok_or(DomainError::NotFound {
                    entity: "Resource",
                    field: "id",
                    value: extra.resource_id.to_string(),
                })?;
        }

        let mut booking = Booking::new(
            request.resource_id,
            request.requester_id,
            request.title,
            request.start_time,
            request.end_time,
            request.attendees,
        )?;
        booking.description = request.description;
        booking.additional_resources = request.additional_resources;
        booking.is_private = request.is_private;
        booking.guest_name = request.guest_name;
        booking.guest_email = request.guest_email;
        booking.guest_phone = request.guest_phone;

        if request.auto_approve {
            // Same availability guard as the approve edge; the pending
            // stage is skipped, not the check.
            booking.approve(None)?;
        }

        let booking = self.repos.bookings().insert_checked(booking).await?;

        info!(
            booking_id = %booking.id,
            resource_id = %booking.resource_id,
            status = %booking.status,
            "Booking created"
        );
        metrics::counter!("bookings_created_total").increment(1);

        if booking.status == BookingStatus::Approved {
            self.lifecycle.notify_payment_options(&booking).await;
        }
        Ok(booking)
    }

    /// Patch a booking that is still pending review.
    ///
    /// Once the status has progressed past `Pending` the booking is
    /// locked and every patch fails, regardless of contents.
    pub async fn update(&self, id: Uuid, patch: BookingPatch) -> DomainResult<Booking> {
        let mut booking = self.get(id).await?;
        if booking.status != BookingStatus::Pending {
            return Err(DomainError::BookingLocked {
                id,
                status: booking.status,
            });
        }

        if let Some(title) = patch.title {
            booking.title = title;
        }
        if let Some(description) = patch.description {
            booking.description = Some(description);
        }
        if let Some(start) = patch.start_time {
            booking.start_time = start;
        }
        if let Some(end) = patch.end_time {
            booking.end_time = end;
        }
        if let Some(attendees) = patch.attendees {
            booking.attendees = attendees;
        }
        if let Some(is_private) = patch.is_private {
            booking.is_private = is_private;
        }
        if let Some(extras) = patch.additional_resources {
            for extra in &extras {
                if extra.quantity < 1 {
                    return Err(DomainError::Validation(
                        "additional resource quantity must be positive".to_string(),
                    ));
                }
            }
            booking.additional_resources = extras;
        }

        if booking.start_time >= booking.end_time {
            return Err(DomainError::Validation(
                "start_time must be strictly before end_time".to_string(),
            ));
        }
        if booking.attendees < 1 {
            return Err(DomainError::Validation(
                "attendees must be a positive number".to_string(),
            ));
        }
        booking.updated_at = Utc::now();

        // The repository re-checks the stored status and the window
        // overlap (excluding this booking) in one transaction.
        self.repos.bookings().update_pending(booking).await
    }

    pub async fn approve(&self, id: Uuid, note: Option<String>) -> DomainResult<Booking> {
        self.lifecycle.approve(id, note).await
    }

    pub async fn reject(
        &self,
        id: Uuid,
        reason: RejectionReason,
        note: Option<String>,
    ) -> DomainResult<Booking> {
        self.lifecycle.reject(id, reason, note).await
    }

    pub async fn cancel(&self, id: Uuid, reason: String) -> DomainResult<Booking> {
        self.lifecycle.cancel(id, reason).await
    }

    pub async fn record_payment(
        &self,
        id: Uuid,
        amount: Decimal,
        method: PaymentMethod,
        provider_reference: Option<String>,
    ) -> DomainResult<Booking> {
        self.lifecycle
            .record_payment(id, amount, method, provider_reference)
            .await
    }

    /// Overlap test against confirmed bookings for a resource/window.
    pub async fn check_availability(
        &self,
        resource_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<bool> {
        self.availability
            .is_available(resource_id, start, end, None)
            .await
    }

    /// Price preview for a stored booking.
    pub async fn quote(&self, id: Uuid) -> DomainResult<Quote> {
        let booking = self.get(id).await?;
        self.lifecycle.quote_for(&booking).await
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<Booking> {
        self.repos
            .bookings()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Booking",
                field: "id",
                value: id.to_string(),
            })
    }

    pub async fn list(
        &self,
        filter: BookingFilter,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<Booking>> {
        let (items, total) = self
            .repos
            .bookings()
            .list(filter, pagination.page, pagination.limit)
            .await?;
        Ok(PaginatedResult::new(
            items,
            total,
            pagination.page,
            pagination.limit,
        ))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    use crate::domain::{RepositoryProvider, Resource, User, UserRole};
    use crate::infrastructure::memory::InMemoryRepositoryProvider;
    use crate::infrastructure::notify::RecordingNotificationSender;
    use crate::infrastructure::payments::RecordingPaymentProcessor;

    struct TestEnv {
        repos: Arc<dyn RepositoryProvider>,
        notifier: Arc<RecordingNotificationSender>,
        service: BookingService,
        resource: Resource,
        requester: User,
    }

    async fn env() -> TestEnv {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        let notifier = RecordingNotificationSender::new();
        let lifecycle = BookingLifecycle::new(
            repos.clone(),
            notifier.clone(),
            RecordingPaymentProcessor::new(),
        );
        let service = BookingService::new(repos.clone(), lifecycle);

        let resource = Resource::new("Sala grande", 40, Decimal::new(10, 0));
        repos.resources().insert(resource.clone()).await.unwrap();
        let requester = User::new("ada@example.org", "Ada", "Byron", "hash", UserRole::User);
        repos.users().insert(requester.clone()).await.unwrap();

        TestEnv {
            repos,
            notifier,
            service,
            resource,
            requester,
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 14, hour, minute, 0).unwrap()
    }

    fn request(env: &TestEnv, start: DateTime<Utc>, end: DateTime<Utc>) -> NewBooking {
        NewBooking {
            resource_id: env.resource.id,
            requester_id: Some(env.requester.id),
            title: "Assemblea".to_string(),
            description: None,
            start_time: start,
            end_time: end,
            attendees: 10,
            additional_resources: Vec::new(),
            is_private: false,
            guest_name: None,
            guest_email: None,
            guest_phone: None,
            auto_approve: false,
        }
    }

    #[tokio::test]
    async fn create_starts_pending() {
        let env = env().await;
        let booking = env
            .service
            .create(request(&env, at(10, 0), at(11, 0)))
            .await
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.requester_id, Some(env.requester.id));
    }

    #[tokio::test]
    async fn create_rejects_inverted_window() {
        let env = env().await;
        let err = env
            .service
            .create(request(&env, at(11, 0), at(10, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn create_rejects_unknown_resource() {
        let env = env().await;
        let mut req = request(&env, at(10, 0), at(11, 0));
        req.resource_id = Uuid::new_v4();
        let err = env.service.create(req).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn overlap_with_confirmed_booking_is_unavailable() {
        let env = env().await;
        // Existing approved booking 10:30-11:30.
        let existing = env
            .service
            .create(request(&env, at(10, 30), at(11, 30)))
            .await
            .unwrap();
        env.service.approve(existing.id, None).await.unwrap();

        // [10:00, 11:00) overlaps -> unavailable.
        let err = env
            .service
            .create(request(&env, at(10, 0), at(11, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::SlotUnavailable { .. }));

        // [11:30, 12:30) back-to-back -> fine.
        env.service
            .create(request(&env, at(11, 30), at(12, 30)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn pending_bookings_do_not_block_the_slot() {
        let env = env().await;
        env.service
            .create(request(&env, at(10, 0), at(11, 0)))
            .await
            .unwrap();
        // Same window is still available while the first is pending.
        let second = env
            .service
            .create(request(&env, at(10, 0), at(11, 0)))
            .await
            .unwrap();
        assert_eq!(second.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn confirmed_bookings_never_overlap() {
        let env = env().await;
        let first = env
            .service
            .create(request(&env, at(10, 0), at(12, 0)))
            .await
            .unwrap();
        let second = env
            .service
            .create(request(&env, at(11, 0), at(13, 0)))
            .await
            .unwrap();

        env.service.approve(first.id, None).await.unwrap();
        // The second can no longer be confirmed into the same window.
        let err = env.service.approve(second.id, None).await.unwrap_err();
        assert!(matches!(err, DomainError::SlotUnavailable { .. }));

        let occupying = env
            .repos
            .bookings()
            .find_overlapping(env.resource.id, at(0, 0), at(23, 59), None)
            .await
            .unwrap();
        assert_eq!(occupying.len(), 1);
    }

    #[tokio::test]
    async fn check_availability_reflects_confirmed_state() {
        let env = env().await;
        assert!(env
            .service
            .check_availability(env.resource.id, at(10, 0), at(11, 0))
            .await
            .unwrap());

        let booking = env
            .service
            .create(request(&env, at(10, 30), at(11, 30)))
            .await
            .unwrap();
        env.service.approve(booking.id, None).await.unwrap();

        assert!(!env
            .service
            .check_availability(env.resource.id, at(10, 0), at(11, 0))
            .await
            .unwrap());
        assert!(env
            .service
            .check_availability(env.resource.id, at(11, 30), at(12, 30))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn update_while_pending_reschedules() {
        let env = env().await;
        let booking = env
            .service
            .create(request(&env, at(10, 0), at(11, 0)))
            .await
            .unwrap();

        let updated = env
            .service
            .update(
                booking.id,
                BookingPatch {
                    start_time: Some(at(14, 0)),
                    end_time: Some(at(15, 0)),
                    title: Some("Assemblea generale".to_string()),
                    ..BookingPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.start_time, at(14, 0));
        assert_eq!(updated.title, "Assemblea generale");
    }

    #[tokio::test]
    async fn update_excludes_own_window_from_the_check() {
        let env = env().await;
        let booking = env
            .service
            .create(request(&env, at(10, 0), at(11, 0)))
            .await
            .unwrap();

        // Shrinking within its own window must not conflict with itself.
        let updated = env
            .service
            .update(
                booking.id,
                BookingPatch {
                    start_time: Some(at(10, 15)),
                    end_time: Some(at(10, 45)),
                    ..BookingPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.start_time, at(10, 15));
    }

    #[tokio::test]
    async fn update_after_approval_is_locked() {
        let env = env().await;
        let booking = env
            .service
            .create(request(&env, at(10, 0), at(11, 0)))
            .await
            .unwrap();
        env.service.approve(booking.id, None).await.unwrap();

        // Locked regardless of patch contents, even an empty one.
        let err = env
            .service
            .update(booking.id, BookingPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::BookingLocked {
                status: BookingStatus::Approved,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn manual_booking_requires_guest_name() {
        let env = env().await;
        let mut req = request(&env, at(10, 0), at(11, 0));
        req.guest_name = None;
        let err = env.service.create_manual(req).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn manual_booking_has_no_requester() {
        let env = env().await;
        let mut req = request(&env, at(10, 0), at(11, 0));
        req.guest_name = Some("Carla Rossi".to_string());
        req.guest_email = Some("carla@example.org".to_string());
        let booking = env.service.create_manual(req).await.unwrap();
        assert!(booking.requester_id.is_none());
        assert_eq!(booking.guest_name.as_deref(), Some("Carla Rossi"));
    }

    #[tokio::test]
    async fn auto_approve_skips_pending_but_not_the_guard() {
        let env = env().await;
        let taken = env
            .service
            .create(request(&env, at(10, 0), at(11, 0)))
            .await
            .unwrap();
        env.service.approve(taken.id, None).await.unwrap();

        // Occupied window: auto-approve hits the same availability guard.
        let mut req = request(&env, at(10, 30), at(11, 30));
        req.guest_name = Some("Carla Rossi".to_string());
        req.auto_approve = true;
        let err = env.service.create_manual(req).await.unwrap_err();
        assert!(matches!(err, DomainError::SlotUnavailable { .. }));

        // Free window: created directly approved, payment options sent.
        let mut req = request(&env, at(14, 0), at(15, 0));
        req.guest_name = Some("Carla Rossi".to_string());
        req.guest_email = Some("carla@example.org".to_string());
        req.auto_approve = true;
        let booking = env.service.create_manual(req).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Approved);
        assert_eq!(env.notifier.sent_to("carla@example.org").len(), 1);
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let env = env().await;
        let a = env
            .service
            .create(request(&env, at(10, 0), at(11, 0)))
            .await
            .unwrap();
        env.service
            .create(request(&env, at(12, 0), at(13, 0)))
            .await
            .unwrap();
        env.service.approve(a.id, None).await.unwrap();

        let approved = env
            .service
            .list(
                BookingFilter {
                    status: Some(BookingStatus::Approved),
                    ..BookingFilter::default()
                },
                PaginationParams::clamped(1, 50),
            )
            .await
            .unwrap();
        assert_eq!(approved.total, 1);
        assert_eq!(approved.items[0].id, a.id);
    }
}
