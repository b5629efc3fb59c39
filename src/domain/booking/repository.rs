//! Booking repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::model::{Booking, BookingStatus, RejectionReason};
use crate::domain::payment::Payment;
use crate::domain::DomainResult;

/// Fields written alongside a status transition.
///
/// Carried as one unit so the conditional UPDATE applies the status and
/// its bookkeeping atomically.
#[derive(Debug, Clone, Default)]
pub struct StatusChange {
    pub rejection_reason: Option<RejectionReason>,
    pub cancellation_reason: Option<String>,
    pub admin_note: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
}

/// Result of a cancellation: the booking as persisted plus the
/// completed payments that were flagged for refund in the same
/// transaction.
#[derive(Debug, Clone)]
pub struct CancelOutcome {
    pub booking: Booking,
    /// Status the booking held before the cancellation was applied
    pub previous_status: BookingStatus,
    pub refundable: Vec<Payment>,
}

/// Filter for booking listings.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub resource_id: Option<Uuid>,
    pub requester_id: Option<Uuid>,
    pub status: Option<BookingStatus>,
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a new booking, re-running the overlap check against
    /// confirmed bookings inside the same transaction. Returns
    /// `SlotUnavailable` when the window is taken.
    async fn insert_checked(&self, booking: Booking) -> DomainResult<Booking>;

    /// Find booking by ID, with its additional resources loaded.
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Booking>>;

    /// Bookings on `resource_id` in a confirmed-occupying status whose
    /// window strictly overlaps `[start, end)`. `exclude` omits a
    /// booking's own row on the update path.
    async fn find_overlapping(
        &self,
        resource_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> DomainResult<Vec<Booking>>;

    /// Persist a patched booking. Only legal while the stored status is
    /// still `Pending` (`BookingLocked` otherwise); when the window
    /// changed, the overlap check runs in the same transaction with the
    /// booking's own row excluded.
    async fn update_pending(&self, booking: Booking) -> DomainResult<Booking>;

    /// Compare-and-set status transition: UPDATE filtered on the
    /// expected current status. Returns `false` when no row matched,
    /// i.e. a concurrent transition won.
    async fn set_status_checked(
        &self,
        id: Uuid,
        expected: BookingStatus,
        to: BookingStatus,
        change: StatusChange,
    ) -> DomainResult<bool>;

    /// Record a payment and move `Approved → Paid` in one transaction.
    /// Returns `false` when the status CAS failed.
    async fn record_payment_checked(&self, id: Uuid, payment: Payment) -> DomainResult<bool>;

    /// Cancel from any non-terminal status, flagging completed payments
    /// as refund-initiated in the same transaction. Returns `None` when
    /// the booking was already terminal (the caller re-reads and maps
    /// to `InvalidTransition`).
    async fn cancel_checked(
        &self,
        id: Uuid,
        reason: String,
    ) -> DomainResult<Option<CancelOutcome>>;

    /// Paginated listing, newest first.
    async fn list(
        &self,
        filter: BookingFilter,
        page: u64,
        limit: u64,
    ) -> DomainResult<(Vec<Booking>, u64)>;

    /// Approved bookings needing a payment reminder: approved before
    /// `approved_before` and not reminded yet.
    async fn find_needing_payment_reminder(
        &self,
        approved_before: DateTime<Utc>,
    ) -> DomainResult<Vec<Booking>>;

    /// Flag a booking's reminder as dispatched.
    async fn mark_reminder_sent(&self, id: Uuid) -> DomainResult<()>;
}
