//! Booking domain entity and its status state machine

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult};

/// Booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    /// Awaiting review by a community manager or admin
    Pending,
    /// Approved, awaiting payment
    Approved,
    /// Rejected by staff (terminal)
    Rejected,
    /// Payment recorded in full
    Paid,
    /// Cancelled by the requester or staff (terminal)
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "paid" => Some(Self::Paid),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Statuses that block other bookings on the same resource and window.
    pub fn occupies_slot(&self) -> bool {
        matches!(self, Self::Approved | Self::Paid)
    }

    /// No further lifecycle events are accepted from these statuses.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled)
    }

    /// Resolve the target status for a lifecycle event.
    ///
    /// This is the single source of truth for transition legality.
    /// Every transition not in the table fails with `InvalidTransition`
    /// naming the current status and the requested event.
    pub fn next(self, event: BookingEvent) -> DomainResult<BookingStatus> {
        use BookingEvent::*;
        use BookingStatus::*;
        match (self, event) {
            (Pending, Approve) => Ok(Approved),
            (Pending, Reject) => Ok(Rejected),
            (Approved, RecordPayment) => Ok(Paid),
            // PAID may still be cancelled by administrative override (with refund).
            (Pending, Cancel) | (Approved, Cancel) | (Paid, Cancel) => Ok(Cancelled),
            (from, event) => Err(DomainError::InvalidTransition {
                from,
                event: event.as_str(),
            }),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle events a booking can receive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingEvent {
    Approve,
    Reject,
    RecordPayment,
    Cancel,
}

impl BookingEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::RecordPayment => "record payment for",
            Self::Cancel => "cancel",
        }
    }
}

/// Closed set of rejection reasons staff can pick from.
///
/// `Other` permits free-text elaboration via the admin note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    ResourceUnavailable,
    MaintenanceScheduled,
    EventAlreadyBooked,
    InsufficientDocumentation,
    CapacityExceeded,
    PaymentIssues,
    Other,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceUnavailable => "resource_unavailable",
            Self::MaintenanceScheduled => "maintenance_scheduled",
            Self::EventAlreadyBooked => "event_already_booked",
            Self::InsufficientDocumentation => "insufficient_documentation",
            Self::CapacityExceeded => "capacity_exceeded",
            Self::PaymentIssues => "payment_issues",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "resource_unavailable" => Some(Self::ResourceUnavailable),
            "maintenance_scheduled" => Some(Self::MaintenanceScheduled),
            "event_already_booked" => Some(Self::EventAlreadyBooked),
            "insufficient_documentation" => Some(Self::InsufficientDocumentation),
            "capacity_exceeded" => Some(Self::CapacityExceeded),
            "payment_issues" => Some(Self::PaymentIssues),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Extra resource attached to a booking (equipment, furniture, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdditionalResource {
    pub resource_id: Uuid,
    pub quantity: i32,
}

/// A reservation of a resource for a time window, tracked through the
/// approval/payment lifecycle.
#[derive(Debug, Clone)]
pub struct Booking {
    /// Unique booking ID
    pub id: Uuid,
    /// Booked resource
    pub resource_id: Uuid,
    /// Requesting user; `None` for manual/guest bookings
    pub requester_id: Option<Uuid>,
    /// Short title shown on the calendar
    pub title: String,
    pub description: Option<String>,
    /// Start of the booked window (inclusive)
    pub start_time: DateTime<Utc>,
    /// End of the booked window (exclusive)
    pub end_time: DateTime<Utc>,
    /// Expected number of attendees
    pub attendees: i32,
    /// Current lifecycle status
    pub status: BookingStatus,
    /// Extra resources booked alongside the primary one
    pub additional_resources: Vec<AdditionalResource>,
    pub rejection_reason: Option<RejectionReason>,
    pub cancellation_reason: Option<String>,
    /// Staff-only note attached on approve/reject
    pub admin_note: Option<String>,
    /// Hide title and description on the public calendar
    pub is_private: bool,
    /// Guest contact for manual bookings (requester_id is None)
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    /// When the booking was approved; anchors the payment deadline
    pub approved_at: Option<DateTime<Utc>>,
    /// Whether a payment-deadline reminder has been dispatched
    pub reminder_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Create a new booking in `Pending` status.
    ///
    /// Time ordering is validated here; availability is the
    /// repository's concern (checked atomically with the insert).
    pub fn new(
        resource_id: Uuid,
        requester_id: Option<Uuid>,
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        attendees: i32,
    ) -> DomainResult<Self> {
        if start_time >= end_time {
            return Err(DomainError::Validation(
                "start_time must be strictly before end_time".to_string(),
            ));
        }
        if attendees < 1 {
            return Err(DomainError::Validation(
                "attendees must be a positive number".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            resource_id,
            requester_id,
            title: title.into(),
            description: None,
            start_time,
            end_time,
            attendees,
            status: BookingStatus::Pending,
            additional_resources: Vec::new(),
            rejection_reason: None,
            cancellation_reason: None,
            admin_note: None,
            is_private: false,
            guest_name: None,
            guest_email: None,
            guest_phone: None,
            approved_at: None,
            reminder_sent: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Approve this booking. The availability guard is enforced by the
    /// lifecycle service before the transition is persisted.
    pub fn approve(&mut self, note: Option<String>) -> DomainResult<()> {
        self.status = self.status.next(BookingEvent::Approve)?;
        self.admin_note = note.or(self.admin_note.take());
        self.approved_at = Some(Utc::now());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Reject this booking with a reason from the closed set.
    pub fn reject(&mut self, reason: RejectionReason, note: Option<String>) -> DomainResult<()> {
        self.status = self.status.next(BookingEvent::Reject)?;
        self.rejection_reason = Some(reason);
        self.admin_note = note.or(self.admin_note.take());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Mark this booking paid. The amount guard lives in the lifecycle
    /// service, next to the quote computation.
    pub fn record_payment(&mut self) -> DomainResult<()> {
        self.status = self.status.next(BookingEvent::RecordPayment)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Cancel this booking.
    pub fn cancel(&mut self, reason: impl Into<String>) -> DomainResult<()> {
        self.status = self.status.next(BookingEvent::Cancel)?;
        self.cancellation_reason = Some(reason.into());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Whether this booking blocks others on its resource and window.
    pub fn occupies_slot(&self) -> bool {
        self.status.occupies_slot()
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn window(hours_from_now: i64, duration_hours: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = Utc::now() + Duration::hours(hours_from_now);
        (start, start + Duration::hours(duration_hours))
    }

    fn sample_booking() -> Booking {
        let (start, end) = window(24, 2);
        Booking::new(Uuid::new_v4(), Some(Uuid::new_v4()), "Team offsite", start, end, 10).unwrap()
    }

    #[test]
    fn new_booking_is_pending() {
        let b = sample_booking();
        assert_eq!(b.status, BookingStatus::Pending);
        assert!(!b.occupies_slot());
        assert!(b.approved_at.is_none());
        assert!(!b.reminder_sent);
    }

    #[test]
    fn new_rejects_inverted_window() {
        let (start, end) = window(24, 2);
        let err = Booking::new(Uuid::new_v4(), None, "x", end, start, 1).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn new_rejects_empty_window() {
        let (start, _) = window(24, 2);
        let err = Booking::new(Uuid::new_v4(), None, "x", start, start, 1).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn new_rejects_non_positive_attendees() {
        let (start, end) = window(24, 2);
        let err = Booking::new(Uuid::new_v4(), None, "x", start, end, 0).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn approve_moves_to_approved_and_stamps_time() {
        let mut b = sample_booking();
        b.approve(Some("room checked".into())).unwrap();
        assert_eq!(b.status, BookingStatus::Approved);
        assert!(b.occupies_slot());
        assert!(b.approved_at.is_some());
        assert_eq!(b.admin_note.as_deref(), Some("room checked"));
    }

    #[test]
    fn approve_then_reject_is_invalid() {
        let mut b = sample_booking();
        b.approve(None).unwrap();
        let err = b.reject(RejectionReason::Other, None).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidTransition {
                from: BookingStatus::Approved,
                ..
            }
        ));
        // booking unchanged by the failed transition
        assert_eq!(b.status, BookingStatus::Approved);
        assert!(b.rejection_reason.is_none());
    }

    #[test]
    fn double_approve_is_invalid() {
        let mut b = sample_booking();
        b.approve(None).unwrap();
        let err = b.approve(None).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
    }

    #[test]
    fn reject_records_reason() {
        let mut b = sample_booking();
        b.reject(RejectionReason::MaintenanceScheduled, None).unwrap();
        assert_eq!(b.status, BookingStatus::Rejected);
        assert_eq!(b.rejection_reason, Some(RejectionReason::MaintenanceScheduled));
        assert!(b.status.is_terminal());
    }

    #[test]
    fn reject_cancelled_is_invalid() {
        let mut b = sample_booking();
        b.cancel("requester asked").unwrap();
        let err = b.reject(RejectionReason::Other, None).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidTransition {
                from: BookingStatus::Cancelled,
                ..
            }
        ));
    }

    #[test]
    fn payment_only_after_approval() {
        let mut b = sample_booking();
        assert!(b.record_payment().is_err());
        b.approve(None).unwrap();
        b.record_payment().unwrap();
        assert_eq!(b.status, BookingStatus::Paid);
    }

    #[test]
    fn paid_can_still_be_cancelled() {
        let mut b = sample_booking();
        b.approve(None).unwrap();
        b.record_payment().unwrap();
        b.cancel("admin override").unwrap();
        assert_eq!(b.status, BookingStatus::Cancelled);
        assert_eq!(b.cancellation_reason.as_deref(), Some("admin override"));
    }

    #[test]
    fn cancel_is_terminal() {
        let mut b = sample_booking();
        b.cancel("no longer needed").unwrap();
        assert!(b.approve(None).is_err());
        assert!(b.cancel("again").is_err());
    }

    #[test]
    fn status_string_roundtrip() {
        for status in &[
            BookingStatus::Pending,
            BookingStatus::Approved,
            BookingStatus::Rejected,
            BookingStatus::Paid,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(*status));
        }
        assert_eq!(BookingStatus::parse("draft"), None);
    }

    #[test]
    fn rejection_reason_roundtrip() {
        for reason in &[
            RejectionReason::ResourceUnavailable,
            RejectionReason::MaintenanceScheduled,
            RejectionReason::EventAlreadyBooked,
            RejectionReason::InsufficientDocumentation,
            RejectionReason::CapacityExceeded,
            RejectionReason::PaymentIssues,
            RejectionReason::Other,
        ] {
            assert_eq!(RejectionReason::parse(reason.as_str()), Some(*reason));
        }
        assert_eq!(RejectionReason::parse("bad_weather"), None);
    }
}
