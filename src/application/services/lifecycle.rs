//! Booking lifecycle transitions and their side effects
//!
//! Owns the execution of approve / reject / record-payment / cancel.
//! Transition legality comes from the status table in the domain
//! model; persistence goes through conditional updates so concurrent
//! transitions against the same booking cannot both succeed. Side
//! effects (notifications, refund initiation) run after the commit and
//! are best-effort: retried on transient failure, logged, never able
//! to undo a committed status change.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::ports::{
    NotificationSender, NotificationTemplate, PaymentProcessor, TemplateVars,
};
use crate::application::services::pricing::{self, Quote};
use crate::domain::{
    Booking, BookingEvent, BookingStatus, DomainError, DomainResult, Payment, PaymentMethod,
    PaymentStatus, RejectionReason, RepositoryProvider, Resource, StatusChange,
};
use crate::shared::retry::{retry_with_backoff, RetryConfig};

pub struct BookingLifecycle {
    repos: Arc<dyn RepositoryProvider>,
    notifier: Arc<dyn NotificationSender>,
    processor: Arc<dyn PaymentProcessor>,
    retry: RetryConfig,
}

impl BookingLifecycle {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        notifier: Arc<dyn NotificationSender>,
        processor: Arc<dyn PaymentProcessor>,
    ) -> Self {
        Self {
            repos,
            notifier,
            processor,
            retry: RetryConfig::default(),
        }
    }

    /// Approve a pending booking.
    ///
    /// The availability guard runs against the booking's own window
    /// (excluding itself); a failed guard is returned to the caller so
    /// staff can pick a different resource or window. It is not
    /// retried here.
    pub async fn approve(&self, id: Uuid, note: Option<String>) -> DomainResult<Booking> {
        let booking = self.load(id).await?;
        booking.status.next(BookingEvent::Approve)?;

        let overlapping = self
            .repos
            .bookings()
            .find_overlapping(booking.resource_id, booking.start_time, booking.end_time, Some(id))
            .await?;
        if !overlapping.is_empty() {
            return Err(DomainError::SlotUnavailable {
                resource_id: booking.resource_id,
                start: booking.start_time,
                end: booking.end_time,
            });
        }

        let change = StatusChange {
            admin_note: note,
            approved_at: Some(chrono::Utc::now()),
            ..StatusChange::default()
        };
        let applied = self
            .repos
            .bookings()
            .set_status_checked(id, BookingStatus::Pending, BookingStatus::Approved, change)
            .await?;
        if !applied {
            // A concurrent transition won; report against the fresh state.
            return Err(self.stale_transition(id, BookingEvent::Approve).await?);
        }

        let booking = self.load(id).await?;
        info!(booking_id = %id, "Booking approved");
        metrics::counter!("booking_transitions_total", "event" => "approve").increment(1);

        self.notify_payment_options(&booking).await;
        Ok(booking)
    }

    /// Reject a pending booking with a reason from the closed set.
    pub async fn reject(
        &self,
        id: Uuid,
        reason: RejectionReason,
        note: Option<String>,
    ) -> DomainResult<Booking> {
        let booking = self.load(id).await?;
        booking.status.next(BookingEvent::Reject)?;

        let change = StatusChange {
            rejection_reason: Some(reason),
            admin_note: note,
            ..StatusChange::default()
        };
        let applied = self
            .repos
            .bookings()
            .set_status_checked(id, BookingStatus::Pending, BookingStatus::Rejected, change)
            .await?;
        if !applied {
            return Err(self.stale_transition(id, BookingEvent::Reject).await?);
        }

        let booking = self.load(id).await?;
        info!(booking_id = %id, reason = %reason, "Booking rejected");
        metrics::counter!("booking_transitions_total", "event" => "reject").increment(1);

        self.dispatch(
            NotificationTemplate::BookingRejected,
            &booking,
            vec![
                ("booking_title", booking.title.clone()),
                ("reason", reason.as_str().to_string()),
            ],
        )
        .await;
        Ok(booking)
    }

    /// Record a payment against an approved booking and move it to
    /// `Paid`. The amount must match the quoted grand total exactly.
    pub async fn record_payment(
        &self,
        id: Uuid,
        amount: Decimal,
        method: PaymentMethod,
        provider_reference: Option<String>,
    ) -> DomainResult<Booking> {
        let booking = self.load(id).await?;
        booking.status.next(BookingEvent::RecordPayment)?;

        let quote = self.quote_for(&booking).await?;
        if amount != quote.total {
            return Err(DomainError::Validation(format!(
                "payment amount {} does not match the booked price {}",
                amount, quote.total
            )));
        }

        let settings = self.repos.settings().get_or_create().await?;
        let invoice_number = self.repos.settings().next_invoice_number().await?;

        let mut payment = Payment::new(
            id,
            booking.requester_id,
            amount,
            settings.currency.clone(),
            method,
        );
        payment.provider_reference = provider_reference;
        payment.invoice_number = Some(settings.format_invoice_number(invoice_number));

        let applied = self
            .repos
            .bookings()
            .record_payment_checked(id, payment)
            .await?;
        if !applied {
            return Err(self.stale_transition(id, BookingEvent::RecordPayment).await?);
        }

        let booking = self.load(id).await?;
        info!(booking_id = %id, amount = %amount, method = %method, "Payment recorded");
        metrics::counter!("booking_transitions_total", "event" => "record_payment").increment(1);

        self.dispatch(
            NotificationTemplate::PaymentConfirmation,
            &booking,
            vec![
                ("booking_title", booking.title.clone()),
                ("amount", amount.to_string()),
            ],
        )
        .await;
        Ok(booking)
    }

    /// Cancel a booking from any non-terminal status.
    ///
    /// Completed payments are flagged refund-initiated in the same
    /// transaction as the status change; the processor call itself
    /// happens after the commit and its failure leaves the flag in
    /// place for operator follow-up.
    pub async fn cancel(&self, id: Uuid, reason: String) -> DomainResult<Booking> {
        let booking = self.load(id).await?;
        booking.status.next(BookingEvent::Cancel)?;

        let outcome = match self.repos.bookings().cancel_checked(id, reason).await? {
            Some(outcome) => outcome,
            None => return Err(self.stale_transition(id, BookingEvent::Cancel).await?),
        };

        info!(
            booking_id = %id,
            previous_status = %outcome.previous_status,
            refunds = outcome.refundable.len(),
            "Booking cancelled"
        );
        metrics::counter!("booking_transitions_total", "event" => "cancel").increment(1);

        for payment in &outcome.refundable {
            self.initiate_refund(payment).await;
        }

        if outcome.previous_status == BookingStatus::Paid {
            self.dispatch(
                NotificationTemplate::BookingCancelled,
                &outcome.booking,
                vec![("booking_title", outcome.booking.title.clone())],
            )
            .await;
        }

        Ok(outcome.booking)
    }

    /// Quote for the booking's current window and extras.
    pub async fn quote_for(&self, booking: &Booking) -> DomainResult<Quote> {
        let resource = self
            .repos
            .resources()
            .find_by_id(booking.resource_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Resource",
                field: "id",
                value: booking.resource_id.to_string(),
            })?;

        let mut extras: Vec<(Resource, i32)> = Vec::with_capacity(booking.additional_resources.len());
        for extra in &booking.additional_resources {
            let r = self
                .repos
                .resources()
                .find_by_id(extra.resource_id)
                .await?
                .ok_or(DomainError::NotFound {
                    entity: "Resource",
                    field: "id",
                    value: extra.resource_id.to_string(),
                })?;
            extras.push((r, extra.quantity));
        }

        let settings = self.repos.settings().get_or_create().await?;
        pricing::quote(
            &resource,
            &extras,
            booking.start_time,
            booking.end_time,
            &settings,
        )
    }

    /// Dispatch the "payment options" notification for a booking that
    /// just became approved (via the approve edge or auto-approval at
    /// creation).
    pub async fn notify_payment_options(&self, booking: &Booking) {
        self.dispatch(
            NotificationTemplate::PaymentOptions,
            booking,
            vec![("booking_title", booking.title.clone())],
        )
        .await;
    }

    // ── Internals ──────────────────────────────────────────────

    async fn load(&self, id: Uuid) -> DomainResult<Booking> {
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

    /// Build the error for a CAS that found no matching row: the
    /// booking either disappeared or a concurrent transition changed
    /// its status since our read.
    async fn stale_transition(&self, id: Uuid, event: BookingEvent) -> DomainResult<DomainError> {
        let current = self.load(id).await?;
        Ok(DomainError::InvalidTransition {
            from: current.status,
            event: event.as_str(),
        })
    }

    /// Ask the processor to give the money back. Card payments carry a
    /// provider reference; bank transfers are refunded manually and
    /// stay flagged for operator follow-up.
    async fn initiate_refund(&self, payment: &Payment) {
        let Some(reference) = payment.provider_reference.as_deref() else {
            info!(
                payment_id = %payment.id,
                method = %payment.method,
                "No provider reference; refund left for manual processing"
            );
            return;
        };

        let result = retry_with_backoff(
            self.retry.clone(),
            || self.processor.refund(reference),
            |err| err.is_transient(),
            "initiate_refund",
        )
        .await;

        match result {
            Ok(()) => {
                if let Err(e) = self
                    .repos
                    .payments()
                    .set_status(payment.id, PaymentStatus::Refunded)
                    .await
                {
                    warn!(payment_id = %payment.id, error = %e, "Refund succeeded but status update failed");
                }
            }
            Err(e) => {
                // The refund-initiated flag persists; never unwound.
                warn!(payment_id = %payment.id, error = %e, "Refund initiation failed");
            }
        }
    }

    /// Resolve the recipient and deliver a notification, best-effort.
    async fn dispatch(
        &self,
        template: NotificationTemplate,
        booking: &Booking,
        variables: TemplateVars,
    ) {
        let recipient = match self.recipient_for(booking).await {
            Ok(Some(address)) => address,
            Ok(None) => {
                debug!(booking_id = %booking.id, template = %template, "No recipient address; skipping notification");
                return;
            }
            Err(e) => {
                warn!(booking_id = %booking.id, error = %e, "Recipient lookup failed; skipping notification");
                return;
            }
        };

        let result = retry_with_backoff(
            self.retry.clone(),
            || self.notifier.send(template, &recipient, variables.clone()),
            |err| err.is_transient(),
            "dispatch_notification",
        )
        .await;

        if let Err(e) = result {
            warn!(booking_id = %booking.id, template = %template, error = %e, "Notification dispatch failed");
        }
    }

    async fn recipient_for(&self, booking: &Booking) -> DomainResult<Option<String>> {
        if let Some(user_id) = booking.requester_id {
            Ok(self
                .repos
                .users()
                .find_by_id(user_id)
                .await?
                .map(|u| u.email))
        } else {
            Ok(booking.guest_email.clone())
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::time::Duration as StdDuration;

    use crate::application::ports::NotificationTemplate;
    use crate::domain::{PaymentMethod, PaymentStatus, RejectionReason, Resource, User, UserRole};
    use crate::infrastructure::memory::InMemoryRepositoryProvider;
    use crate::infrastructure::notify::RecordingNotificationSender;
    use crate::infrastructure::payments::RecordingPaymentProcessor;

    struct TestEnv {
        repos: Arc<dyn RepositoryProvider>,
        notifier: Arc<RecordingNotificationSender>,
        processor: Arc<RecordingPaymentProcessor>,
        lifecycle: BookingLifecycle,
        resource: Resource,
        requester: User,
    }

    async fn env() -> TestEnv {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        let notifier = RecordingNotificationSender::new();
        let processor = RecordingPaymentProcessor::new();
        let mut lifecycle = BookingLifecycle::new(
            repos.clone(),
            notifier.clone(),
            processor.clone(),
        );
        // Keep retry delays negligible in tests.
        lifecycle.retry = RetryConfig {
            initial_delay: StdDuration::from_millis(1),
            max_delay: StdDuration::from_millis(5),
            ..RetryConfig::default()
        };

        let resource = Resource::new("Sala grande", 40, rust_decimal::Decimal::new(10, 0));
        repos.resources().insert(resource.clone()).await.unwrap();

        let requester = User::new("ada@example.org", "Ada", "Byron", "hash", UserRole::User);
        repos.users().insert(requester.clone()).await.unwrap();

        TestEnv {
            repos,
            notifier,
            processor,
            lifecycle,
            resource,
            requester,
        }
    }

    async fn pending_booking(env: &TestEnv, hours_from_now: i64, duration: i64) -> Booking {
        let start = Utc::now() + Duration::hours(hours_from_now);
        let booking = Booking::new(
            env.resource.id,
            Some(env.requester.id),
            "Assemblea",
            start,
            start + Duration::hours(duration),
            10,
        )
        .unwrap();
        env.repos.bookings().insert_checked(booking).await.unwrap()
    }

    async fn paid_booking(env: &TestEnv, provider_reference: Option<&str>) -> Booking {
        let booking = pending_booking(env, 24, 2).await;
        env.lifecycle.approve(booking.id, None).await.unwrap();
        // 2h x 10/h, default settings have no tax
        env.lifecycle
            .record_payment(
                booking.id,
                rust_decimal::Decimal::new(20, 0),
                PaymentMethod::Card,
                provider_reference.map(String::from),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn approve_dispatches_payment_options() {
        let env = env().await;
        let booking = pending_booking(&env, 24, 2).await;

        let approved = env.lifecycle.approve(booking.id, None).await.unwrap();
        assert_eq!(approved.status, BookingStatus::Approved);
        assert!(approved.approved_at.is_some());

        let sent = env.notifier.sent_to("ada@example.org");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, NotificationTemplate::PaymentOptions);
    }

    #[tokio::test]
    async fn approve_twice_sends_exactly_one_notification() {
        let env = env().await;
        let booking = pending_booking(&env, 24, 2).await;

        env.lifecycle.approve(booking.id, None).await.unwrap();
        let err = env.lifecycle.approve(booking.id, None).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidTransition {
                from: BookingStatus::Approved,
                ..
            }
        ));
        assert_eq!(env.notifier.total_sent(), 1);
    }

    #[tokio::test]
    async fn approve_then_reject_fails_and_status_stays_approved() {
        let env = env().await;
        let booking = pending_booking(&env, 24, 2).await;
        env.lifecycle.approve(booking.id, None).await.unwrap();

        let err = env
            .lifecycle
            .reject(booking.id, RejectionReason::Other, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));

        let current = env
            .repos
            .bookings()
            .find_by_id(booking.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.status, BookingStatus::Approved);
    }

    #[tokio::test]
    async fn approve_fails_when_window_got_taken() {
        let env = env().await;
        let first = pending_booking(&env, 24, 2).await;
        // Same window; both could be created while nothing occupied it.
        let second = pending_booking(&env, 24, 2).await;

        env.lifecycle.approve(first.id, None).await.unwrap();
        let err = env.lifecycle.approve(second.id, None).await.unwrap_err();
        assert!(matches!(err, DomainError::SlotUnavailable { .. }));

        // Guard failure is reported, not retried; the booking stays pending.
        let current = env
            .repos
            .bookings()
            .find_by_id(second.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn reject_records_reason_and_notifies() {
        let env = env().await;
        let booking = pending_booking(&env, 24, 2).await;

        let rejected = env
            .lifecycle
            .reject(
                booking.id,
                RejectionReason::MaintenanceScheduled,
                Some("boiler service".into()),
            )
            .await
            .unwrap();
        assert_eq!(rejected.status, BookingStatus::Rejected);
        assert_eq!(
            rejected.rejection_reason,
            Some(RejectionReason::MaintenanceScheduled)
        );

        let sent = env.notifier.sent_to("ada@example.org");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, NotificationTemplate::BookingRejected);
    }

    #[tokio::test]
    async fn record_payment_guards_amount() {
        let env = env().await;
        let booking = pending_booking(&env, 24, 2).await;
        env.lifecycle.approve(booking.id, None).await.unwrap();

        let err = env
            .lifecycle
            .record_payment(
                booking.id,
                rust_decimal::Decimal::new(19, 0),
                PaymentMethod::Card,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let current = env
            .repos
            .bookings()
            .find_by_id(booking.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.status, BookingStatus::Approved);
    }

    #[tokio::test]
    async fn record_payment_moves_to_paid_with_invoice_number() {
        let env = env().await;
        let paid = paid_booking(&env, Some("ch_123")).await;
        assert_eq!(paid.status, BookingStatus::Paid);

        let payments = env.repos.payments().find_by_booking(paid.id).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].status, PaymentStatus::Completed);
        assert_eq!(payments[0].invoice_number.as_deref(), Some("BS-000001"));

        let sent = env.notifier.sent_to("ada@example.org");
        assert_eq!(sent.len(), 2); // payment options + confirmation
        assert_eq!(sent[1].0, NotificationTemplate::PaymentConfirmation);
    }

    #[tokio::test]
    async fn record_payment_requires_approved() {
        let env = env().await;
        let booking = pending_booking(&env, 24, 2).await;
        let err = env
            .lifecycle
            .record_payment(
                booking.id,
                rust_decimal::Decimal::new(20, 0),
                PaymentMethod::Card,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidTransition {
                from: BookingStatus::Pending,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn cancel_paid_initiates_exactly_one_refund_per_payment() {
        let env = env().await;
        let paid = paid_booking(&env, Some("ch_123")).await;

        env.lifecycle
            .cancel(paid.id, "event called off".into())
            .await
            .unwrap();

        assert_eq!(env.processor.refund_count("ch_123"), 1);
        assert_eq!(env.processor.total_refunds(), 1);

        let payments = env.repos.payments().find_by_booking(paid.id).await.unwrap();
        assert_eq!(payments[0].status, PaymentStatus::Refunded);

        // cancellation notification goes out for paid bookings
        let sent = env.notifier.sent_to("ada@example.org");
        assert_eq!(sent.last().unwrap().0, NotificationTemplate::BookingCancelled);
    }

    #[tokio::test]
    async fn cancel_pending_has_no_refund_and_no_notification() {
        let env = env().await;
        let booking = pending_booking(&env, 24, 2).await;

        let cancelled = env
            .lifecycle
            .cancel(booking.id, "changed plans".into())
            .await
            .unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(env.processor.total_refunds(), 0);
        assert_eq!(env.notifier.total_sent(), 0);
    }

    #[tokio::test]
    async fn cancel_twice_is_invalid() {
        let env = env().await;
        let booking = pending_booking(&env, 24, 2).await;
        env.lifecycle
            .cancel(booking.id, "changed plans".into())
            .await
            .unwrap();
        let err = env
            .lifecycle
            .cancel(booking.id, "again".into())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidTransition {
                from: BookingStatus::Cancelled,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn refund_failure_leaves_flag_and_does_not_fail_cancel() {
        let env = env().await;
        let paid = paid_booking(&env, Some("ch_456")).await;
        env.processor.set_always_fail(true);

        let cancelled = env
            .lifecycle
            .cancel(paid.id, "admin override".into())
            .await
            .unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);

        // Flag persists for operator follow-up; the transition stands.
        let payments = env.repos.payments().find_by_booking(paid.id).await.unwrap();
        assert_eq!(payments[0].status, PaymentStatus::RefundInitiated);
    }

    #[tokio::test]
    async fn bank_transfer_refund_stays_manual() {
        let env = env().await;
        let paid = paid_booking(&env, None).await;

        env.lifecycle
            .cancel(paid.id, "event called off".into())
            .await
            .unwrap();

        assert_eq!(env.processor.total_refunds(), 0);
        let payments = env.repos.payments().find_by_booking(paid.id).await.unwrap();
        assert_eq!(payments[0].status, PaymentStatus::RefundInitiated);
    }

    #[tokio::test]
    async fn notification_failure_does_not_roll_back_transition() {
        let env = env().await;
        let booking = pending_booking(&env, 24, 2).await;
        // Exhaust all retry attempts.
        env.notifier.fail_next(10);

        let approved = env.lifecycle.approve(booking.id, None).await.unwrap();
        assert_eq!(approved.status, BookingStatus::Approved);
        assert_eq!(env.notifier.total_sent(), 0);
    }

    #[tokio::test]
    async fn transient_notification_failure_is_retried() {
        let env = env().await;
        let booking = pending_booking(&env, 24, 2).await;
        env.notifier.fail_next(2);

        env.lifecycle.approve(booking.id, None).await.unwrap();
        assert_eq!(env.notifier.total_sent(), 1);
    }

    #[tokio::test]
    async fn approve_missing_booking_is_not_found() {
        let env = env().await;
        let err = env
            .lifecycle
            .approve(uuid::Uuid::new_v4(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
