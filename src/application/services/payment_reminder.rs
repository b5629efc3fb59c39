//! Background task that reminds requesters about upcoming payment
//! deadlines.
//!
//! Runs in a tokio::spawn loop. Each sweep finds approved bookings
//! whose deadline (approval time + payment_deadline_days) is within
//! reminder_days_before and that have not been reminded yet, then
//! dispatches one reminder per booking.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::time::Duration as TokioDuration;
use tracing::{debug, info, warn};

use crate::application::ports::{NotificationSender, NotificationTemplate};
use crate::domain::{Booking, DomainResult, RepositoryProvider};
use crate::shared::retry::{retry_with_backoff, RetryConfig};
use crate::shared::shutdown::ShutdownSignal;

/// Start the payment reminder background task.
pub fn start_payment_reminder_task(
    repos: Arc<dyn RepositoryProvider>,
    notifier: Arc<dyn NotificationSender>,
    shutdown: ShutdownSignal,
    check_interval_secs: u64,
) {
    tokio::spawn(async move {
        info!(
            check_interval = check_interval_secs,
            "Payment reminder task started"
        );

        let mut interval = tokio::time::interval(TokioDuration::from_secs(check_interval_secs));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = run_sweep(&repos, &notifier).await {
                        warn!(error = %e, "Payment reminder sweep error");
                    }
                }
                _ = shutdown.notified().wait() => {
                    info!("Payment reminder task shutting down");
                    break;
                }
            }
        }

        info!("Payment reminder task stopped");
    });
}

async fn run_sweep(
    repos: &Arc<dyn RepositoryProvider>,
    notifier: &Arc<dyn NotificationSender>,
) -> DomainResult<()> {
    let settings = repos.settings().get_or_create().await?;
    if !settings.reminders_enabled {
        return Ok(());
    }

    // Remind once the booking has been approved for longer than
    // (deadline - lead time) days.
    let lead_days = (settings.payment_deadline_days - settings.reminder_days_before).max(0);
    let approved_before = Utc::now() - Duration::days(i64::from(lead_days));

    let due = repos
        .bookings()
        .find_needing_payment_reminder(approved_before)
        .await?;
    if due.is_empty() {
        return Ok(());
    }

    info!(count = due.len(), "Dispatching payment reminders");

    for booking in due {
        let Some(recipient) = recipient_for(repos, &booking).await? else {
            debug!(booking_id = %booking.id, "No recipient address; marking reminder as handled");
            repos.bookings().mark_reminder_sent(booking.id).await?;
            continue;
        };

        let deadline = booking
            .approved_at
            .map(|at| at + Duration::days(i64::from(settings.payment_deadline_days)));
        let variables = vec![
            ("booking_title", booking.title.clone()),
            (
                "payment_deadline",
                deadline.map(|d| d.to_rfc3339()).unwrap_or_default(),
            ),
        ];

        let sent = retry_with_backoff(
            RetryConfig::default(),
            || notifier.send(NotificationTemplate::PaymentReminder, &recipient, variables.clone()),
            |err| err.is_transient(),
            "payment_reminder",
        )
        .await;

        match sent {
            // Flag only after a successful send; failures are retried
            // on the next sweep.
            Ok(()) => repos.bookings().mark_reminder_sent(booking.id).await?,
            Err(e) => warn!(booking_id = %booking.id, error = %e, "Payment reminder dispatch failed"),
        }
    }

    Ok(())
}

async fn recipient_for(
    repos: &Arc<dyn RepositoryProvider>,
    booking: &Booking,
) -> DomainResult<Option<String>> {
    if let Some(user_id) = booking.requester_id {
        Ok(repos.users().find_by_id(user_id).await?.map(|u| u.email))
    } else {
        Ok(booking.guest_email.clone())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::domain::{Booking, BookingStatus, Resource, StatusChange, User, UserRole};
    use crate::infrastructure::memory::InMemoryRepositoryProvider;
    use crate::infrastructure::notify::RecordingNotificationSender;

    async fn approved_booking(
        repos: &Arc<dyn RepositoryProvider>,
        requester: Option<Uuid>,
        approved_days_ago: i64,
    ) -> Booking {
        let resource = Resource::new("Sala", 10, Decimal::new(5, 0));
        repos.resources().insert(resource.clone()).await.unwrap();

        let start = Utc::now() + Duration::days(60);
        let booking = Booking::new(
            resource.id,
            requester,
            "Assemblea",
            start,
            start + Duration::hours(1),
            5,
        )
        .unwrap();
        let booking = repos.bookings().insert_checked(booking).await.unwrap();
        repos
            .bookings()
            .set_status_checked(
                booking.id,
                BookingStatus::Pending,
                BookingStatus::Approved,
                StatusChange {
                    approved_at: Some(Utc::now() - Duration::days(approved_days_ago)),
                    ..StatusChange::default()
                },
            )
            .await
            .unwrap();
        repos.bookings().find_by_id(booking.id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn sweep_reminds_once_per_booking() {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        let notifier = RecordingNotificationSender::new();

        let user = User::new("ada@example.org", "Ada", "Byron", "hash", UserRole::User);
        repos.users().insert(user.clone()).await.unwrap();

        // Default settings: 14-day deadline, reminder 3 days before, so
        // 12 days after approval the reminder is due.
        approved_booking(&repos, Some(user.id), 12).await;

        let sender: Arc<dyn NotificationSender> = notifier.clone();
        run_sweep(&repos, &sender).await.unwrap();
        let sent = notifier.sent_to("ada@example.org");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, NotificationTemplate::PaymentReminder);

        // Second sweep: already flagged, nothing new goes out.
        run_sweep(&repos, &sender).await.unwrap();
        assert_eq!(notifier.total_sent(), 1);
    }

    #[tokio::test]
    async fn sweep_skips_fresh_approvals() {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        let notifier = RecordingNotificationSender::new();

        let user = User::new("ada@example.org", "Ada", "Byron", "hash", UserRole::User);
        repos.users().insert(user.clone()).await.unwrap();
        approved_booking(&repos, Some(user.id), 1).await;

        let sender: Arc<dyn NotificationSender> = notifier.clone();
        run_sweep(&repos, &sender).await.unwrap();
        assert_eq!(notifier.total_sent(), 0);
    }

    #[tokio::test]
    async fn sweep_respects_disabled_reminders() {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        let notifier = RecordingNotificationSender::new();

        let mut settings = repos.settings().get_or_create().await.unwrap();
        settings.reminders_enabled = false;
        repos.settings().update(settings).await.unwrap();

        let user = User::new("ada@example.org", "Ada", "Byron", "hash", UserRole::User);
        repos.users().insert(user.clone()).await.unwrap();
        approved_booking(&repos, Some(user.id), 12).await;

        let sender: Arc<dyn NotificationSender> = notifier.clone();
        run_sweep(&repos, &sender).await.unwrap();
        assert_eq!(notifier.total_sent(), 0);
    }

    #[tokio::test]
    async fn sweep_flags_bookings_without_recipient() {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        let notifier = RecordingNotificationSender::new();

        let booking = approved_booking(&repos, None, 12).await;

        let sender: Arc<dyn NotificationSender> = notifier.clone();
        run_sweep(&repos, &sender).await.unwrap();
        assert_eq!(notifier.total_sent(), 0);
        let current = repos.bookings().find_by_id(booking.id).await.unwrap().unwrap();
        assert!(current.reminder_sent);
    }
}
