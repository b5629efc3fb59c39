//! Notification sender implementations
//!
//! The mail transport itself is external; the production binary wires
//! [`LoggingNotificationSender`], which records every dispatch in the
//! structured log where the delivery worker picks it up. Tests use
//! [`RecordingNotificationSender`] to assert on exactly what was sent.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::info;

use crate::application::ports::{NotificationSender, NotificationTemplate, TemplateVars};
use crate::domain::{DomainError, DomainResult};

/// Logs each notification instead of delivering it.
pub struct LoggingNotificationSender;

#[async_trait]
impl NotificationSender for LoggingNotificationSender {
    async fn send(
        &self,
        template: NotificationTemplate,
        recipient: &str,
        variables: TemplateVars,
    ) -> DomainResult<()> {
        info!(
            template = %template,
            recipient,
            variables = ?variables,
            "Notification dispatched"
        );
        Ok(())
    }
}

/// Records sends per recipient; optionally fails the first N attempts
/// to exercise the retry path.
pub struct RecordingNotificationSender {
    sent: DashMap<String, Vec<(NotificationTemplate, TemplateVars)>>,
    fail_first: std::sync::atomic::AtomicU32,
}

impl RecordingNotificationSender {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: DashMap::new(),
            fail_first: std::sync::atomic::AtomicU32::new(0),
        })
    }

    /// Make the next `n` send attempts fail with a transient error.
    pub fn fail_next(&self, n: u32) {
        self.fail_first
            .store(n, std::sync::atomic::Ordering::SeqCst);
    }

    /// All messages sent to `recipient`, in order.
    pub fn sent_to(&self, recipient: &str) -> Vec<(NotificationTemplate, TemplateVars)> {
        self.sent
            .get(recipient)
            .map(|v| v.clone())
            .unwrap_or_default()
    }

    /// Total number of successful sends across all recipients.
    pub fn total_sent(&self) -> usize {
        self.sent.iter().map(|entry| entry.value().len()).sum()
    }
}

#[async_trait]
impl NotificationSender for RecordingNotificationSender {
    async fn send(
        &self,
        template: NotificationTemplate,
        recipient: &str,
        variables: TemplateVars,
    ) -> DomainResult<()> {
        use std::sync::atomic::Ordering;
        let remaining = self.fail_first.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_first.store(remaining - 1, Ordering::SeqCst);
            return Err(DomainError::Storage("simulated delivery failure".to_string()));
        }
        self.sent
            .entry(recipient.to_string())
            .or_default()
            .push((template, variables));
        Ok(())
    }
}
