//! Outbound ports — interfaces for notification delivery and payment refunds
//!
//! These traits are the architectural contract that decouples the
//! lifecycle and reminder services from the concrete transport
//! (mail provider, card processor). Production wiring uses the
//! tracing-backed implementations in `infrastructure::{notify,payments}`;
//! tests use the recording implementations from the same modules.

use async_trait::async_trait;

use crate::domain::DomainResult;

// ── Notifications ──────────────────────────────────────────────

/// Message templates the booking lifecycle can dispatch.
///
/// The template id is what the delivery layer resolves to a concrete
/// mail body; the core only picks the template and fills variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationTemplate {
    /// Booking approved: how to pay (card link, bank transfer details)
    PaymentOptions,
    /// Booking rejected, with the reason
    BookingRejected,
    /// Payment received in full
    PaymentConfirmation,
    /// Paid booking cancelled, refund on its way
    BookingCancelled,
    /// Payment deadline approaching
    PaymentReminder,
}

impl NotificationTemplate {
    pub fn template_id(&self) -> &'static str {
        match self {
            Self::PaymentOptions => "booking.payment_options",
            Self::BookingRejected => "booking.rejected",
            Self::PaymentConfirmation => "booking.payment_confirmation",
            Self::BookingCancelled => "booking.cancelled",
            Self::PaymentReminder => "booking.payment_reminder",
        }
    }
}

impl std::fmt::Display for NotificationTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.template_id())
    }
}

/// Template variables, rendered by the delivery layer.
pub type TemplateVars = Vec<(&'static str, String)>;

/// Port for dispatching a templated notification to one recipient.
///
/// Call sites treat delivery as best-effort: failures are retried with
/// backoff, logged, and never propagate into the booking transition
/// that triggered them.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(
        &self,
        template: NotificationTemplate,
        recipient: &str,
        variables: TemplateVars,
    ) -> DomainResult<()>;
}

// ── Payments ───────────────────────────────────────────────────

/// Port for initiating a refund with the payment processor.
///
/// Hosted checkout (collecting the payment) is entirely external; the
/// core only ever asks the processor to give money back, identified by
/// the provider-side reference stored on the payment row.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn refund(&self, provider_reference: &str) -> DomainResult<()>;
}
