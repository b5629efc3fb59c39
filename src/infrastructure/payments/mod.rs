//! Payment processor implementations
//!
//! Hosted checkout and webhook verification live entirely with the
//! provider; the core only initiates refunds. The production binary
//! wires [`LoggingPaymentProcessor`] until a provider adapter is
//! configured; tests use [`RecordingPaymentProcessor`].

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::info;

use crate::application::ports::PaymentProcessor;
use crate::domain::{DomainError, DomainResult};

/// Logs each refund request instead of calling a provider.
pub struct LoggingPaymentProcessor;

#[async_trait]
impl PaymentProcessor for LoggingPaymentProcessor {
    async fn refund(&self, provider_reference: &str) -> DomainResult<()> {
        info!(provider_reference, "Refund initiated");
        Ok(())
    }
}

/// Records refund calls per provider reference; optionally fails every
/// call to exercise the never-unwind path.
pub struct RecordingPaymentProcessor {
    refunds: DashMap<String, u32>,
    always_fail: std::sync::atomic::AtomicBool,
}

impl RecordingPaymentProcessor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            refunds: DashMap::new(),
            always_fail: std::sync::atomic::AtomicBool::new(false),
        })
    }

    pub fn set_always_fail(&self, fail: bool) {
        self.always_fail
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    /// How many times a refund was requested for `reference`.
    pub fn refund_count(&self, reference: &str) -> u32 {
        self.refunds.get(reference).map(|c| *c).unwrap_or(0)
    }

    pub fn total_refunds(&self) -> u32 {
        self.refunds.iter().map(|entry| *entry.value()).sum()
    }
}

#[async_trait]
impl PaymentProcessor for RecordingPaymentProcessor {
    async fn refund(&self, provider_reference: &str) -> DomainResult<()> {
        *self
            .refunds
            .entry(provider_reference.to_string())
            .or_insert(0) += 1;
        if self.always_fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(DomainError::Validation(
                "refund rejected by processor".to_string(),
            ));
        }
        Ok(())
    }
}
