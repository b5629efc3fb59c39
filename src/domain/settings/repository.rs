//! Payment settings repository interface

use async_trait::async_trait;

use super::model::PaymentSettings;
use crate::domain::DomainResult;

#[async_trait]
pub trait PaymentSettingsRepository: Send + Sync {
    /// Fetch the singleton row, creating it with defaults when absent.
    /// Idempotent; this is the only read path.
    async fn get_or_create(&self) -> DomainResult<PaymentSettings>;

    async fn update(&self, settings: PaymentSettings) -> DomainResult<()>;

    /// Increment the invoice counter atomically and return the value
    /// that was claimed.
    async fn next_invoice_number(&self) -> DomainResult<i32>;
}
