//! Payment settings service

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::domain::{DomainError, DomainResult, PaymentSettings, RepositoryProvider};

/// Patch for the payment settings singleton. `None` fields are left
/// unchanged.
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub bank_name: Option<String>,
    pub account_holder: Option<String>,
    pub iban: Option<String>,
    pub bank_transfer_enabled: Option<bool>,
    pub stripe_enabled: Option<bool>,
    pub payment_deadline_days: Option<i32>,
    pub currency: Option<String>,
    pub tax_rate: Option<Decimal>,
    pub invoice_prefix: Option<String>,
    pub reminders_enabled: Option<bool>,
    pub reminder_days_before: Option<i32>,
}

pub struct PaymentSettingsService {
    repos: Arc<dyn RepositoryProvider>,
}

impl PaymentSettingsService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// The singleton row; created with defaults on first access.
    pub async fn get(&self) -> DomainResult<PaymentSettings> {
        self.repos.settings().get_or_create().await
    }

    pub async fn update(&self, patch: SettingsPatch) -> DomainResult<PaymentSettings> {
        let mut settings = self.get().await?;

        if let Some(bank_name) = patch.bank_name {
            settings.bank_name = Some(bank_name);
        }
        if let Some(account_holder) = patch.account_holder {
            settings.account_holder = Some(account_holder);
        }
        if let Some(iban) = patch.iban {
            settings.iban = Some(iban);
        }
        if let Some(enabled) = patch.bank_transfer_enabled {
            settings.bank_transfer_enabled = enabled;
        }
        if let Some(enabled) = patch.stripe_enabled {
            settings.stripe_enabled = enabled;
        }
        if let Some(days) = patch.payment_deadline_days {
            if days < 1 {
                return Err(DomainError::Validation(
                    "payment_deadline_days must be positive".to_string(),
                ));
            }
            settings.payment_deadline_days = days;
        }
        if let Some(currency) = patch.currency {
            settings.currency = currency;
        }
        if let Some(tax_rate) = patch.tax_rate {
            if tax_rate < Decimal::ZERO || tax_rate >= Decimal::ONE {
                return Err(DomainError::Validation(
                    "tax_rate must be a fraction in [0, 1)".to_string(),
                ));
            }
            settings.tax_rate = tax_rate;
        }
        if let Some(prefix) = patch.invoice_prefix {
            settings.invoice_prefix = prefix;
        }
        if let Some(enabled) = patch.reminders_enabled {
            settings.reminders_enabled = enabled;
        }
        if let Some(days) = patch.reminder_days_before {
            if days < 0 {
                return Err(DomainError::Validation(
                    "reminder_days_before must not be negative".to_string(),
                ));
            }
            settings.reminder_days_before = days;
        }
        settings.updated_at = chrono::Utc::now();

        self.repos.settings().update(settings.clone()).await?;
        info!("Payment settings updated");
        Ok(settings)
    }

    /// Claim the next invoice number and render it with the configured
    /// prefix.
    pub async fn next_invoice_number(&self) -> DomainResult<String> {
        let settings = self.get().await?;
        let number = self.repos.settings().next_invoice_number().await?;
        Ok(settings.format_invoice_number(number))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryRepositoryProvider;
    use std::sync::Arc;

    fn service() -> PaymentSettingsService {
        PaymentSettingsService::new(Arc::new(InMemoryRepositoryProvider::new()))
    }

    #[tokio::test]
    async fn get_creates_defaults_idempotently() {
        let service = service();
        let first = service.get().await.unwrap();
        let second = service.get().await.unwrap();
        assert_eq!(first.currency, second.currency);
        assert_eq!(first.payment_deadline_days, second.payment_deadline_days);
        assert_eq!(first.invoice_current_number, second.invoice_current_number);
    }

    #[tokio::test]
    async fn update_patches_and_persists() {
        let service = service();
        let updated = service
            .update(SettingsPatch {
                bank_name: Some("Banca Popolare".to_string()),
                iban: Some("IT60X0542811101000000123456".to_string()),
                tax_rate: Some(Decimal::new(22, 2)),
                ..SettingsPatch::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.bank_name.as_deref(), Some("Banca Popolare"));
        assert_eq!(updated.tax_rate, Decimal::new(22, 2));

        let reread = service.get().await.unwrap();
        assert_eq!(reread.bank_name.as_deref(), Some("Banca Popolare"));
    }

    #[tokio::test]
    async fn update_rejects_bad_bounds() {
        let service = service();
        let err = service
            .update(SettingsPatch {
                tax_rate: Some(Decimal::new(15, 1)), // 1.5
                ..SettingsPatch::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = service
            .update(SettingsPatch {
                payment_deadline_days: Some(0),
                ..SettingsPatch::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn invoice_numbers_are_monotonic() {
        let service = service();
        let first = service.next_invoice_number().await.unwrap();
        let second = service.next_invoice_number().await.unwrap();
        assert_eq!(first, "BS-000001");
        assert_eq!(second, "BS-000002");
    }
}
