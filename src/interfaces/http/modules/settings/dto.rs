//! Payment settings DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::PaymentSettings;

/// Payment settings API representation
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentSettingsDto {
    pub bank_name: Option<String>,
    pub account_holder: Option<String>,
    pub iban: Option<String>,
    pub bank_transfer_enabled: bool,
    pub stripe_enabled: bool,
    pub payment_deadline_days: i32,
    pub currency: String,
    pub tax_rate: Decimal,
    pub invoice_prefix: String,
    pub reminders_enabled: bool,
    pub reminder_days_before: i32,
}

impl From<PaymentSettings> for PaymentSettingsDto {
    fn from(s: PaymentSettings) -> Self {
        Self {
            bank_name: s.bank_name,
            account_holder: s.account_holder,
            iban: s.iban,
            bank_transfer_enabled: s.bank_transfer_enabled,
            stripe_enabled: s.stripe_enabled,
            payment_deadline_days: s.payment_deadline_days,
            currency: s.currency,
            tax_rate: s.tax_rate,
            invoice_prefix: s.invoice_prefix,
            reminders_enabled: s.reminders_enabled,
            reminder_days_before: s.reminder_days_before,
        }
    }
}

/// Update payment settings request; omitted fields stay unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePaymentSettingsRequest {
    #[validate(length(max = 200))]
    pub bank_name: Option<String>,
    #[validate(length(max = 200))]
    pub account_holder: Option<String>,
    #[validate(length(max = 34))]
    pub iban: Option<String>,
    pub bank_transfer_enabled: Option<bool>,
    pub stripe_enabled: Option<bool>,
    #[validate(range(min = 1, max = 365))]
    pub payment_deadline_days: Option<i32>,
    #[validate(length(min = 3, max = 3))]
    pub currency: Option<String>,
    /// Fraction applied to the subtotal, e.g. 0.22
    pub tax_rate: Option<Decimal>,
    #[validate(length(max = 16))]
    pub invoice_prefix: Option<String>,
    pub reminders_enabled: Option<bool>,
    #[validate(range(min = 0, max = 60))]
    pub reminder_days_before: Option<i32>,
}
