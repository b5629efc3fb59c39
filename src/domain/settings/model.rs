//! Payment settings singleton

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Community-wide payment configuration.
///
/// At most one row exists; reads go through find-or-create so absence
/// always resolves to these defaults.
#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub bank_name: Option<String>,
    pub account_holder: Option<String>,
    pub iban: Option<String>,
    pub bank_transfer_enabled: bool,
    pub stripe_enabled: bool,
    /// Days after approval before payment is due
    pub payment_deadline_days: i32,
    /// ISO currency code for quotes and invoices
    pub currency: String,
    /// Fraction applied to the subtotal, e.g. 0.22
    pub tax_rate: Decimal,
    pub invoice_prefix: String,
    pub invoice_start_number: i32,
    pub invoice_current_number: i32,
    pub reminders_enabled: bool,
    /// Days before the payment deadline to dispatch the reminder
    pub reminder_days_before: i32,
    pub updated_at: DateTime<Utc>,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            bank_name: None,
            account_holder: None,
            iban: None,
            bank_transfer_enabled: true,
            stripe_enabled: false,
            payment_deadline_days: 14,
            currency: "EUR".to_string(),
            tax_rate: Decimal::ZERO,
            invoice_prefix: "BS-".to_string(),
            invoice_start_number: 1,
            invoice_current_number: 1,
            reminders_enabled: true,
            reminder_days_before: 3,
            updated_at: Utc::now(),
        }
    }
}

impl PaymentSettings {
    /// Render the invoice number for the current counter value.
    pub fn format_invoice_number(&self, number: i32) -> String {
        format!("{}{:06}", self.invoice_prefix, number)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let s = PaymentSettings::default();
        assert!(s.bank_transfer_enabled);
        assert_eq!(s.payment_deadline_days, 14);
        assert_eq!(s.invoice_current_number, s.invoice_start_number);
    }

    #[test]
    fn invoice_number_is_zero_padded() {
        let s = PaymentSettings::default();
        assert_eq!(s.format_invoice_number(42), "BS-000042");
    }
}
