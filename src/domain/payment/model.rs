//! Payment domain entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// How the payment was collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Card via the provider's hosted checkout
    Card,
    /// Manual bank transfer, confirmed by staff
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::BankTransfer => "bank_transfer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "card" => Some(Self::Card),
            "bank_transfer" => Some(Self::BankTransfer),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    /// Awaiting settlement (bank transfer not yet confirmed)
    Pending,
    /// Settled in full
    Completed,
    /// Refund requested from the processor, outcome not yet known
    RefundInitiated,
    /// Refund confirmed by the processor
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::RefundInitiated => "refund_initiated",
            Self::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "refund_initiated" => Some(Self::RefundInitiated),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A payment collected for a booking
#[derive(Debug, Clone)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    /// Paying user; `None` for guest bookings
    pub user_id: Option<Uuid>,
    /// Gross amount, tax included
    pub amount: Decimal,
    /// ISO currency code from the payment settings
    pub currency: String,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Processor-side handle used for refunds
    pub provider_reference: Option<String>,
    /// Invoice number assigned from the settings counter
    pub invoice_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        booking_id: Uuid,
        user_id: Option<Uuid>,
        amount: Decimal,
        currency: impl Into<String>,
        method: PaymentMethod,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            booking_id,
            user_id,
            amount,
            currency: currency.into(),
            method,
            status: PaymentStatus::Completed,
            provider_reference: None,
            invoice_number: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A refund can be initiated only for settled payments.
    pub fn is_refundable(&self) -> bool {
        self.status == PaymentStatus::Completed
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn new_payment_is_completed() {
        let p = Payment::new(Uuid::new_v4(), None, Decimal::new(12050, 2), "EUR", PaymentMethod::Card);
        assert_eq!(p.status, PaymentStatus::Completed);
        assert!(p.is_refundable());
    }

    #[test]
    fn refunded_payment_is_not_refundable() {
        let mut p = Payment::new(Uuid::new_v4(), None, Decimal::ONE, "EUR", PaymentMethod::Card);
        p.status = PaymentStatus::Refunded;
        assert!(!p.is_refundable());
    }

    #[test]
    fn status_string_roundtrip() {
        for status in &[
            PaymentStatus::Pending,
            PaymentStatus::Completed,
            PaymentStatus::RefundInitiated,
            PaymentStatus::Refunded,
        ] {
            assert_eq!(PaymentStatus::parse(status.as_str()), Some(*status));
        }
    }

    #[test]
    fn method_string_roundtrip() {
        for method in &[PaymentMethod::Card, PaymentMethod::BankTransfer] {
            assert_eq!(PaymentMethod::parse(method.as_str()), Some(*method));
        }
        assert_eq!(PaymentMethod::parse("cash"), None);
    }
}
