//! Booking price computation
//!
//! Bookings are billed per started hour: the primary resource's hourly
//! price plus each additional resource's hourly price times its
//! quantity, with the community tax rate applied to the subtotal.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::{DomainError, DomainResult, PaymentSettings, Resource};

/// Price breakdown for a booking window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    /// Billable (started) hours
    pub hours: i64,
    /// Primary resource cost
    pub base: Decimal,
    /// Additional resources cost
    pub additional: Decimal,
    pub subtotal: Decimal,
    pub tax: Decimal,
    /// Amount a payment must match exactly
    pub total: Decimal,
    pub currency: String,
}

/// Number of started hours in `[start, end)`.
pub fn billable_hours(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<i64> {
    if start >= end {
        return Err(DomainError::Validation(
            "start_time must be strictly before end_time".to_string(),
        ));
    }
    let minutes = (end - start).num_minutes();
    Ok((minutes + 59) / 60)
}

/// Compute the quote for a booking of `resource` over `[start, end)`
/// with `extras` as (resource, quantity) pairs.
pub fn quote(
    resource: &Resource,
    extras: &[(Resource, i32)],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    settings: &PaymentSettings,
) -> DomainResult<Quote> {
    let hours = billable_hours(start, end)?;
    let hours_dec = Decimal::from(hours);

    let base = resource.hourly_price * hours_dec;
    let additional: Decimal = extras
        .iter()
        .map(|(r, qty)| r.hourly_price * Decimal::from(*qty) * hours_dec)
        .sum();

    let subtotal = base + additional;
    let tax = (subtotal * settings.tax_rate).round_dp(2);
    let total = subtotal + tax;

    Ok(Quote {
        hours,
        base,
        additional,
        subtotal,
        tax,
        total,
        currency: settings.currency.clone(),
    })
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn settings_with_tax(tax_rate: Decimal) -> PaymentSettings {
        PaymentSettings {
            tax_rate,
            ..PaymentSettings::default()
        }
    }

    fn room(price_units: i64) -> Resource {
        Resource::new("Sala grande", 40, Decimal::new(price_units, 0))
    }

    fn window(hours: i64, extra_minutes: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = Utc::now();
        (
            start,
            start + Duration::hours(hours) + Duration::minutes(extra_minutes),
        )
    }

    #[test]
    fn whole_hours() {
        let (start, end) = window(2, 0);
        assert_eq!(billable_hours(start, end).unwrap(), 2);
    }

    #[test]
    fn started_hour_rounds_up() {
        let (start, end) = window(1, 30);
        assert_eq!(billable_hours(start, end).unwrap(), 2);
        let (start, end) = window(0, 1);
        assert_eq!(billable_hours(start, end).unwrap(), 1);
    }

    #[test]
    fn inverted_window_is_rejected() {
        let (start, end) = window(1, 0);
        assert!(billable_hours(end, start).is_err());
    }

    #[test]
    fn quote_without_extras_or_tax() {
        let (start, end) = window(3, 0);
        let q = quote(&room(10), &[], start, end, &settings_with_tax(Decimal::ZERO)).unwrap();
        assert_eq!(q.hours, 3);
        assert_eq!(q.base, Decimal::new(30, 0));
        assert_eq!(q.additional, Decimal::ZERO);
        assert_eq!(q.tax, Decimal::ZERO);
        assert_eq!(q.total, Decimal::new(30, 0));
    }

    #[test]
    fn quote_with_extras_and_tax() {
        let (start, end) = window(2, 0);
        // projector at 5/h x2 alongside the room at 10/h, 22% tax
        let extras = vec![(Resource::new("Projector", 1, Decimal::new(5, 0)), 2)];
        let q = quote(
            &room(10),
            &extras,
            start,
            end,
            &settings_with_tax(Decimal::new(22, 2)),
        )
        .unwrap();
        assert_eq!(q.base, Decimal::new(20, 0));
        assert_eq!(q.additional, Decimal::new(20, 0));
        assert_eq!(q.subtotal, Decimal::new(40, 0));
        assert_eq!(q.tax, Decimal::new(880, 2)); // 8.80
        assert_eq!(q.total, Decimal::new(4880, 2)); // 48.80
    }

    #[test]
    fn tax_is_rounded_to_cents() {
        let (start, end) = window(1, 0);
        // 9.99/h at 7.7% tax: 0.76923 rounds to 0.77
        let r = Resource::new("Desk", 1, Decimal::new(999, 2));
        let s = settings_with_tax(Decimal::new(77, 3));
        let q = quote(&r, &[], start, end, &s).unwrap();
        assert_eq!(q.tax, Decimal::new(77, 2));
        assert_eq!(q.total, Decimal::new(1076, 2)); // 10.76
    }
}
