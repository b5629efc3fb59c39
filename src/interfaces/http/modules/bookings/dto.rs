//! Booking DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::application::services::Quote;
use crate::domain::{AdditionalResource, Booking, Payment};

/// Extra resource attached to a booking request
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AdditionalResourceDto {
    pub resource_id: Uuid,
    pub quantity: i32,
}

impl From<AdditionalResourceDto> for AdditionalResource {
    fn from(dto: AdditionalResourceDto) -> Self {
        Self {
            resource_id: dto.resource_id,
            quantity: dto.quantity,
        }
    }
}

impl From<AdditionalResource> for AdditionalResourceDto {
    fn from(a: AdditionalResource) -> Self {
        Self {
            resource_id: a.resource_id,
            quantity: a.quantity,
        }
    }
}

/// Request to create a booking for the authenticated user
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    pub resource_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    /// Start of the booked window (RFC 3339)
    pub start_time: DateTime<Utc>,
    /// End of the booked window (RFC 3339)
    pub end_time: DateTime<Utc>,
    #[validate(range(min = 1))]
    pub attendees: i32,
    #[serde(default)]
    pub additional_resources: Vec<AdditionalResourceDto>,
    #[serde(default)]
    pub is_private: bool,
}

/// Request to create a booking on behalf of a guest (staff console)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateManualBookingRequest {
    pub resource_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[validate(range(min = 1))]
    pub attendees: i32,
    #[serde(default)]
    pub additional_resources: Vec<AdditionalResourceDto>,
    #[serde(default)]
    pub is_private: bool,
    #[validate(length(min = 1, max = 200))]
    pub guest_name: String,
    #[validate(email)]
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    /// Create directly approved (same availability guard)
    #[serde(default)]
    pub auto_approve: bool,
}

/// Patch for a pending booking; omitted fields stay unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBookingRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub attendees: Option<i32>,
    pub is_private: Option<bool>,
    pub additional_resources: Option<Vec<AdditionalResourceDto>>,
}

/// Approve request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ApproveBookingRequest {
    #[validate(length(max = 1000))]
    pub note: Option<String>,
}

/// Reject request; `reason` is one of the closed set
/// (resource_unavailable, maintenance_scheduled, event_already_booked,
/// insufficient_documentation, capacity_exceeded, payment_issues,
/// other)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RejectBookingRequest {
    #[validate(length(min = 1))]
    pub reason: String,
    #[validate(length(max = 1000))]
    pub note: Option<String>,
}

/// Cancel request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CancelBookingRequest {
    #[validate(length(min = 1, max = 1000))]
    pub reason: String,
}

/// Record a payment against an approved booking
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordPaymentRequest {
    /// Gross amount; must equal the quoted total
    pub amount: Decimal,
    /// "card" or "bank_transfer"
    #[validate(length(min = 1))]
    pub method: String,
    /// Processor-side reference (required for card refunds)
    pub provider_reference: Option<String>,
}

/// Availability check query
#[derive(Debug, Deserialize, IntoParams)]
pub struct AvailabilityParams {
    pub resource_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Booking list query
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListBookingsParams {
    /// Filter by status (pending, approved, rejected, paid, cancelled)
    pub status: Option<String>,
    pub resource_id: Option<Uuid>,
    pub requester_id: Option<Uuid>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    50
}

/// Booking details in API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingDto {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub requester_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub attendees: i32,
    pub status: String,
    pub additional_resources: Vec<AdditionalResourceDto>,
    pub rejection_reason: Option<String>,
    pub cancellation_reason: Option<String>,
    pub admin_note: Option<String>,
    pub is_private: bool,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingDto {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            resource_id: b.resource_id,
            requester_id: b.requester_id,
            title: b.title,
            description: b.description,
            start_time: b.start_time,
            end_time: b.end_time,
            attendees: b.attendees,
            status: b.status.as_str().to_string(),
            additional_resources: b
                .additional_resources
                .into_iter()
                .map(Into::into)
                .collect(),
            rejection_reason: b.rejection_reason.map(|r| r.as_str().to_string()),
            cancellation_reason: b.cancellation_reason,
            admin_note: b.admin_note,
            is_private: b.is_private,
            guest_name: b.guest_name,
            guest_email: b.guest_email,
            guest_phone: b.guest_phone,
            approved_at: b.approved_at,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

/// Payment details in API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentDto {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub method: String,
    pub status: String,
    pub invoice_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Payment> for PaymentDto {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            booking_id: p.booking_id,
            amount: p.amount,
            currency: p.currency,
            method: p.method.as_str().to_string(),
            status: p.status.as_str().to_string(),
            invoice_number: p.invoice_number,
            created_at: p.created_at,
        }
    }
}

/// Booking with its recorded payments
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingDetailDto {
    #[serde(flatten)]
    pub booking: BookingDto,
    pub payments: Vec<PaymentDto>,
}

/// Availability check result
#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub available: bool,
}

/// Price breakdown for a booking
#[derive(Debug, Serialize, ToSchema)]
pub struct QuoteDto {
    pub hours: i64,
    pub base: Decimal,
    pub additional: Decimal,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub currency: String,
}

impl From<Quote> for QuoteDto {
    fn from(q: Quote) -> Self {
        Self {
            hours: q.hours,
            base: q.base,
            additional: q.additional,
            subtotal: q.subtotal,
            tax: q.tax,
            total: q.total,
            currency: q.currency,
        }
    }
}
