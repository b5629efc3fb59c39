//! Payment and refresh-token repository interfaces

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::model::{Payment, PaymentStatus};
use crate::domain::DomainResult;

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn insert(&self, payment: Payment) -> DomainResult<Payment>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Payment>>;

    /// All payments recorded for a booking, oldest first.
    async fn find_by_booking(&self, booking_id: Uuid) -> DomainResult<Vec<Payment>>;

    async fn set_status(&self, id: Uuid, status: PaymentStatus) -> DomainResult<()>;
}

/// Refresh token issued by the upstream auth layer.
///
/// The booking core never issues or verifies these; the rows exist so
/// user deletion can cascade over them.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn insert(&self, token: RefreshToken) -> DomainResult<()>;

    async fn find_for_user(&self, user_id: Uuid) -> DomainResult<Vec<RefreshToken>>;
}
