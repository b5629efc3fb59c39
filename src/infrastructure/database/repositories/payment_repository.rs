//! SeaORM implementations of PaymentRepository and
//! RefreshTokenRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::domain::payment::{
    Payment, PaymentMethod, PaymentRepository, PaymentStatus, RefreshToken,
    RefreshTokenRepository,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{payment, refresh_token};

use super::booking_repository::db_err;

pub struct SeaOrmPaymentRepository {
    db: DatabaseConnection,
}

impl SeaOrmPaymentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

pub(super) fn payment_model_to_domain(m: payment::Model) -> DomainResult<Payment> {
    Ok(Payment {
        id: m.id,
        booking_id: m.booking_id,
        user_id: m.user_id,
        amount: m.amount,
        currency: m.currency,
        method: PaymentMethod::parse(&m.method)
            .ok_or_else(|| DomainError::Storage(format!("unknown payment method '{}'", m.method)))?,
        status: PaymentStatus::parse(&m.status)
            .ok_or_else(|| DomainError::Storage(format!("unknown payment status '{}'", m.status)))?,
        provider_reference: m.provider_reference,
        invoice_number: m.invoice_number,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn domain_to_active(p: &Payment) -> payment::ActiveModel {
    payment::ActiveModel {
        id: Set(p.id),
        booking_id: Set(p.booking_id),
        user_id: Set(p.user_id),
        amount: Set(p.amount),
        currency: Set(p.currency.clone()),
        method: Set(p.method.as_str().to_string()),
        status: Set(p.status.as_str().to_string()),
        provider_reference: Set(p.provider_reference.clone()),
        invoice_number: Set(p.invoice_number.clone()),
        created_at: Set(p.created_at),
        updated_at: Set(p.updated_at),
    }
}

// ── PaymentRepository impl ──────────────────────────────────────

#[async_trait]
impl PaymentRepository for SeaOrmPaymentRepository {
    async fn insert(&self, p: Payment) -> DomainResult<Payment> {
        debug!("Saving payment: {}", p.id);
        domain_to_active(&p).insert(&self.db).await.map_err(db_err)?;
        Ok(p)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Payment>> {
        let model = payment::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(payment_model_to_domain).transpose()
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> DomainResult<Vec<Payment>> {
        let models = payment::Entity::find()
            .filter(payment::Column::BookingId.eq(booking_id))
            .order_by_asc(payment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(payment_model_to_domain).collect()
    }

    async fn set_status(&self, id: Uuid, status: PaymentStatus) -> DomainResult<()> {
        let existing = payment::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Err(DomainError::NotFound {
                entity: "Payment",
                field: "id",
                value: id.to_string(),
            });
        };

        let mut active: payment::ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }
}

// ── RefreshTokenRepository impl ─────────────────────────────────

pub struct SeaOrmRefreshTokenRepository {
    db: DatabaseConnection,
}

impl SeaOrmRefreshTokenRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RefreshTokenRepository for SeaOrmRefreshTokenRepository {
    async fn insert(&self, t: RefreshToken) -> DomainResult<()> {
        refresh_token::ActiveModel {
            id: Set(t.id),
            user_id: Set(t.user_id),
            token_hash: Set(t.token_hash),
            expires_at: Set(t.expires_at),
            created_at: Set(t.created_at),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn find_for_user(&self, user_id: Uuid) -> DomainResult<Vec<RefreshToken>> {
        let models = refresh_token::Entity::find()
            .filter(refresh_token::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models
            .into_iter()
            .map(|m| RefreshToken {
                id: m.id,
                user_id: m.user_id,
                token_hash: m.token_hash,
                expires_at: m.expires_at,
                created_at: m.created_at,
            })
            .collect())
    }
}
