//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::booking::BookingRepository;
use crate::domain::payment::{PaymentRepository, RefreshTokenRepository};
use crate::domain::repositories::RepositoryProvider;
use crate::domain::resource::ResourceRepository;
use crate::domain::settings::PaymentSettingsRepository;
use crate::domain::user::UserRepository;

use super::booking_repository::SeaOrmBookingRepository;
use super::payment_repository::{SeaOrmPaymentRepository, SeaOrmRefreshTokenRepository};
use super::resource_repository::SeaOrmResourceRepository;
use super::settings_repository::SeaOrmPaymentSettingsRepository;
use super::user_repository::SeaOrmUserRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository
/// accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let booking = repos.bookings().find_by_id(id).await?;
/// let settings = repos.settings().get_or_create().await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    bookings: SeaOrmBookingRepository,
    resources: SeaOrmResourceRepository,
    users: SeaOrmUserRepository,
    payments: SeaOrmPaymentRepository,
    refresh_tokens: SeaOrmRefreshTokenRepository,
    settings: SeaOrmPaymentSettingsRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            bookings: SeaOrmBookingRepository::new(db.clone()),
            resources: SeaOrmResourceRepository::new(db.clone()),
            users: SeaOrmUserRepository::new(db.clone()),
            payments: SeaOrmPaymentRepository::new(db.clone()),
            refresh_tokens: SeaOrmRefreshTokenRepository::new(db.clone()),
            settings: SeaOrmPaymentSettingsRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn bookings(&self) -> &dyn BookingRepository {
        &self.bookings
    }

    fn resources(&self) -> &dyn ResourceRepository {
        &self.resources
    }

    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn payments(&self) -> &dyn PaymentRepository {
        &self.payments
    }

    fn refresh_tokens(&self) -> &dyn RefreshTokenRepository {
        &self.refresh_tokens
    }

    fn settings(&self) -> &dyn PaymentSettingsRepository {
        &self.settings
    }
}
