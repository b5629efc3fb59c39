//! Repository provider: one handle to all aggregate repositories

use crate::domain::booking::BookingRepository;
use crate::domain::payment::{PaymentRepository, RefreshTokenRepository};
use crate::domain::resource::ResourceRepository;
use crate::domain::settings::PaymentSettingsRepository;
use crate::domain::user::UserRepository;

/// Unified accessor for all repositories.
///
/// Constructed once at startup around an explicitly opened connection
/// and passed to services; there is no process-wide client instance.
pub trait RepositoryProvider: Send + Sync {
    fn bookings(&self) -> &dyn BookingRepository;
    fn resources(&self) -> &dyn ResourceRepository;
    fn users(&self) -> &dyn UserRepository;
    fn payments(&self) -> &dyn PaymentRepository;
    fn refresh_tokens(&self) -> &dyn RefreshTokenRepository;
    fn settings(&self) -> &dyn PaymentSettingsRepository;
}
