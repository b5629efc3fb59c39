//! SeaORM repository implementations

pub mod booking_repository;
pub mod payment_repository;
pub mod repository_provider;
pub mod resource_repository;
pub mod settings_repository;
pub mod user_repository;

pub use booking_repository::SeaOrmBookingRepository;
pub use payment_repository::{SeaOrmPaymentRepository, SeaOrmRefreshTokenRepository};
pub use repository_provider::SeaOrmRepositoryProvider;
pub use resource_repository::SeaOrmResourceRepository;
pub use settings_repository::SeaOrmPaymentSettingsRepository;
pub use user_repository::SeaOrmUserRepository;
