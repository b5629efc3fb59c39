//! Payment settings aggregate

pub mod model;
pub mod repository;

pub use model::PaymentSettings;
pub use repository::PaymentSettingsRepository;
