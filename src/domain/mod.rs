//! Core business entities, status machines, repository traits and errors

pub mod booking;
pub mod error;
pub mod payment;
pub mod repositories;
pub mod resource;
pub mod settings;
pub mod user;

pub use booking::{
    AdditionalResource, Booking, BookingEvent, BookingFilter, BookingRepository, BookingStatus,
    CancelOutcome, RejectionReason, StatusChange,
};
pub use error::{DomainError, DomainResult};
pub use payment::{
    Payment, PaymentMethod, PaymentRepository, PaymentStatus, RefreshToken, RefreshTokenRepository,
};
pub use repositories::RepositoryProvider;
pub use resource::{Resource, ResourceRepository};
pub use settings::{PaymentSettings, PaymentSettingsRepository};
pub use user::{User, UserFilter, UserRepository, UserRole};
