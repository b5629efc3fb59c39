//! Payment aggregate

pub mod model;
pub mod repository;

pub use model::{Payment, PaymentMethod, PaymentStatus};
pub use repository::{PaymentRepository, RefreshToken, RefreshTokenRepository};
