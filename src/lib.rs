//! # Baleno Sanzeno Booking Core
//!
//! Resource-booking backend for the Baleno Sanzeno community space:
//! booking lifecycle (pending → approved/rejected → paid → cancelled,
//! with refund on cancellation), availability checking, payment
//! bookkeeping and user management.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Core business entities, status machines, repository
//!   traits and errors
//! - **application**: Services, lifecycle execution and outbound ports
//! - **infrastructure**: External concerns (database, in-memory store,
//!   notification and payment adapters)
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: Retry, shutdown coordination, pagination

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};

// Re-export API router
pub use interfaces::{create_api_router, ApiState};
