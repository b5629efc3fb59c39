//! HTTP REST API interfaces
//!
//! - `common`: response envelope, error mapping, extractors
//! - `modules`: DTOs and handlers per resource
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod modules;
pub mod router;

pub use router::create_api_router;

use std::sync::Arc;

use crate::application::{BookingService, PaymentSettingsService, UserService};
use crate::domain::RepositoryProvider;

/// Shared state for all API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub repos: Arc<dyn RepositoryProvider>,
    pub bookings: Arc<BookingService>,
    pub users: Arc<UserService>,
    pub settings: Arc<PaymentSettingsService>,
}
