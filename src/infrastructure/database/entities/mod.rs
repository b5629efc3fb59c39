//! SeaORM entities

pub mod booking;
pub mod booking_resource;
pub mod payment;
pub mod payment_settings;
pub mod refresh_token;
pub mod resource;
pub mod user;
