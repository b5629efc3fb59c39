//! Booking aggregate: entity, status state machine, repository interface

pub mod model;
pub mod repository;

pub use model::{AdditionalResource, Booking, BookingEvent, BookingStatus, RejectionReason};
pub use repository::{BookingFilter, BookingRepository, CancelOutcome, StatusChange};
