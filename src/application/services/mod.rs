//! Application services

pub mod availability;
pub mod booking;
pub mod lifecycle;
pub mod payment_reminder;
pub mod pricing;
pub mod settings;
pub mod user;

pub use availability::AvailabilityChecker;
pub use booking::{BookingPatch, BookingService, NewBooking};
pub use lifecycle::BookingLifecycle;
pub use payment_reminder::start_payment_reminder_task;
pub use pricing::{billable_hours, quote, Quote};
pub use settings::{PaymentSettingsService, SettingsPatch};
pub use user::{NewUser, UserPatch, UserService};
