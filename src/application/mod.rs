//! Business logic: services, lifecycle execution and outbound ports

pub mod ports;
pub mod services;

pub use ports::{NotificationSender, NotificationTemplate, PaymentProcessor, TemplateVars};
pub use services::{
    start_payment_reminder_task, AvailabilityChecker, BookingLifecycle, BookingPatch,
    BookingService, NewBooking, NewUser, PaymentSettingsService, Quote, SettingsPatch, UserPatch,
    UserService,
};
