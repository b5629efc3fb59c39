//! Application ports

pub mod outbound;

pub use outbound::{NotificationSender, NotificationTemplate, PaymentProcessor, TemplateVars};
