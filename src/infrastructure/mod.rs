//! External concerns: database, in-memory store, port implementations

pub mod database;
pub mod memory;
pub mod notify;
pub mod payments;

pub use database::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};
pub use memory::InMemoryRepositoryProvider;
pub use notify::{LoggingNotificationSender, RecordingNotificationSender};
pub use payments::{LoggingPaymentProcessor, RecordingPaymentProcessor};
