//! Cross-cutting helpers: retry, shutdown coordination, shared types

pub mod retry;
pub mod shutdown;
pub mod types;

pub use retry::{retry_with_backoff, RetryConfig};
pub use shutdown::{listen_for_shutdown_signals, ShutdownSignal};
pub use types::{PaginatedResult, PaginationParams};
