//! Retry with exponential backoff for establishing connections
//!
//! # Example
//!
//! ```ignore
//! use dirlink_connection::reconnect::{retry_with_backoff, BackoffStrategy, ReconnectConfig};
//!
//! let config = ReconnectConfig::new(3, BackoffStrategy::new(100, 5_000).with_jitter(true));
//! retry_with_backoff(&config, |_attempt| conn.open()).await?;
//! ```

mod backoff;
mod retry;


pub use backoff::BackoffStrategy;
pub use retry::{ReconnectConfig, retry_with_backoff};
