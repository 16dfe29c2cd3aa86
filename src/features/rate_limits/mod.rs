//! Per-user request throttling with fixed-size time windows.

pub mod service;
pub mod store;

pub use service::{RateLimitDecision, RateLimitService};
pub use store::{InMemoryRateLimitStore, RateLimitEntry, RateLimitStore};
