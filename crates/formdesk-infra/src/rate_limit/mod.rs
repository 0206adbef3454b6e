//! Rate limiting store
//!
//! Fixed-window request counting per client key, behind an injectable store.

pub use store::{spawn_sweeper, InMemoryRateLimitStore, RateDecision, RateLimitStore};

mod store;
