//! Sliding-window admission control
//!
//! Guards the repository boundary: every caller-facing operation checks
//! the limiter before any storage I/O, and a denial short-circuits the
//! call. State is process-local; under N replicas the effective global
//! limit is N times the configured one, a documented trade-off of this
//! design.
//!
//! The limiter is an explicit component owned by the process entry
//! point — constructed, swept, and dropped there, never a global.

pub mod config;
pub mod identity;
pub mod limiter;

pub use config::{ClassLimit, RateLimitClass, RateLimitConfig};
pub use identity::{Caller, CallerId, TrustedSources};
pub use limiter::{Decision, RateLimiter};
