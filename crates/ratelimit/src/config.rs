//! Rate-limit configuration
//!
//! Named `{max, window}` pairs, one per operation class. Classes never
//! share counters: the bucket key includes the class.

use crate::identity::TrustedSources;
use std::time::Duration;

/// Operation class selecting a limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitClass {
    /// Reads and lookups
    General,
    /// Search and listing traffic
    Search,
    /// Creates, updates, versioning, attribution writes
    Write,
    /// View-count side effects
    ViewTracking,
    /// Unauthenticated read/search traffic
    Anonymous,
}

impl RateLimitClass {
    /// All classes, for sweeps and diagnostics
    pub const ALL: [RateLimitClass; 5] = [
        RateLimitClass::General,
        RateLimitClass::Search,
        RateLimitClass::Write,
        RateLimitClass::ViewTracking,
        RateLimitClass::Anonymous,
    ];

    /// Stable name used in bucket keys
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitClass::General => "general",
            RateLimitClass::Search => "search",
            RateLimitClass::Write => "write",
            RateLimitClass::ViewTracking => "view",
            RateLimitClass::Anonymous => "anonymous",
        }
    }
}

/// One class's limit: at most `max` requests per trailing `window`
#[derive(Debug, Clone, Copy)]
pub struct ClassLimit {
    /// Maximum requests inside the window
    pub max: u32,
    /// Trailing window length
    pub window: Duration,
}

impl ClassLimit {
    /// Build a limit
    pub const fn new(max: u32, window: Duration) -> Self {
        ClassLimit { max, window }
    }
}

/// Limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Limit for general reads
    pub general: ClassLimit,
    /// Limit for search traffic
    pub search: ClassLimit,
    /// Limit for writes
    pub write: ClassLimit,
    /// Limit for view tracking
    pub view_tracking: ClassLimit,
    /// Limit for unauthenticated traffic
    pub anonymous: ClassLimit,
    /// Idle period after which a bucket is garbage-collected
    pub idle_timeout: Duration,
    /// Callers that always pass without counting
    pub trusted: TrustedSources,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitConfig {
            general: ClassLimit::new(100, Duration::from_secs(60)),
            search: ClassLimit::new(30, Duration::from_secs(60)),
            write: ClassLimit::new(20, Duration::from_secs(60)),
            view_tracking: ClassLimit::new(60, Duration::from_secs(60)),
            anonymous: ClassLimit::new(20, Duration::from_secs(60)),
            idle_timeout: Duration::from_secs(600),
            trusted: TrustedSources::default(),
        }
    }
}

impl RateLimitConfig {
    /// The limit of one class
    pub fn limit(&self, class: RateLimitClass) -> ClassLimit {
        match class {
            RateLimitClass::General => self.general,
            RateLimitClass::Search => self.search,
            RateLimitClass::Write => self.write,
            RateLimitClass::ViewTracking => self.view_tracking,
            RateLimitClass::Anonymous => self.anonymous,
        }
    }
}
