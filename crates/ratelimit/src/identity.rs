//! Caller identity resolution
//!
//! The limiter keys buckets by a resolved identifier: an authenticated
//! user id when present, else the network address, else one shared
//! anonymous bucket. Trust is an allow-list of fixed categories —
//! loopback addresses, configured service accounts, configured
//! health-check sources — that pass without counting.

use ragamala_core::UserId;
use std::collections::HashSet;
use std::fmt;
use std::net::IpAddr;

/// An already-resolved caller
///
/// Authentication happens upstream; this type only carries its result.
/// `is_bot` gates view-count side effects, nothing else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    /// Authenticated user, when the session resolved one
    pub user_id: Option<UserId>,
    /// Network address, when known
    pub remote_addr: Option<IpAddr>,
    /// True for crawler/bot traffic
    pub is_bot: bool,
}

impl Caller {
    /// An authenticated caller
    pub fn user(user_id: impl Into<String>) -> Self {
        Caller {
            user_id: Some(UserId::new(user_id)),
            remote_addr: None,
            is_bot: false,
        }
    }

    /// An unauthenticated caller known only by address
    pub fn addr(addr: IpAddr) -> Self {
        Caller {
            user_id: None,
            remote_addr: Some(addr),
            is_bot: false,
        }
    }

    /// A caller with no identity at all
    pub fn anonymous() -> Self {
        Caller::default()
    }

    /// Mark as bot traffic
    pub fn bot(mut self) -> Self {
        self.is_bot = true;
        self
    }

    /// True when no user identity was resolved
    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }

    /// Resolve the rate-limit identifier
    ///
    /// Prefers `user:<id>`, falls back to `ip:<addr>`, else the shared
    /// `anonymous` bucket.
    pub fn id(&self) -> CallerId {
        if let Some(user) = &self.user_id {
            return CallerId(format!("user:{user}"));
        }
        if let Some(addr) = self.remote_addr {
            return CallerId(format!("ip:{addr}"));
        }
        CallerId("anonymous".to_string())
    }
}

/// Resolved rate-limit identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallerId(pub(crate) String);

impl CallerId {
    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Allow-list of callers that bypass admission control
#[derive(Debug, Clone, Default)]
pub struct TrustedSources {
    /// Service-account user ids
    pub service_accounts: HashSet<UserId>,
    /// Health-check source addresses
    pub health_check_addrs: HashSet<IpAddr>,
}

impl TrustedSources {
    /// Add a service account
    pub fn with_service_account(mut self, user_id: impl Into<String>) -> Self {
        self.service_accounts.insert(UserId::new(user_id));
        self
    }

    /// Add a health-check source address
    pub fn with_health_check_addr(mut self, addr: IpAddr) -> Self {
        self.health_check_addrs.insert(addr);
        self
    }

    /// True when the caller always passes without counting
    ///
    /// Loopback addresses are trusted unconditionally.
    pub fn is_trusted(&self, caller: &Caller) -> bool {
        if let Some(user) = &caller.user_id {
            if self.service_accounts.contains(user) {
                return true;
            }
        }
        if let Some(addr) = caller.remote_addr {
            if addr.is_loopback() || self.health_check_addrs.contains(&addr) {
                return true;
            }
        }
        false
    }
}
