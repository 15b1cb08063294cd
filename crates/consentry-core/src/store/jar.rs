use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Path/domain pair an entry is scoped to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieScope {
    pub path: String,
    pub domain: Option<String>,
}

impl CookieScope {
    /// Current path, no domain — the scope entries are written under
    pub fn bare() -> Self {
        Self {
            path: "/".to_string(),
            domain: None,
        }
    }

    /// Scoped to the exact hostname
    pub fn host(hostname: &str) -> Self {
        Self {
            path: "/".to_string(),
            domain: Some(hostname.to_string()),
        }
    }

    /// Scoped to the hostname and all its subdomains
    pub fn wildcard(hostname: &str) -> Self {
        Self {
            path: "/".to_string(),
            domain: Some(format!(".{hostname}")),
        }
    }

    /// The enumerated deletion variants attempted during a purge.
    ///
    /// Entries written by other scripts may have been scoped to the bare
    /// path, the hostname, or a wildcard-subdomain variant of the
    /// hostname. This is a deliberate, bounded compatibility set.
    pub fn purge_variants(hostname: Option<&str>) -> Vec<CookieScope> {
        let mut variants = vec![Self::bare()];
        if let Some(host) = hostname {
            variants.push(Self::host(host));
            variants.push(Self::wildcard(host));
        }
        variants
    }
}

/// A stored entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub scope: CookieScope,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Cookie {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Expiry timestamp for an entry written now with the given TTL
pub(crate) fn expiry_after_days(ttl_days: u32) -> DateTime<Utc> {
    Utc::now() + Duration::days(i64::from(ttl_days))
}

/// Name/value store with per-entry expiry and path/domain scope.
///
/// An expired entry reads as absent; expiry enforcement lives entirely
/// in the jar, never in its callers.
#[async_trait]
pub trait CookieJar: Send + Sync {
    /// Write an entry under the bare scope, overwriting any prior value
    async fn set(&self, name: &str, value: &str, ttl_days: u32) -> Result<()>;

    /// Read the live value for a name, regardless of scope
    async fn get(&self, name: &str) -> Result<Option<String>>;

    /// Delete the entry under the bare scope
    async fn delete(&self, name: &str) -> Result<()> {
        self.delete_scoped(name, &CookieScope::bare()).await
    }

    /// Delete the entry matching one exact scope variant
    async fn delete_scoped(&self, name: &str, scope: &CookieScope) -> Result<()>;

    /// Distinct names of all live entries
    async fn names(&self) -> Result<Vec<String>>;
}
