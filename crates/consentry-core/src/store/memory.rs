use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::jar::{expiry_after_days, Cookie, CookieJar, CookieScope};
use crate::Result;

/// In-memory jar for tests and ephemeral use
#[derive(Debug, Default)]
pub struct MemoryJar {
    entries: Mutex<Vec<Cookie>>,
}

impl MemoryJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry under an explicit scope (e.g. entries written by
    /// other scripts at domain-scoped variants)
    pub fn insert_scoped(&self, name: &str, value: &str, scope: CookieScope, ttl_days: u32) {
        let now = Utc::now();
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|c| !(c.name == name && c.scope == scope));
        entries.push(Cookie {
            name: name.to_string(),
            value: value.to_string(),
            scope,
            expires_at: expiry_after_days(ttl_days),
            created_at: now,
        });
    }
}

#[async_trait]
impl CookieJar for MemoryJar {
    async fn set(&self, name: &str, value: &str, ttl_days: u32) -> Result<()> {
        self.insert_scoped(name, value, CookieScope::bare(), ttl_days);
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Option<String>> {
        let now = Utc::now();
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .iter()
            .find(|c| c.name == name && !c.is_expired(now))
            .map(|c| c.value.clone()))
    }

    async fn delete_scoped(&self, name: &str, scope: &CookieScope) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|c| !(c.name == name && &c.scope == scope));
        Ok(())
    }

    async fn names(&self) -> Result<Vec<String>> {
        let now = Utc::now();
        let entries = self.entries.lock().unwrap();
        let mut names: Vec<String> = entries
            .iter()
            .filter(|c| !c.is_expired(now))
            .map(|c| c.name.clone())
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}
