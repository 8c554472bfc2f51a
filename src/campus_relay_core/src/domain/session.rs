use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use super::cookie_jar::{CookieJar, CookieOp, CookieTransaction};

/// Process-wide SSO state: the cookie jar and which service hosts are
/// known to accept the current session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    jar: CookieJar,
    authenticated_hosts: HashMap<String, DateTime<Utc>>,
    login_epoch: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jar(&self) -> &CookieJar {
        &self.jar
    }

    /// Snapshot of the jar for one exchange.
    pub fn begin_transaction(&self) -> CookieTransaction {
        CookieTransaction::new(self.jar.clone())
    }

    /// Replays a finished exchange's `Set-Cookie` headers onto the jar and
    /// drops whatever has expired since.
    pub fn commit(&mut self, ops: &[CookieOp]) {
        self.jar.apply_all(ops);
        self.jar.purge_expired();
    }

    pub fn mark_authenticated(&mut self, host: &str, now: DateTime<Utc>) {
        self.authenticated_hosts.insert(host.to_owned(), now);
    }

    pub fn invalidate_host(&mut self, host: &str) {
        self.authenticated_hosts.remove(host);
    }

    pub fn is_authenticated(&self, host: &str) -> bool {
        self.authenticated_hosts.contains_key(host)
    }

    pub fn last_validated_at(&self, host: &str) -> Option<DateTime<Utc>> {
        self.authenticated_hosts.get(host).copied()
    }

    /// Whether `host` was validated less than `ttl` ago.
    pub fn is_fresh(&self, host: &str, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.last_validated_at(host)
            .is_some_and(|validated_at| now - validated_at < ttl)
    }

    /// Counter bumped by every completed SSO handshake.
    pub fn login_epoch(&self) -> u64 {
        self.login_epoch
    }

    pub fn record_login(&mut self) {
        self.login_epoch = self.login_epoch.wrapping_add(1);
    }

    /// Forgets cookies and host validations. The login epoch keeps counting.
    pub fn clear(&mut self) {
        self.jar.clear();
        self.authenticated_hosts.clear();
        self.login_epoch = self.login_epoch.wrapping_add(1);
    }
}
