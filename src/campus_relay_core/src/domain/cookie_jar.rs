//! Cookie storage for the SSO session.
//!
//! Storage and request matching are delegated to [`cookie_store`], which
//! follows RFC 6265 for host-only vs. domain cookies, path prefixes,
//! `Secure` and expiry. On top of that the jar refuses `Domain` attributes
//! naming a public suffix such as `edu.cn`.
//!
//! Exchanges never write to the shared jar directly. They work on a
//! [`CookieTransaction`], a private copy of the jar plus the raw
//! `Set-Cookie` headers received, and the headers are replayed onto the
//! shared jar once the exchange is over. Dropping a transaction therefore
//! discards everything it saw.

use std::convert::Infallible;

use cookie_store::{Cookie, CookieStore, RawCookie};
use http::{HeaderMap, header::SET_COOKIE};
use url::Url;

/// One `Set-Cookie` header and the URL of the response that carried it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOp {
    url: Url,
    set_cookie: String,
}

impl CookieOp {
    pub fn new(url: Url, set_cookie: impl Into<String>) -> Self {
        Self {
            url,
            set_cookie: set_cookie.into(),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn set_cookie(&self) -> &str {
        &self.set_cookie
    }

    /// Every `Set-Cookie` header of a response received from `url`.
    pub fn from_headers(url: &Url, headers: &HeaderMap) -> Vec<Self> {
        headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(|value| Self::new(url.clone(), value))
            .collect()
    }

    /// Parsed cookie, or `None` when the header is malformed or its
    /// `Domain` is a public suffix other than the responding host.
    fn raw_cookie(&self) -> Option<RawCookie<'static>> {
        let mut raw = RawCookie::parse(self.set_cookie.clone()).ok()?;

        let Some(domain) = raw.domain().map(str::to_ascii_lowercase) else {
            return Some(raw);
        };
        if !is_public_suffix(&domain) {
            return Some(raw);
        }

        // RFC 6265 5.3 step 5: a public suffix equal to the request host
        // degrades to a host-only cookie
        let from_host = self
            .url
            .host_str()
            .is_some_and(|host| host.eq_ignore_ascii_case(&domain));
        if !from_host {
            tracing::debug!(
                url = %self.url,
                cookie = raw.name(),
                domain = %domain,
                "Rejected cookie scoped to a public suffix"
            );
            return None;
        }
        raw.unset_domain();
        Some(raw)
    }
}

fn is_public_suffix(domain: &str) -> bool {
    psl::suffix_str(domain) == Some(domain)
}

#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    store: CookieStore,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored cookies, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.store.iter_any().count()
    }

    pub fn is_empty(&self) -> bool {
        self.store.iter_any().next().is_none()
    }

    /// Live cookies.
    pub fn iter(&self) -> impl Iterator<Item = &Cookie<'static>> {
        self.store.iter_unexpired()
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    pub fn apply(&mut self, op: &CookieOp) {
        if let Some(raw) = op.raw_cookie() {
            self.store
                .store_response_cookies(std::iter::once(raw), op.url());
        }
    }

    pub fn apply_all<'a>(&mut self, ops: impl IntoIterator<Item = &'a CookieOp>) {
        for op in ops {
            self.apply(op);
        }
    }

    /// Value of the first live cookie named `name` that would be sent to `url`.
    pub fn get(&self, url: &Url, name: &str) -> Option<&str> {
        self.store
            .get_request_values(url)
            .find(|(cookie_name, _)| *cookie_name == name)
            .map(|(_, value)| value)
    }

    /// `Cookie` request header for `url`.
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        let pairs: Vec<String> = self
            .store
            .get_request_values(url)
            .map(|(name, value)| format!("{name}={value}"))
            .collect();

        (!pairs.is_empty()).then(|| pairs.join("; "))
    }

    /// Drops every cookie whose `Max-Age` or `Expires` has passed.
    pub fn purge_expired(&mut self) {
        let live: Vec<Cookie<'static>> = self.store.iter_unexpired().cloned().collect();
        match CookieStore::from_cookies(live.into_iter().map(Ok::<_, Infallible>), false) {
            Ok(store) => self.store = store,
            Err(never) => match never {},
        }
    }
}

/// Private working copy of a jar plus the `Set-Cookie` headers received.
#[derive(Debug, Clone, Default)]
pub struct CookieTransaction {
    view: CookieJar,
    log: Vec<CookieOp>,
}

impl CookieTransaction {
    pub fn new(base: CookieJar) -> Self {
        Self {
            view: base,
            log: Vec::new(),
        }
    }

    /// Transaction over an empty jar, for exchanges that must not see or
    /// leave any session state.
    pub fn ephemeral() -> Self {
        Self::default()
    }

    pub fn record_response(&mut self, url: &Url, headers: &HeaderMap) {
        for op in CookieOp::from_headers(url, headers) {
            self.view.apply(&op);
            self.log.push(op);
        }
    }

    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        self.view.cookie_header(url)
    }

    pub fn view(&self) -> &CookieJar {
        &self.view
    }

    pub fn has_changes(&self) -> bool {
        !self.log.is_empty()
    }

    pub fn into_ops(self) -> Vec<CookieOp> {
        self.log
    }
}
