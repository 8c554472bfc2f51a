//! SSO session broker.
//!
//! Produces responses for resource requests, logging in against the identity
//! provider on demand. The shared [`Session`](campus_relay_core::Session) is only
//! locked around in-memory reads and commits, never across a network call, so
//! unrelated fetches run concurrently. Logins against one provider are serialized
//! by a per-host latch; a fetch that waited on the latch first checks whether the
//! login it waited for already let it in.

use std::sync::Arc;

use campus_relay_core::{
    CredentialStore, CredentialStoreError, FetchedResource, HttpTransport, IdentityProvider,
    ResourceRequest, TransportError, TransportRequest, host_key,
};
use chrono::{Duration, Utc};
use dashmap::DashMap;
use http::Method;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{
    SharedSession,
    session_http::SessionHttp,
    sso_gateway::{HandshakeError, LoginOutcome, SsoGateway},
};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No stored credential")]
    CredentialMissing,
    #[error("Identity provider requires a CAPTCHA")]
    CaptchaRequired,
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Credential store error: {0}")]
    CredentialStore(#[from] CredentialStoreError),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<HandshakeError> for FetchError {
    fn from(error: HandshakeError) -> Self {
        match error {
            HandshakeError::CaptchaRequired => Self::CaptchaRequired,
            HandshakeError::Rejected(reason) => Self::AuthenticationFailed(reason),
            HandshakeError::Transport(e) => Self::Transport(e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerOptions {
    pub max_redirects: usize,
    /// How long a validated host is trusted before a request carrying a
    /// `login_url` visits it again.
    pub session_ttl: Duration,
}

impl Default for BrokerOptions {
    fn default() -> Self {
        Self {
            max_redirects: 10,
            session_ttl: Duration::hours(2),
        }
    }
}

pub struct SessionBroker<T, C>
where
    T: HttpTransport,
    C: CredentialStore,
{
    http: SessionHttp<T>,
    gateway: SsoGateway<T>,
    credential_store: Arc<C>,
    session: SharedSession,
    login_latches: DashMap<String, Arc<Mutex<()>>>,
    options: BrokerOptions,
}

impl<T, C> SessionBroker<T, C>
where
    T: HttpTransport,
    C: CredentialStore,
{
    pub fn new(
        transport: Arc<T>,
        provider: IdentityProvider,
        credential_store: Arc<C>,
        session: SharedSession,
        options: BrokerOptions,
    ) -> Self {
        Self {
            http: SessionHttp::new(Arc::clone(&transport), options.max_redirects),
            gateway: SsoGateway::new(transport, provider, options.max_redirects),
            credential_store,
            session,
            login_latches: DashMap::new(),
            options,
        }
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn gateway(&self) -> &SsoGateway<T> {
        &self.gateway
    }

    pub fn provider(&self) -> &IdentityProvider {
        self.gateway.provider()
    }

    /// Body of the final response for `request`.
    pub async fn fetch_bytes(&self, request: &ResourceRequest) -> Result<Vec<u8>, FetchError> {
        self.fetch(request).await.map(FetchedResource::into_bytes)
    }

    /// Final response for `request`, logging in first when the service
    /// bounces it to the identity provider.
    ///
    /// Non-2xx statuses are returned as they are; only transport and
    /// authentication problems are errors.
    #[tracing::instrument(
        name = "SessionBroker::fetch",
        skip(self, request),
        fields(method = %request.method(), url = %request.target())
    )]
    pub async fn fetch(&self, request: &ResourceRequest) -> Result<FetchedResource, FetchError> {
        if !request.requires_auth() {
            return Ok(self.exchange(request.to_transport_request()).await?);
        }

        let host = request
            .host()
            .ok_or_else(|| FetchError::InvalidRequest(format!("no host in {}", request.target())))?;

        if let Some(login_url) = request.login_url() {
            if !self.is_fresh(&host).await {
                tracing::debug!(%login_url, "Visiting service entry page first");
                let entry = ResourceRequest::get(login_url.clone());
                let entry_host = entry.host().unwrap_or_else(|| host.clone());
                self.fetch_authenticated(&entry, &entry_host).await?;
            }
        }

        self.fetch_authenticated(request, &host).await
    }

    async fn fetch_authenticated(
        &self,
        request: &ResourceRequest,
        host: &str,
    ) -> Result<FetchedResource, FetchError> {
        let seen_epoch = self.session.read().await.login_epoch();

        let first = self.exchange(request.to_transport_request()).await?;
        if !self.provider().owns(first.url()) {
            self.mark_authenticated(host).await;
            return Ok(first);
        }
        self.session.write().await.invalidate_host(host);

        let latch = self.login_latch();
        let _guard = latch.lock().await;

        // A login that finished while we waited spends the one retry
        if self.session.read().await.login_epoch() != seen_epoch {
            tracing::debug!(host, "Another fetch logged in meanwhile, retrying");
            let retry = self.exchange(request.to_transport_request()).await?;
            return self.accept_retry(host, retry).await;
        }

        let credential = self
            .credential_store
            .get_credential()
            .await?
            .ok_or(FetchError::CredentialMissing)?;

        let mut cookies = self.session.read().await.begin_transaction();
        let outcome = self
            .gateway
            .handshake(&credential, Some(request.target()), &mut cookies)
            .await?;
        {
            let mut session = self.session.write().await;
            session.commit(&cookies.into_ops());
            session.record_login();
        }

        match outcome {
            LoginOutcome::Returned(resource) if request.method() == Method::GET => {
                Ok(self.accept(host, resource).await)
            }
            _ => {
                let retry = self.exchange(request.to_transport_request()).await?;
                self.accept_retry(host, retry).await
            }
        }
    }

    /// Outcome of the single re-issue allowed after a login.
    async fn accept_retry(
        &self,
        host: &str,
        retry: FetchedResource,
    ) -> Result<FetchedResource, FetchError> {
        if self.provider().owns(retry.url()) {
            tracing::warn!(host, url = %retry.url(), "Service still rejects the session after login");
            return Err(FetchError::AuthenticationFailed(format!(
                "{host} still redirects to the identity provider"
            )));
        }
        Ok(self.accept(host, retry).await)
    }

    async fn accept(&self, host: &str, resource: FetchedResource) -> FetchedResource {
        self.mark_authenticated(host).await;
        if let Some(resolved) = host_key(resource.url()) {
            if resolved != host {
                self.mark_authenticated(&resolved).await;
            }
        }
        resource
    }

    /// One cookie-carrying exchange whose cookie changes are committed
    /// only once it completed.
    async fn exchange(&self, request: TransportRequest) -> Result<FetchedResource, TransportError> {
        let mut cookies = self.session.read().await.begin_transaction();
        let resource = self.http.send(request, &mut cookies).await?;
        self.session.write().await.commit(&cookies.into_ops());
        Ok(resource)
    }

    async fn is_fresh(&self, host: &str) -> bool {
        self.session
            .read()
            .await
            .is_fresh(host, Utc::now(), self.options.session_ttl)
    }

    async fn mark_authenticated(&self, host: &str) {
        self.session
            .write()
            .await
            .mark_authenticated(host, Utc::now());
    }

    fn login_latch(&self) -> Arc<Mutex<()>> {
        self.login_latches
            .entry(self.provider().host().to_owned())
            .or_default()
            .clone()
    }
}
