use std::sync::Arc;

use campus_relay_adapters::{
    InMemoryCredentialVault, RelaySettings, ReqwestTransport, VaultCredentialStore,
};
use campus_relay_application::{
    BrokerOptions, SessionBroker, SharedSession, SignInUseCase, SignOutUseCase, TicketUrlUseCase,
    new_shared_session,
};
use campus_relay_core::{
    CredentialStore, FetchedResource, HttpTransport, IdentityId, IdentityProvider,
    ResourceRequest,
};
use campus_relay_scrape::ScrapeTarget;
use secrecy::Secret;
use url::Url;

use crate::error::RelayError;

pub type DefaultCredentialStore = VaultCredentialStore<InMemoryCredentialVault>;

/// Entry point for campus features: authenticated fetches, decoding and the
/// sign-in lifecycle, all sharing one `Session`.
pub struct CampusRelay<T = ReqwestTransport, C = DefaultCredentialStore>
where
    T: HttpTransport,
    C: CredentialStore,
{
    broker: SessionBroker<T, C>,
    sign_in: SignInUseCase<T, C>,
    sign_out: SignOutUseCase<C>,
    ticket_url: TicketUrlUseCase<T, C>,
    credential_store: Arc<C>,
}

impl CampusRelay {
    /// Relay over reqwest with the bundled in-memory vault.
    pub fn from_settings(settings: &RelaySettings) -> Result<Self, RelayError> {
        let provider = settings.identity_provider()?;
        let vault = InMemoryCredentialVault::new(&provider);
        Self::with_credential_store(settings, Arc::new(VaultCredentialStore::new(vault)))
    }
}

impl<C> CampusRelay<ReqwestTransport, C>
where
    C: CredentialStore,
{
    /// Relay over reqwest with a platform-provided credential store.
    pub fn with_credential_store(
        settings: &RelaySettings,
        credential_store: Arc<C>,
    ) -> Result<Self, RelayError> {
        let provider = settings.identity_provider()?;
        let transport = ReqwestTransport::build(&settings.http.user_agent, settings.timeout())
            .map_err(|e| RelayError::HttpClient(e.to_string()))?;

        Ok(Self::new(
            Arc::new(transport),
            provider,
            credential_store,
            settings.broker_options(),
        ))
    }
}

impl<T, C> CampusRelay<T, C>
where
    T: HttpTransport,
    C: CredentialStore,
{
    pub fn new(
        transport: Arc<T>,
        provider: IdentityProvider,
        credential_store: Arc<C>,
        options: BrokerOptions,
    ) -> Self {
        let session = new_shared_session();
        let broker = SessionBroker::new(
            transport,
            provider,
            Arc::clone(&credential_store),
            Arc::clone(&session),
            options,
        );
        let gateway = broker.gateway().clone();

        Self {
            sign_in: SignInUseCase::new(
                gateway.clone(),
                Arc::clone(&credential_store),
                Arc::clone(&session),
            ),
            sign_out: SignOutUseCase::new(Arc::clone(&credential_store), session),
            ticket_url: TicketUrlUseCase::new(gateway, Arc::clone(&credential_store)),
            broker,
            credential_store,
        }
    }

    pub fn provider(&self) -> &IdentityProvider {
        self.broker.provider()
    }

    pub fn session(&self) -> &SharedSession {
        self.broker.session()
    }

    pub fn credential_store(&self) -> &Arc<C> {
        &self.credential_store
    }

    pub async fn fetch(&self, request: &ResourceRequest) -> Result<FetchedResource, RelayError> {
        Ok(self.broker.fetch(request).await?)
    }

    pub async fn fetch_bytes(&self, request: &ResourceRequest) -> Result<Vec<u8>, RelayError> {
        Ok(self.broker.fetch_bytes(request).await?)
    }

    /// Fetches `request` and decodes the body as `Target`.
    #[tracing::instrument(
        name = "CampusRelay::fetch_decoded",
        skip(self, request),
        fields(scrape_target = Target::NAME, version = Target::VERSION, url = %request.target())
    )]
    pub async fn fetch_decoded<Target>(
        &self,
        request: &ResourceRequest,
    ) -> Result<Target::Output, RelayError>
    where
        Target: ScrapeTarget,
    {
        let bytes = self.broker.fetch_bytes(request).await?;
        let output = Target::decode(&bytes).inspect_err(|e| {
            tracing::warn!(error = %e, "Response did not match the scrape target");
        })?;
        Ok(output)
    }

    /// Verifies a typed-in credential and stores it; starts a fresh session.
    pub async fn sign_in(
        &self,
        identity_id: &str,
        secret: Secret<String>,
    ) -> Result<IdentityId, RelayError> {
        Ok(self.sign_in.execute(identity_id, secret).await?)
    }

    pub async fn sign_out(&self) -> Result<(), RelayError> {
        Ok(self.sign_out.execute().await?)
    }

    /// URL of `target` carrying a one-time service ticket, for opening in a
    /// browser that does not share this relay's cookies.
    pub async fn ticket_url(&self, target: &Url) -> Result<Url, RelayError> {
        Ok(self.ticket_url.execute(target).await?)
    }

    pub async fn is_signed_in(&self) -> Result<bool, RelayError> {
        Ok(self.credential_store.get_credential().await?.is_some())
    }
}
