use std::sync::Arc;

use campus_relay_core::{
    CookieTransaction, Credential, CredentialError, CredentialStore, CredentialStoreError,
    HttpTransport, IdentityId, TransportError,
};
use secrecy::Secret;

use crate::{
    SharedSession,
    sso_gateway::{HandshakeError, LoginOutcome, SsoGateway},
};

/// Error types for sign-in use case
#[derive(Debug, thiserror::Error)]
pub enum SignInError {
    #[error("Empty credential: {0}")]
    EmptyCredential(#[from] CredentialError),
    #[error("Identity provider requires a CAPTCHA")]
    CaptchaRequired,
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Credential store error: {0}")]
    CredentialStore(#[from] CredentialStoreError),
}

impl From<HandshakeError> for SignInError {
    fn from(error: HandshakeError) -> Self {
        match error {
            HandshakeError::CaptchaRequired => Self::CaptchaRequired,
            HandshakeError::Rejected(reason) => Self::AuthenticationFailed(reason),
            HandshakeError::Transport(e) => Self::Transport(e),
        }
    }
}

/// Sign-in use case - verifies a typed-in credential against the identity
/// provider and stores it on success
pub struct SignInUseCase<T, C>
where
    T: HttpTransport,
    C: CredentialStore,
{
    gateway: SsoGateway<T>,
    credential_store: Arc<C>,
    session: SharedSession,
}

impl<T, C> SignInUseCase<T, C>
where
    T: HttpTransport,
    C: CredentialStore,
{
    pub fn new(gateway: SsoGateway<T>, credential_store: Arc<C>, session: SharedSession) -> Self {
        Self {
            gateway,
            credential_store,
            session,
        }
    }

    /// Execute the sign-in use case
    ///
    /// The login runs on a fresh cookie jar so a still-valid provider session
    /// of another identity cannot vouch for this one. Only a login that ends
    /// on the provider's landing page counts.
    #[tracing::instrument(name = "SignInUseCase::execute", skip(self, secret))]
    pub async fn execute(
        &self,
        identity_id: &str,
        secret: Secret<String>,
    ) -> Result<IdentityId, SignInError> {
        let credential = Credential::parse(identity_id, secret)?;

        let mut cookies = CookieTransaction::ephemeral();
        let outcome = self
            .gateway
            .handshake(&credential, None, &mut cookies)
            .await?;

        if let LoginOutcome::Returned(resource) = outcome {
            tracing::warn!(url = %resource.url(), "Sign-in left the identity provider");
            return Err(SignInError::AuthenticationFailed(format!(
                "expected landing page, ended on {}",
                resource.url()
            )));
        }

        self.credential_store
            .set_credential(credential.clone())
            .await?;
        {
            let mut session = self.session.write().await;
            session.clear();
            session.commit(&cookies.into_ops());
            session.record_login();
        }

        tracing::info!(identity = %credential.identity_id(), "Signed in");
        Ok(credential.identity_id().clone())
    }
}
