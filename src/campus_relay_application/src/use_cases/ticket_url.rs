use std::sync::Arc;

use campus_relay_core::{
    CookieTransaction, CredentialStore, CredentialStoreError, HttpTransport, TransportError,
};
use url::Url;

use crate::sso_gateway::{HandshakeError, PreparedLogin, SsoGateway};

/// Error types for ticket URL use case
#[derive(Debug, thiserror::Error)]
pub enum TicketUrlError {
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
}

impl From<HandshakeError> for TicketUrlError {
    fn from(error: HandshakeError) -> Self {
        match error {
            HandshakeError::CaptchaRequired => Self::CaptchaRequired,
            HandshakeError::Rejected(reason) => Self::AuthenticationFailed(reason),
            HandshakeError::Transport(e) => Self::Transport(e),
        }
    }
}

/// Ticket URL use case - logs in on a throwaway cookie jar and returns the
/// service URL carrying a one-time ticket, for hand-off to a browser
pub struct TicketUrlUseCase<T, C>
where
    T: HttpTransport,
    C: CredentialStore,
{
    gateway: SsoGateway<T>,
    credential_store: Arc<C>,
}

impl<T, C> TicketUrlUseCase<T, C>
where
    T: HttpTransport,
    C: CredentialStore,
{
    pub fn new(gateway: SsoGateway<T>, credential_store: Arc<C>) -> Self {
        Self {
            gateway,
            credential_store,
        }
    }

    #[tracing::instrument(name = "TicketUrlUseCase::execute", skip(self, target), fields(target = %target))]
    pub async fn execute(&self, target: &Url) -> Result<Url, TicketUrlError> {
        let credential = self
            .credential_store
            .get_credential()
            .await?
            .ok_or(TicketUrlError::CredentialMissing)?;

        // Never committed anywhere
        let mut cookies = CookieTransaction::ephemeral();

        let (action, fields) = match self
            .gateway
            .prepare(&credential, Some(target), &mut cookies)
            .await?
        {
            PreparedLogin::Ready { action, fields } => (action, fields),
            PreparedLogin::Authenticated(resource) => {
                return Err(TicketUrlError::AuthenticationFailed(format!(
                    "login page redirected to {} without a form",
                    resource.url()
                )));
            }
        };

        let response = self.gateway.submit_once(action, &fields, &mut cookies).await?;
        match response.redirect_location()? {
            Some(location) if !self.gateway.provider().owns(&location) => Ok(location),
            Some(location) => Err(TicketUrlError::AuthenticationFailed(format!(
                "redirected back to {location}"
            ))),
            None => Err(TicketUrlError::AuthenticationFailed(format!(
                "login answered {} without a redirect",
                response.status
            ))),
        }
    }
}
