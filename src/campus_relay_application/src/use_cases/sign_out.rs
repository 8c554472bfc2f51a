use std::sync::Arc;

use campus_relay_core::{CredentialStore, CredentialStoreError};

use crate::SharedSession;

/// Error types for sign-out use case
#[derive(Debug, thiserror::Error)]
pub enum SignOutError {
    #[error("Credential store error: {0}")]
    CredentialStore(#[from] CredentialStoreError),
}

/// Sign-out use case - forgets the credential and the whole SSO session
pub struct SignOutUseCase<C>
where
    C: CredentialStore,
{
    credential_store: Arc<C>,
    session: SharedSession,
}

impl<C> SignOutUseCase<C>
where
    C: CredentialStore,
{
    pub fn new(credential_store: Arc<C>, session: SharedSession) -> Self {
        Self {
            credential_store,
            session,
        }
    }

    #[tracing::instrument(name = "SignOutUseCase::execute", skip(self))]
    pub async fn execute(&self) -> Result<(), SignOutError> {
        // Session is cleared even when the vault fails
        self.session.write().await.clear();
        self.credential_store.clear().await?;

        tracing::info!("Signed out");
        Ok(())
    }
}
