use async_trait::async_trait;
use secrecy::Secret;
use thiserror::Error;

use crate::domain::credential::{Credential, IdentityId};

// CredentialVault port trait and errors
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Vault is unavailable: {0}")]
    Unavailable(String),
    #[error("Stored credential is corrupt: {0}")]
    Corrupt(String),
}

/// Secure on-device storage owned by the platform (keychain and the like).
#[async_trait]
pub trait CredentialVault: Send + Sync {
    async fn save(&self, identity_id: &IdentityId, secret: &Secret<String>)
    -> Result<(), VaultError>;
    async fn load(&self) -> Result<Option<Credential>, VaultError>;
    async fn delete(&self) -> Result<(), VaultError>;
}

// CredentialStore port trait and errors
#[derive(Debug, Error)]
pub enum CredentialStoreError {
    #[error("Vault error: {0}")]
    Vault(#[from] VaultError),
}

/// Holds the credential of the single identity provider the app talks to.
///
/// `get_credential` returning `Ok(None)` is "not signed in", not a failure.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn set_credential(&self, credential: Credential) -> Result<(), CredentialStoreError>;
    async fn get_credential(&self) -> Result<Option<Credential>, CredentialStoreError>;
    async fn clear(&self) -> Result<(), CredentialStoreError>;
}
