use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use campus_relay_core::{
    Credential, CredentialSecret, CredentialVault, IdentityId, IdentityProvider, VaultError,
};
use secrecy::Secret;

/// Process-local vault. Entries are keyed by identity provider host; clones and
/// [`for_provider`](Self::for_provider) views share the same storage.
#[derive(Clone)]
pub struct InMemoryCredentialVault {
    provider_host: String,
    entries: Arc<RwLock<HashMap<String, (IdentityId, Secret<String>)>>>,
}

impl InMemoryCredentialVault {
    pub fn new(provider: &IdentityProvider) -> Self {
        Self {
            provider_host: provider.host().to_owned(),
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn for_provider(&self, provider: &IdentityProvider) -> Self {
        Self {
            provider_host: provider.host().to_owned(),
            entries: Arc::clone(&self.entries),
        }
    }

    pub fn provider_host(&self) -> &str {
        &self.provider_host
    }
}

#[async_trait::async_trait]
impl CredentialVault for InMemoryCredentialVault {
    async fn save(
        &self,
        identity_id: &IdentityId,
        secret: &Secret<String>,
    ) -> Result<(), VaultError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            self.provider_host.clone(),
            (identity_id.clone(), secret.clone()),
        );
        Ok(())
    }

    async fn load(&self) -> Result<Option<Credential>, VaultError> {
        let entries = self.entries.read().await;
        let Some((identity_id, secret)) = entries.get(&self.provider_host) else {
            return Ok(None);
        };

        let secret = CredentialSecret::try_from(secret.clone())
            .map_err(|e| VaultError::Corrupt(e.to_string()))?;
        Ok(Some(Credential::new(identity_id.clone(), secret)))
    }

    async fn delete(&self) -> Result<(), VaultError> {
        let mut entries = self.entries.write().await;
        entries.remove(&self.provider_host);
        Ok(())
    }
}
