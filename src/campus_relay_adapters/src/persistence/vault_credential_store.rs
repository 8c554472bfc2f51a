use std::sync::Arc;

use arc_swap::ArcSwap;
use campus_relay_core::{Credential, CredentialStore, CredentialStoreError, CredentialVault};

enum Cached {
    Unloaded,
    Loaded(Option<Credential>),
}

/// Credential store backed by a platform vault.
///
/// The vault is read once, on the first `get_credential`; afterwards reads are
/// served from the cache. Writes go to the vault first and only reach the cache
/// when the vault accepted them.
pub struct VaultCredentialStore<V>
where
    V: CredentialVault,
{
    vault: V,
    cache: ArcSwap<Cached>,
}

impl<V> VaultCredentialStore<V>
where
    V: CredentialVault,
{
    pub fn new(vault: V) -> Self {
        Self {
            vault,
            cache: ArcSwap::from_pointee(Cached::Unloaded),
        }
    }

    pub fn vault(&self) -> &V {
        &self.vault
    }
}

#[async_trait::async_trait]
impl<V> CredentialStore for VaultCredentialStore<V>
where
    V: CredentialVault,
{
    #[tracing::instrument(name = "VaultCredentialStore::set_credential", skip_all, fields(identity = %credential.identity_id()))]
    async fn set_credential(&self, credential: Credential) -> Result<(), CredentialStoreError> {
        self.vault
            .save(credential.identity_id(), credential.secret().as_ref())
            .await?;
        self.cache
            .store(Arc::new(Cached::Loaded(Some(credential))));
        Ok(())
    }

    async fn get_credential(&self) -> Result<Option<Credential>, CredentialStoreError> {
        if let Cached::Loaded(credential) = self.cache.load_full().as_ref() {
            return Ok(credential.clone());
        }

        let credential = self.vault.load().await?;
        tracing::debug!(found = credential.is_some(), "Credential loaded from vault");
        self.cache
            .store(Arc::new(Cached::Loaded(credential.clone())));
        Ok(credential)
    }

    #[tracing::instrument(name = "VaultCredentialStore::clear", skip_all)]
    async fn clear(&self) -> Result<(), CredentialStoreError> {
        self.vault.delete().await?;
        self.cache.store(Arc::new(Cached::Loaded(None)));
        Ok(())
    }
}
