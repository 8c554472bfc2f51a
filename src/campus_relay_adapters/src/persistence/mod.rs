pub mod in_memory_credential_vault;
pub mod vault_credential_store;

pub use in_memory_credential_vault::InMemoryCredentialVault;
pub use vault_credential_store::VaultCredentialStore;
