pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    cookie_jar::{CookieJar, CookieOp, CookieTransaction},
    credential::{Credential, CredentialError, CredentialSecret, IdentityId},
    identity_provider::{IdentityProvider, IdentityProviderError},
    resource::{FetchedResource, ResourceRequest, host_key},
    session::Session,
};

pub use ports::{
    credentials::{CredentialStore, CredentialStoreError, CredentialVault, VaultError},
    transport::{HttpTransport, TransportError, TransportRequest, TransportResponse},
};
