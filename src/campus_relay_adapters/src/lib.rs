pub mod config;
pub mod http;
pub mod persistence;
pub mod telemetry;

pub use self::config::{RelaySettings, SettingsError};
pub use self::http::ReqwestTransport;
pub use persistence::{InMemoryCredentialVault, VaultCredentialStore};
pub use telemetry::init_tracing;
