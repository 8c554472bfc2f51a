use std::time::Duration;

use campus_relay_application::BrokerOptions;
use campus_relay_core::{IdentityProvider, IdentityProviderError};
use config::{Config, ConfigError, Environment, File, FileFormat, builder::DefaultState};
use serde::Deserialize;
use thiserror::Error;

use super::constants::{CONFIG_FILE, defaults, env};

type ConfigBuilder = config::ConfigBuilder<DefaultState>;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] ConfigError),
    #[error("Invalid SSO settings: {0}")]
    IdentityProvider(#[from] IdentityProviderError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelaySettings {
    pub sso: SsoSettings,
    pub http: HttpSettings,
    pub session: SessionSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SsoSettings {
    pub base_url: String,
    /// Post-login landing page, relative to `base_url`.
    pub landing_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpSettings {
    pub user_agent: String,
    pub timeout_in_millis: u64,
    pub max_redirects: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionSettings {
    pub ttl_in_seconds: u32,
}

impl RelaySettings {
    /// Loads settings from, in increasing precedence: built-in defaults,
    /// `config/relay.json` if present, and `CAMPUS_RELAY__*` environment
    /// variables (a `.env` file is read first).
    pub fn load() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();

        let builder = Self::defaults()?
            .add_source(File::new(CONFIG_FILE, FileFormat::Json).required(false))
            .add_source(
                Environment::with_prefix(env::ENV_PREFIX)
                    .prefix_separator(env::ENV_SEPARATOR)
                    .separator(env::ENV_SEPARATOR)
                    .try_parsing(true),
            );
        Self::from_builder(builder)
    }

    /// Defaults overridden by a JSON document.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Self::from_builder(Self::defaults()?.add_source(File::from_str(json, FileFormat::Json)))
    }

    fn defaults() -> Result<ConfigBuilder, ConfigError> {
        Config::builder()
            .set_default("sso.base_url", defaults::sso::BASE_URL)?
            .set_default("sso.landing_path", defaults::sso::LANDING_PATH)?
            .set_default("http.user_agent", defaults::http::USER_AGENT)?
            .set_default("http.timeout_in_millis", defaults::http::TIMEOUT_IN_MILLIS)?
            .set_default("http.max_redirects", defaults::http::MAX_REDIRECTS as u64)?
            .set_default(
                "session.ttl_in_seconds",
                u64::from(defaults::session::TTL_IN_SECONDS),
            )
    }

    fn from_builder(builder: ConfigBuilder) -> Result<Self, SettingsError> {
        let settings = builder.build()?.try_deserialize::<Self>()?;
        settings.identity_provider()?;
        Ok(settings)
    }

    pub fn identity_provider(&self) -> Result<IdentityProvider, IdentityProviderError> {
        IdentityProvider::parse(&self.sso.base_url, &self.sso.landing_path)
    }

    pub fn broker_options(&self) -> BrokerOptions {
        BrokerOptions {
            max_redirects: self.http.max_redirects,
            session_ttl: chrono::Duration::seconds(i64::from(self.session.ttl_in_seconds)),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.http.timeout_in_millis)
    }
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            sso: SsoSettings {
                base_url: defaults::sso::BASE_URL.to_string(),
                landing_path: defaults::sso::LANDING_PATH.to_string(),
            },
            http: HttpSettings {
                user_agent: defaults::http::USER_AGENT.to_string(),
                timeout_in_millis: defaults::http::TIMEOUT_IN_MILLIS,
                max_redirects: defaults::http::MAX_REDIRECTS,
            },
            session: SessionSettings {
                ttl_in_seconds: defaults::session::TTL_IN_SECONDS,
            },
        }
    }
}
