use thiserror::Error;
use url::Url;

use super::{credential::IdentityId, resource::host_key};

const LOGIN_PATH: &str = "login";
const CAPTCHA_CHECK_PATH: &str = "needCaptcha.html";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityProviderError {
    #[error("Invalid identity provider URL: {0}")]
    InvalidUrl(String),
}

/// Central authentication server that gates every campus service.
///
/// All endpoints hang off `base_url`:
/// - `{base}/login[?service=...]` serves and accepts the login form
/// - `{base}/needCaptcha.html?username=...` answers `true`/`false`
/// - `{base}/{landing_path}` is where a login without `service` ends up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityProvider {
    base_url: Url,
    host: String,
    landing_path: String,
}

impl IdentityProvider {
    pub fn new(mut base_url: Url, landing_path: &str) -> Result<Self, IdentityProviderError> {
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(IdentityProviderError::InvalidUrl(format!(
                "unsupported scheme {}",
                base_url.scheme()
            )));
        }
        let host = host_key(&base_url)
            .ok_or_else(|| IdentityProviderError::InvalidUrl("missing host".to_string()))?;

        // `Url::join` replaces the last segment unless the path ends with a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        base_url.set_query(None);
        base_url.set_fragment(None);

        Ok(Self {
            base_url,
            host,
            landing_path: landing_path.trim_start_matches('/').to_owned(),
        })
    }

    pub fn parse(base_url: &str, landing_path: &str) -> Result<Self, IdentityProviderError> {
        let url =
            Url::parse(base_url).map_err(|e| IdentityProviderError::InvalidUrl(e.to_string()))?;
        Self::new(url, landing_path)
    }

    /// Host key (`host[:port]`) of the provider.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Login page, optionally pre-seeded with the service to return to.
    pub fn login_url(&self, service: Option<&Url>) -> Url {
        let mut url = self.endpoint(LOGIN_PATH);
        if let Some(service) = service {
            url.query_pairs_mut()
                .append_pair("service", service.as_str());
        }
        url
    }

    pub fn captcha_check_url(&self, identity: &IdentityId) -> Url {
        let mut url = self.endpoint(CAPTCHA_CHECK_PATH);
        url.query_pairs_mut()
            .append_pair("username", identity.as_str());
        url
    }

    pub fn landing_url(&self) -> Url {
        self.endpoint(&self.landing_path)
    }

    /// Whether a resolved response URL is still on the provider, i.e. the
    /// caller has been bounced to the login page.
    pub fn owns(&self, url: &Url) -> bool {
        host_key(url).as_deref() == Some(self.host.as_str())
    }

    pub fn is_landing(&self, url: &Url) -> bool {
        let landing = self.landing_url();
        self.owns(url) && url.path() == landing.path()
    }

    fn endpoint(&self, path: &str) -> Url {
        // Joining a relative segment onto a slash-terminated base cannot fail
        self.base_url
            .join(path)
            .unwrap_or_else(|_| self.base_url.clone())
    }
}
