//! Steps of the central-authentication login handshake.

use std::sync::Arc;

use campus_relay_core::{
    CookieTransaction, Credential, FetchedResource, HttpTransport, IdentityProvider,
    TransportError, TransportRequest, TransportResponse,
};
use campus_relay_scrape::LoginForm;
use http::Method;
use secrecy::ExposeSecret;
use thiserror::Error;
use url::Url;

use crate::session_http::SessionHttp;

#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("Identity provider requires a CAPTCHA")]
    CaptchaRequired,
    #[error("Login rejected: {0}")]
    Rejected(String),
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Result of opening the login page.
#[derive(Debug)]
pub enum LoginPage {
    /// The provider session is still valid and sent the caller on without a form.
    Authenticated(FetchedResource),
    Form { action: Url, form: LoginForm },
}

/// Login ready to be submitted, or already done.
#[derive(Debug)]
pub enum PreparedLogin {
    Authenticated(FetchedResource),
    Ready {
        action: Url,
        fields: Vec<(String, String)>,
    },
}

/// Where a successful login ended up.
#[derive(Debug)]
pub enum LoginOutcome {
    /// Redirected off the provider, normally back to the requested service.
    Returned(FetchedResource),
    /// Landed on the provider's own landing page.
    Landing(FetchedResource),
}

impl LoginOutcome {
    pub fn resource(&self) -> &FetchedResource {
        match self {
            Self::Returned(resource) | Self::Landing(resource) => resource,
        }
    }
}

pub struct SsoGateway<T> {
    http: SessionHttp<T>,
    provider: IdentityProvider,
}

impl<T> Clone for SsoGateway<T> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            provider: self.provider.clone(),
        }
    }
}

impl<T> SsoGateway<T>
where
    T: HttpTransport,
{
    pub fn new(transport: Arc<T>, provider: IdentityProvider, max_redirects: usize) -> Self {
        Self {
            http: SessionHttp::new(transport, max_redirects),
            provider,
        }
    }

    pub fn provider(&self) -> &IdentityProvider {
        &self.provider
    }

    /// Asks the provider whether `credential` must solve a CAPTCHA.
    ///
    /// Anything but a literal `false` counts as yes.
    pub async fn captcha_required(
        &self,
        credential: &Credential,
        cookies: &mut CookieTransaction,
    ) -> Result<bool, TransportError> {
        let url = self.provider.captcha_check_url(credential.identity_id());
        let answer = self.http.send(TransportRequest::get(url), cookies).await?;
        Ok(answer.text().trim() != "false")
    }

    pub async fn open_login_page(
        &self,
        service: Option<&Url>,
        cookies: &mut CookieTransaction,
    ) -> Result<LoginPage, TransportError> {
        let url = self.provider.login_url(service);
        let page = self.http.send(TransportRequest::get(url), cookies).await?;

        if !self.provider.owns(page.url()) || self.provider.is_landing(page.url()) {
            return Ok(LoginPage::Authenticated(page));
        }

        Ok(LoginPage::Form {
            action: page.url().clone(),
            form: LoginForm::inspect(page.bytes()),
        })
    }

    /// Form fields to submit: `username`, `password`, then every hidden
    /// field of the page verbatim.
    pub fn submission(&self, credential: &Credential, form: &LoginForm) -> Vec<(String, String)> {
        let mut fields = Vec::with_capacity(form.hidden_fields.len() + 2);
        fields.push((
            "username".to_string(),
            credential.identity_id().as_str().to_owned(),
        ));
        fields.push((
            "password".to_string(),
            credential.secret().as_ref().expose_secret().clone(),
        ));
        fields.extend(form.hidden_fields.iter().cloned());
        fields
    }

    /// Opens the login page, refuses CAPTCHA-protected logins and assembles
    /// the form submission.
    pub async fn prepare(
        &self,
        credential: &Credential,
        service: Option<&Url>,
        cookies: &mut CookieTransaction,
    ) -> Result<PreparedLogin, HandshakeError> {
        let (action, form) = match self.open_login_page(service, cookies).await? {
            LoginPage::Authenticated(resource) => {
                tracing::debug!(url = %resource.url(), "Provider session still valid");
                return Ok(PreparedLogin::Authenticated(resource));
            }
            LoginPage::Form { action, form } => (action, form),
        };

        if form.captcha_required || self.captcha_required(credential, cookies).await? {
            tracing::warn!(identity = %credential.identity_id(), "Identity provider demands a CAPTCHA");
            return Err(HandshakeError::CaptchaRequired);
        }

        Ok(PreparedLogin::Ready {
            action,
            fields: self.submission(credential, &form),
        })
    }

    /// Posts the login form and follows the redirects.
    pub async fn submit(
        &self,
        action: Url,
        fields: &[(String, String)],
        cookies: &mut CookieTransaction,
    ) -> Result<FetchedResource, TransportError> {
        self.http
            .send(TransportRequest::form(Method::POST, action, fields), cookies)
            .await
    }

    /// Posts the login form without following its redirect.
    pub async fn submit_once(
        &self,
        action: Url,
        fields: &[(String, String)],
        cookies: &mut CookieTransaction,
    ) -> Result<TransportResponse, TransportError> {
        self.http
            .send_once(&TransportRequest::form(Method::POST, action, fields), cookies)
            .await
    }

    /// Decides from the final URL of a login whether it succeeded.
    pub fn classify(&self, resolved: FetchedResource) -> Result<LoginOutcome, HandshakeError> {
        if self.provider.is_landing(resolved.url()) {
            return Ok(LoginOutcome::Landing(resolved));
        }
        if !self.provider.owns(resolved.url()) {
            return Ok(LoginOutcome::Returned(resolved));
        }
        Err(HandshakeError::Rejected(format!(
            "login ended on {}",
            resolved.url()
        )))
    }

    /// Full handshake: login page, CAPTCHA checks, submission, classification.
    #[tracing::instrument(
        name = "SsoGateway::handshake",
        skip(self, credential, cookies),
        fields(provider = %self.provider.host())
    )]
    pub async fn handshake(
        &self,
        credential: &Credential,
        service: Option<&Url>,
        cookies: &mut CookieTransaction,
    ) -> Result<LoginOutcome, HandshakeError> {
        tracing::info!("Starting login handshake");

        let outcome = match self.prepare(credential, service, cookies).await? {
            PreparedLogin::Authenticated(resource) => self.classify(resource),
            PreparedLogin::Ready { action, fields } => {
                let resolved = self.submit(action, &fields, cookies).await?;
                self.classify(resolved)
            }
        };

        match &outcome {
            Ok(outcome) => tracing::info!(url = %outcome.resource().url(), "Login handshake completed"),
            Err(e) => tracing::warn!(error = %e, "Login rejected"),
        }
        outcome
    }
}
