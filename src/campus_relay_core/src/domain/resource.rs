use std::borrow::Cow;

use http::{HeaderMap, Method, StatusCode};
use url::Url;

use crate::ports::transport::{TransportRequest, TransportResponse};

/// Authority used to decide whether two URLs point at the same service:
/// the lowercase host name, plus the port when it is not the scheme default.
pub fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    match url.port() {
        Some(port) => Some(format!("{host}:{port}")),
        None => Some(host),
    }
}

/// A request a feature module wants answered, with or without SSO.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    target: Url,
    method: Method,
    form: Option<Vec<(String, String)>>,
    requires_auth: bool,
    login_url: Option<Url>,
}

impl ResourceRequest {
    /// Authenticated GET.
    pub fn get(target: Url) -> Self {
        Self {
            target,
            method: Method::GET,
            form: None,
            requires_auth: true,
            login_url: None,
        }
    }

    /// Authenticated form POST.
    pub fn post_form<K, V>(target: Url, form: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            target,
            method: Method::POST,
            form: Some(
                form.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            requires_auth: true,
            login_url: None,
        }
    }

    /// Marks the request as not needing the SSO session.
    pub fn public(mut self) -> Self {
        self.requires_auth = false;
        self
    }

    /// Service entry page visited first whenever the target host's session is stale.
    pub fn with_login_url(mut self, login_url: Url) -> Self {
        self.login_url = Some(login_url);
        self
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn form(&self) -> Option<&[(String, String)]> {
        self.form.as_deref()
    }

    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    pub fn login_url(&self) -> Option<&Url> {
        self.login_url.as_ref()
    }

    pub fn host(&self) -> Option<String> {
        host_key(&self.target)
    }

    pub fn to_transport_request(&self) -> TransportRequest {
        match &self.form {
            Some(form) => TransportRequest::form(self.method.clone(), self.target.clone(), form),
            None => TransportRequest::new(self.method.clone(), self.target.clone()),
        }
    }
}

/// Final response of a fetch, after all redirects were followed.
#[derive(Debug, Clone)]
pub struct FetchedResource {
    url: Url,
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    redirects: usize,
}

impl FetchedResource {
    pub fn from_response(response: TransportResponse, redirects: usize) -> Self {
        Self {
            url: response.url,
            status: response.status,
            headers: response.headers,
            body: response.body,
            redirects,
        }
    }

    /// Resolved URL of the last hop.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Number of redirects followed to reach `url`.
    pub fn redirects(&self) -> usize {
        self.redirects
    }
}
