//! In-process transports for broker and use case tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use async_trait::async_trait;
use campus_relay_core::{
    Credential, CredentialStore, CredentialStoreError, HttpTransport, IdentityProvider,
    TransportError, TransportRequest, TransportResponse,
};
use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use secrecy::Secret;
use url::Url;

pub const SSO_BASE: &str = "https://sso.example/authserver";
pub const USERNAME: &str = "u1";
pub const PASSWORD: &str = "p1";
pub const TOKEN: &str = "abc123";

pub fn provider() -> IdentityProvider {
    IdentityProvider::parse(SSO_BASE, "index.do").unwrap()
}

pub fn credential() -> Credential {
    Credential::parse(USERNAME, Secret::new(PASSWORD.to_string())).unwrap()
}

fn response(url: &str, status: u16, body: &str) -> TransportResponse {
    TransportResponse {
        url: Url::parse(url).unwrap(),
        status: StatusCode::from_u16(status).unwrap(),
        headers: HeaderMap::new(),
        body: body.as_bytes().to_vec(),
    }
}

pub fn ok(url: &str, body: &str) -> TransportResponse {
    response(url, 200, body)
}

pub fn redirect(url: &str, location: &str) -> TransportResponse {
    let mut response = response(url, 302, "");
    response
        .headers
        .insert(header::LOCATION, HeaderValue::from_str(location).unwrap());
    response
}

pub fn response_with_cookie(mut response: TransportResponse, cookie: &str) -> TransportResponse {
    response
        .headers
        .append(header::SET_COOKIE, HeaderValue::from_str(cookie).unwrap());
    response
}

/// Answers with canned responses in order and records every request.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<TransportResponse>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<TransportResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(
        &self,
        request: &TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        let mut response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::Unexpected("script exhausted".to_string()))?;
        response.url = request.url.clone();
        Ok(response)
    }
}

pub fn login_page(captcha: bool) -> String {
    let captcha_input = if captcha {
        r#"<input id="captchaResponse" name="captchaResponse" type="text"/>"#
    } else {
        ""
    };
    format!(
        r#"<html><body><form id="casLoginForm" method="post">
        <input id="username" name="username" type="text"/>
        <input id="password" name="password" type="password"/>
        {captcha_input}
        <input type="hidden" name="token" value="{TOKEN}"/>
        </form></body></html>"#
    )
}

/// Simulates the identity provider at `sso.example` and any number of
/// services that trust it through `?ticket=` redirects.
#[derive(Default)]
pub struct FakeCampus {
    pub captcha_answer: &'static str,
    pub captcha_marker: bool,
    pub captcha_check_fails: bool,
    pub hang_on_login_post: bool,
    pub requests: Mutex<Vec<TransportRequest>>,
}

impl FakeCampus {
    pub fn new() -> Self {
        Self {
            captcha_answer: "false",
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, url_prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.url.as_str().starts_with(url_prefix))
            .count()
    }

    pub fn login_posts(&self) -> Vec<TransportRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == Method::POST && r.url.path() == "/authserver/login")
            .collect()
    }

    async fn answer(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = request.url.as_str();
        let cookies = request_cookies(request);

        if request.url.host_str() != Some("sso.example") {
            return Ok(self.answer_service(request, &cookies));
        }

        match (request.method.clone(), request.url.path()) {
            (_, "/authserver/needCaptcha.html") => {
                if self.captcha_check_fails {
                    return Err(TransportError::Connection("connection reset".to_string()));
                }
                Ok(response_with_cookie(
                    ok(url, self.captcha_answer),
                    "captcha_checked=1; Path=/authserver",
                ))
            }
            (Method::GET, "/authserver/login") => {
                if cookies.get("CASTGC").map(String::as_str) == Some("TGT-1") {
                    return Ok(redirect(url, &after_login(&request.url)));
                }
                Ok(response_with_cookie(
                    ok(url, &login_page(self.captcha_marker)),
                    "JSESSIONID=sso-1; Path=/authserver",
                ))
            }
            (Method::POST, "/authserver/login") => {
                if self.hang_on_login_post {
                    std::future::pending::<()>().await;
                }
                let fields: HashMap<String, String> = request.form_fields().into_iter().collect();
                let accepted = fields.get("username").map(String::as_str) == Some(USERNAME)
                    && fields.get("password").map(String::as_str) == Some(PASSWORD)
                    && fields.get("token").map(String::as_str) == Some(TOKEN);
                if !accepted {
                    return Ok(ok(url, &login_page(false)));
                }
                Ok(response_with_cookie(
                    redirect(url, &after_login(&request.url)),
                    "CASTGC=TGT-1; Path=/authserver",
                ))
            }
            (_, "/authserver/index.do") => Ok(ok(url, "welcome")),
            _ => Ok(response(url, 404, "")),
        }
    }

    fn answer_service(
        &self,
        request: &TransportRequest,
        cookies: &HashMap<String, String>,
    ) -> TransportResponse {
        let url = request.url.as_str();

        if request.url.query_pairs().any(|(k, v)| k == "ticket" && v == "ST-1") {
            let mut clean = request.url.clone();
            let rest: Vec<(String, String)> = request
                .url
                .query_pairs()
                .filter(|(k, _)| k != "ticket")
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            if rest.is_empty() {
                clean.set_query(None);
            } else {
                clean.query_pairs_mut().clear().extend_pairs(rest);
            }
            return response_with_cookie(redirect(url, clean.as_str()), "svc=ok; Path=/");
        }

        if cookies.get("svc").map(String::as_str) != Some("ok") {
            let mut login = provider().login_url(Some(&request.url));
            login.set_fragment(None);
            return redirect(url, login.as_str());
        }

        if request.method == Method::POST {
            let body = String::from_utf8_lossy(request.body.as_deref().unwrap_or_default());
            ok(url, &format!("posted:{body}"))
        } else {
            ok(url, &format!("page:{}", request.url.path()))
        }
    }
}

#[async_trait]
impl HttpTransport for FakeCampus {
    async fn execute(
        &self,
        request: &TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        // Lets concurrent fetches interleave
        tokio::task::yield_now().await;
        self.answer(request).await
    }
}

fn request_cookies(request: &TransportRequest) -> HashMap<String, String> {
    request
        .headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|header| {
            header
                .split("; ")
                .filter_map(|pair| pair.split_once('='))
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

/// Where the provider sends a successful login: back to `service` with a
/// ticket, or to its landing page.
fn after_login(login_url: &Url) -> String {
    match login_url.query_pairs().find(|(k, _)| k == "service") {
        Some((_, service)) => {
            let mut service = Url::parse(&service).unwrap();
            service.query_pairs_mut().append_pair("ticket", "ST-1");
            service.to_string()
        }
        None => format!("{SSO_BASE}/index.do"),
    }
}

/// Credential store over a plain mutex.
#[derive(Default)]
pub struct MemoryCredentialStore {
    credential: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn with(credential: Credential) -> Self {
        Self {
            credential: Mutex::new(Some(credential)),
        }
    }

    pub fn current(&self) -> Option<Credential> {
        self.credential.lock().unwrap().clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn set_credential(&self, credential: Credential) -> Result<(), CredentialStoreError> {
        *self.credential.lock().unwrap() = Some(credential);
        Ok(())
    }

    async fn get_credential(&self) -> Result<Option<Credential>, CredentialStoreError> {
        Ok(self.credential.lock().unwrap().clone())
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        *self.credential.lock().unwrap() = None;
        Ok(())
    }
}
