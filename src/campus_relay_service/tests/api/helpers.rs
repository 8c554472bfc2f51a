use campus_relay_adapters::RelaySettings;
use campus_relay_core::{Credential, CredentialStore};
use campus_relay_service::CampusRelay;
use secrecy::Secret;
use url::{Url, form_urlencoded};
use wiremock::{
    Mock, MockServer, Request, ResponseTemplate,
    matchers::{method, path, query_param},
};

pub const USERNAME: &str = "u1";
pub const PASSWORD: &str = "p1";
pub const TOKEN: &str = "abc123";
pub const TICKET: &str = "ST-1";
pub const TGT: &str = "TGT-1";

pub struct TestApp {
    pub sso: MockServer,
    pub service: MockServer,
    pub relay: CampusRelay,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_captcha("false").await
    }

    /// Identity provider answering `needCaptcha.html` with `captcha_answer`,
    /// plus an empty service server.
    pub async fn spawn_with_captcha(captcha_answer: &str) -> Self {
        let sso = MockServer::start().await;
        let service = MockServer::start().await;
        mount_identity_provider(&sso, captcha_answer).await;

        let settings = RelaySettings::from_json(&format!(
            r#"{{
                "sso": {{ "base_url": "{}/authserver" }},
                "http": {{ "timeout_in_millis": 2000 }}
            }}"#,
            sso.uri()
        ))
        .expect("Failed to build settings");
        let relay = CampusRelay::from_settings(&settings).expect("Failed to build relay");

        Self {
            sso,
            service,
            relay,
        }
    }

    pub fn service_url(&self, route: &str) -> Url {
        Url::parse(&format!("{}{route}", self.service.uri())).expect("Invalid service URL")
    }

    pub async fn store_credential(&self, username: &str, password: &str) {
        let credential = Credential::parse(username, Secret::new(password.to_string()))
            .expect("Invalid credential");
        self.relay
            .credential_store()
            .set_credential(credential)
            .await
            .expect("Failed to store credential");
    }

    /// Mounts a service route that trusts the identity provider: a `ticket`
    /// query parameter sets the service cookie, a request carrying the cookie
    /// is answered, anything else is sent to the provider's login page.
    pub async fn mount_protected(&self, route: &str, page: &str) {
        let sso_login = format!("{}/authserver/login", self.sso.uri());

        Mock::given(path(route))
            .and(query_param("ticket", TICKET))
            .respond_with(|request: &Request| {
                let mut clean = request.url.clone();
                clean.set_query(None);
                ResponseTemplate::new(302)
                    .insert_header("Location", clean.as_str())
                    .insert_header("Set-Cookie", "svc=ok; Path=/app")
            })
            .with_priority(1)
            .mount(&self.service)
            .await;

        Mock::given(method("GET"))
            .and(path(route))
            .and(has_cookie("svc", "ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .with_priority(2)
            .mount(&self.service)
            .await;

        Mock::given(method("POST"))
            .and(path(route))
            .and(has_cookie("svc", "ok"))
            .respond_with(|request: &Request| {
                let body = String::from_utf8_lossy(&request.body).into_owned();
                ResponseTemplate::new(200).set_body_string(format!("posted:{body}"))
            })
            .with_priority(2)
            .mount(&self.service)
            .await;

        Mock::given(path(route))
            .respond_with(move |request: &Request| {
                let login = Url::parse_with_params(&sso_login, &[("service", request.url.as_str())])
                    .expect("Invalid login URL");
                ResponseTemplate::new(302).insert_header("Location", login.as_str())
            })
            .with_priority(5)
            .mount(&self.service)
            .await;
    }

    pub async fn login_posts(&self) -> Vec<Request> {
        self.sso
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.method.as_str() == "POST" && r.url.path() == "/authserver/login")
            .collect()
    }

    pub async fn service_requests(&self) -> usize {
        self.service
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }

    pub async fn sso_requests(&self) -> usize {
        self.sso
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }
}

pub fn login_page() -> String {
    format!(
        r#"<html><body><form id="casLoginForm" method="post">
        <input id="username" name="username" type="text"/>
        <input id="password" name="password" type="password"/>
        <input type="hidden" name="token" value="{TOKEN}"/>
        </form></body></html>"#
    )
}

async fn mount_identity_provider(sso: &MockServer, captcha_answer: &str) {
    Mock::given(method("GET"))
        .and(path("/authserver/needCaptcha.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(captcha_answer))
        .mount(sso)
        .await;

    // A live provider session skips the form
    Mock::given(method("GET"))
        .and(path("/authserver/login"))
        .and(has_cookie("CASTGC", TGT))
        .respond_with(|request: &Request| {
            ResponseTemplate::new(302).insert_header("Location", after_login(&request.url).as_str())
        })
        .with_priority(1)
        .mount(sso)
        .await;

    Mock::given(method("GET"))
        .and(path("/authserver/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/html; charset=utf-8")
                .insert_header("Set-Cookie", "JSESSIONID=sso-1; Path=/authserver")
                .set_body_string(login_page()),
        )
        .with_priority(5)
        .mount(sso)
        .await;

    Mock::given(method("POST"))
        .and(path("/authserver/login"))
        .respond_with(|request: &Request| {
            let fields: Vec<(String, String)> = form_urlencoded::parse(&request.body)
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            let field = |name: &str| {
                fields
                    .iter()
                    .find(|(k, _)| k == name)
                    .map(|(_, v)| v.as_str())
            };

            if field("username") == Some(USERNAME)
                && field("password") == Some(PASSWORD)
                && field("token") == Some(TOKEN)
            {
                ResponseTemplate::new(302)
                    .insert_header("Location", after_login(&request.url).as_str())
                    .insert_header("Set-Cookie", format!("CASTGC={TGT}; Path=/authserver"))
            } else {
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "text/html; charset=utf-8")
                    .set_body_string(login_page())
            }
        })
        .mount(sso)
        .await;

    Mock::given(method("GET"))
        .and(path("/authserver/index.do"))
        .respond_with(ResponseTemplate::new(200).set_body_string("welcome"))
        .mount(sso)
        .await;
}

/// Back to `service` with a ticket, or to the landing page.
fn after_login(login_url: &Url) -> Url {
    match login_url.query_pairs().find(|(k, _)| k == "service") {
        Some((_, service)) => {
            let mut service = Url::parse(&service).expect("Invalid service parameter");
            service.query_pairs_mut().append_pair("ticket", TICKET);
            service
        }
        None => login_url.join("index.do").expect("Invalid landing URL"),
    }
}

fn has_cookie(name: &'static str, value: &'static str) -> impl Fn(&Request) -> bool {
    move |request: &Request| {
        request
            .headers
            .get("cookie")
            .and_then(|header| header.to_str().ok())
            .is_some_and(|header| {
                header
                    .split("; ")
                    .filter_map(|pair| pair.split_once('='))
                    .any(|(k, v)| k == name && v == value)
            })
    }
}
