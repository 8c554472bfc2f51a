use campus_relay_core::ResourceRequest;
use campus_relay_service::ErrorKind;
use url::Url;
use wiremock::{Mock, ResponseTemplate, matchers::path};

use crate::helpers::{PASSWORD, TestApp, USERNAME};

#[tokio::test]
async fn fetch_logs_in_and_returns_the_service_page() {
    let app = TestApp::spawn().await;
    app.mount_protected("/app/page", "secret page").await;
    app.store_credential(USERNAME, PASSWORD).await;

    let resource = app
        .relay
        .fetch(&ResourceRequest::get(app.service_url("/app/page")))
        .await
        .unwrap();

    assert_eq!(resource.bytes(), b"secret page");
    assert_eq!(resource.url(), &app.service_url("/app/page"));

    let posts = app.login_posts().await;
    assert_eq!(posts.len(), 1);
    assert_eq!(
        String::from_utf8_lossy(&posts[0].body),
        "username=u1&password=p1&token=abc123"
    );
}

#[tokio::test]
async fn second_fetch_is_a_single_request() {
    let app = TestApp::spawn().await;
    app.mount_protected("/app/page", "secret page").await;
    app.store_credential(USERNAME, PASSWORD).await;
    let request = ResourceRequest::get(app.service_url("/app/page"));

    app.relay.fetch(&request).await.unwrap();
    let service_before = app.service_requests().await;
    let sso_before = app.sso_requests().await;

    let bytes = app.relay.fetch_bytes(&request).await.unwrap();

    assert_eq!(bytes, b"secret page");
    assert_eq!(app.service_requests().await, service_before + 1);
    assert_eq!(app.sso_requests().await, sso_before);
}

#[tokio::test]
async fn fetch_without_credential_is_credential_missing() {
    let app = TestApp::spawn().await;
    app.mount_protected("/app/page", "secret page").await;

    let error = app
        .relay
        .fetch(&ResourceRequest::get(app.service_url("/app/page")))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::CredentialMissing);
    assert!(app.login_posts().await.is_empty());
}

#[tokio::test]
async fn captcha_demand_stops_before_the_login_post() {
    let app = TestApp::spawn_with_captcha("true").await;
    app.mount_protected("/app/page", "secret page").await;
    app.store_credential(USERNAME, PASSWORD).await;

    let error = app
        .relay
        .fetch(&ResourceRequest::get(app.service_url("/app/page")))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::CaptchaRequired);
    assert!(app.login_posts().await.is_empty());
}

#[tokio::test]
async fn wrong_password_is_an_authentication_failure() {
    let app = TestApp::spawn().await;
    app.mount_protected("/app/page", "secret page").await;
    app.store_credential(USERNAME, "not-the-password").await;

    let error = app
        .relay
        .fetch(&ResourceRequest::get(app.service_url("/app/page")))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::AuthenticationFailed);
    assert!(!error.is_retryable());
    assert_eq!(app.login_posts().await.len(), 1);
}

#[tokio::test]
async fn post_is_replayed_once_with_its_body_after_login() {
    let app = TestApp::spawn().await;
    app.mount_protected("/app/submit", "form page").await;
    app.store_credential(USERNAME, PASSWORD).await;

    let bytes = app
        .relay
        .fetch_bytes(&ResourceRequest::post_form(
            app.service_url("/app/submit"),
            [("week", "3"), ("room", "H3109")],
        ))
        .await
        .unwrap();

    assert_eq!(bytes, b"posted:week=3&room=H3109");
    let posts_to_service = app
        .service
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "POST")
        .count();
    assert_eq!(posts_to_service, 2);
}

#[tokio::test]
async fn public_request_skips_the_identity_provider() {
    let app = TestApp::spawn().await;
    Mock::given(path("/bus/schedule"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&app.service)
        .await;

    let bytes = app
        .relay
        .fetch_bytes(&ResourceRequest::get(app.service_url("/bus/schedule")).public())
        .await
        .unwrap();

    assert_eq!(bytes, b"[]");
    assert_eq!(app.sso_requests().await, 0);
}

#[tokio::test]
async fn unreachable_host_is_a_retryable_transport_error() {
    let app = TestApp::spawn().await;
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let error = app
        .relay
        .fetch(
            &ResourceRequest::get(Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap())
                .public(),
        )
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Transport);
    assert!(error.is_retryable());
}
