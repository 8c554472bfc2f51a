use campus_relay_service::ErrorKind;

use crate::helpers::{PASSWORD, TestApp, USERNAME};

#[tokio::test]
async fn ticket_url_carries_a_service_ticket() {
    let app = TestApp::spawn().await;
    app.store_credential(USERNAME, PASSWORD).await;
    let target = app.service_url("/app/page");

    let url = app.relay.ticket_url(&target).await.unwrap();

    assert_eq!(url.as_str(), format!("{target}?ticket=ST-1"));
    assert_eq!(app.service_requests().await, 0);
    // Throwaway jar
    assert!(app.relay.session().read().await.jar().is_empty());
}

#[tokio::test]
async fn ticket_url_needs_a_stored_credential() {
    let app = TestApp::spawn().await;

    let error = app
        .relay
        .ticket_url(&app.service_url("/app/page"))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::CredentialMissing);
    assert_eq!(app.sso_requests().await, 0);
}
