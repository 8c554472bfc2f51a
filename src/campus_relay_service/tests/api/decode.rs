use campus_relay_core::ResourceRequest;
use campus_relay_scrape::{ScoreSheet, SemesterCalendar};
use campus_relay_service::ErrorKind;

use crate::helpers::{PASSWORD, TestApp, USERNAME};

const SCORE_PAGE: &str = r#"<table><tbody>
  <tr><td>2023-2024 1</td><td>COMP130001</td><td>COMP130001.01</td><td>数据结构</td>
      <td>专业必修课程</td><td>3</td><td>A</td><td>4</td></tr>
  <tr><td>2023-2024 1</td><td>broken row</td></tr>
</tbody></table>"#;

#[tokio::test]
async fn protected_score_page_is_decoded() {
    let app = TestApp::spawn().await;
    app.mount_protected("/app/scores", SCORE_PAGE).await;
    app.store_credential(USERNAME, PASSWORD).await;

    let scores = app
        .relay
        .fetch_decoded::<ScoreSheet>(&ResourceRequest::get(app.service_url("/app/scores")))
        .await
        .unwrap();

    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].course_id, "COMP130001.01");
    assert_eq!(scores[0].grade_point, "4");
}

#[tokio::test]
async fn unusable_body_is_a_malformed_response() {
    let app = TestApp::spawn().await;
    app.mount_protected("/app/calendar", "<html>maintenance</html>").await;
    app.store_credential(USERNAME, PASSWORD).await;

    let error = app
        .relay
        .fetch_decoded::<SemesterCalendar>(&ResourceRequest::get(
            app.service_url("/app/calendar"),
        ))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::MalformedResponse);
}
