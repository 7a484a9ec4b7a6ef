use serde_json::json;

use crate::helpers::{ENROLLED, PASSWORD, TestApp, json};

#[tokio::test]
async fn resend_sends_another_code() {
    let app = TestApp::new().await;
    app.post_credentials(ENROLLED, PASSWORD).await;
    let first = app.last_code(ENROLLED).await;

    let response = app.get_resend_token("?resend_token=1").await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        json(response).await,
        json!({
            "status": "success",
            "data": {"login": null, "token_email": null, "message": "A new code was resent."}
        })
    );
    assert_eq!(app.email_client.sent().await.len(), 2);
    assert_eq!(app.tokens.tokens_of(&app.enrolled_id).await.len(), 2);

    let response = app.post_login_token(&first).await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn resend_accepts_post() {
    let app = TestApp::new().await;
    app.post_credentials(ENROLLED, PASSWORD).await;

    let response = app
        .http_client
        .post(format!("{}/login/resend-token?resend_token=1", app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(app.email_client.sent().await.len(), 2);
}

#[tokio::test]
async fn resend_without_flag_is_an_error() {
    let app = TestApp::new().await;
    app.post_credentials(ENROLLED, PASSWORD).await;

    let response = app.get_resend_token("").await;

    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(
        json(response).await,
        json!({"status": "error", "message": "Unable to send email.", "data": {}})
    );
    assert_eq!(app.email_client.sent().await.len(), 1);
}

#[tokio::test]
async fn resend_without_pending_login_is_an_error() {
    let app = TestApp::new().await;

    let response = app.get_resend_token("?resend_token=1").await;

    assert_eq!(response.status().as_u16(), 500);
    assert!(app.email_client.sent().await.is_empty());
}

#[tokio::test]
async fn resend_reports_mail_failures() {
    let app = TestApp::new().await;
    app.post_credentials(ENROLLED, PASSWORD).await;
    app.email_client.fail_with("mailbox unavailable").await;

    let response = app.get_resend_token("?resend_token=1").await;
    assert_eq!(response.status().as_u16(), 500);

    app.email_client.recover().await;
    let response = app.get_resend_token("?resend_token=1").await;
    assert_eq!(response.status().as_u16(), 200);
}
