use serde_json::json;

use crate::helpers::{ENROLLED, PASSWORD, PLAIN, TestApp, json};

#[tokio::test]
async fn user_without_second_factor_logs_in_directly() {
    let mut app = TestApp::new().await;

    let response = app.post_credentials(PLAIN, PASSWORD).await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        json(response).await,
        json!({"status": "success", "data": {"login": true, "redirect_url": "/account"}})
    );
    assert!(app.email_client.sent().await.is_empty());

    let event = app.logins.recv().await.unwrap();
    assert_eq!(event.identity.as_str(), PLAIN);
    assert!(!event.second_factor);
}

#[tokio::test]
async fn enrolled_user_is_sent_a_code() {
    let app = TestApp::new().await;

    let response = app.post_credentials(ENROLLED, PASSWORD).await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        json(response).await,
        json!({"status": "success", "data": {"login": null, "token_email": null}})
    );
    let sent = app.email_client.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, ENROLLED);
    assert_eq!(app.tokens.tokens_of(&app.enrolled_id).await.len(), 1);
}

#[tokio::test]
async fn wrong_password_is_rejected_without_sending_mail() {
    let app = TestApp::new().await;

    let response = app.post_credentials(ENROLLED, "wrong").await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(
        json(response).await,
        json!({
            "status": "fail",
            "data": {"login": false, "message": "Email or password is invalid."}
        })
    );
    assert!(app.email_client.sent().await.is_empty());
}

#[tokio::test]
async fn unknown_user_gets_the_same_answer_as_a_wrong_password() {
    let app = TestApp::new().await;

    let unknown = json(app.post_credentials("nobody@example.com", PASSWORD).await).await;
    let wrong = json(app.post_credentials(ENROLLED, "wrong").await).await;

    assert_eq!(unknown, wrong);
}

#[tokio::test]
async fn empty_form_reports_field_errors() {
    let app = TestApp::new().await;

    let response = app.post_login(&[]).await;

    assert_eq!(response.status().as_u16(), 400);
    let body = json(response).await;
    assert_eq!(body["status"], "fail");
    assert_eq!(body["data"]["login"], false);
    assert!(body["data"]["errors"]["email"].is_string());
    assert!(body["data"]["errors"]["password"].is_string());
}

#[tokio::test]
async fn combined_form_without_pending_login_starts_over() {
    let app = TestApp::new().await;

    let response = app
        .post_login(&[
            ("email", ENROLLED),
            ("password", PASSWORD),
            ("token_email", "1234"),
        ])
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body = json(response).await;
    assert_eq!(body["data"]["login"], false);
    assert!(app.email_client.sent().await.is_empty());
}

#[tokio::test]
async fn combined_form_completes_a_pending_login() {
    let app = TestApp::new().await;
    app.post_credentials(ENROLLED, PASSWORD).await;
    let code = app.last_code(ENROLLED).await;

    let response = app
        .post_login(&[("token_email", code.as_str()), ("submit_token", "Verify")])
        .await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(json(response).await["data"]["login"], true);
}

#[tokio::test]
async fn logged_in_session_short_circuits() {
    let app = TestApp::new().await;
    app.post_credentials(PLAIN, PASSWORD).await;

    let response = app.post_credentials(PLAIN, "wrong").await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(json(response).await["data"]["login"], true);
}
