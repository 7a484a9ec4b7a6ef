use secrecy::Secret;
use serde_json::json;
use twofactor_core::User;

use crate::helpers::{ENROLLED, PASSWORD, TestApp, json};

#[tokio::test]
async fn correct_code_completes_the_login() {
    let mut app = TestApp::new().await;
    app.post_credentials(ENROLLED, PASSWORD).await;
    let code = app.last_code(ENROLLED).await;

    let response = app.post_login_token(&code).await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        json(response).await,
        json!({"status": "success", "data": {"login": true, "redirect_url": "/account"}})
    );
    assert!(app.tokens.tokens_of(&app.enrolled_id).await.is_empty());

    let event = app.logins.recv().await.unwrap();
    assert_eq!(event.identity.as_str(), ENROLLED);
    assert!(event.second_factor);
}

#[tokio::test]
async fn wrong_code_keeps_the_login_pending() {
    let app = TestApp::new().await;
    app.post_credentials(ENROLLED, PASSWORD).await;
    let code = app.last_code(ENROLLED).await;
    let wrong = if code == "0000" { "0001" } else { "0000" };

    let response = app.post_login_token(wrong).await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(
        json(response).await,
        json!({"status": "fail", "data": {"login": null, "token_email": "Invalid code."}})
    );

    let response = app.post_login_token(&code).await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn malformed_code_is_a_form_error() {
    let app = TestApp::new().await;
    app.post_credentials(ENROLLED, PASSWORD).await;

    let response = app.post_login_token("abcd").await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(
        json(response).await["data"]["token_email"],
        "The input must be a number between 0 and 9999"
    );
    assert_eq!(app.tokens.tokens_of(&app.enrolled_id).await.len(), 1);
}

#[tokio::test]
async fn code_without_step_one_is_rejected() {
    let app = TestApp::new().await;

    let response = app.post_login_token("1234").await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(json(response).await["data"]["login"], false);
}

#[tokio::test]
async fn code_is_single_use() {
    let app = TestApp::new().await;
    app.post_credentials(ENROLLED, PASSWORD).await;
    let code = app.last_code(ENROLLED).await;
    app.post_login_token(&code).await;

    let other = app.with_new_client();
    other.post_credentials(ENROLLED, PASSWORD).await;
    let fresh = other.last_code(ENROLLED).await;
    if fresh == code {
        return;
    }

    let response = other.post_login_token(&code).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn deactivated_user_is_sent_back_to_step_one() {
    let app = TestApp::new().await;
    app.post_credentials(ENROLLED, PASSWORD).await;
    let code = app.last_code(ENROLLED).await;

    let enrolled = crate::helpers::user(ENROLLED);
    let inactive = User::new(
        app.enrolled_id,
        enrolled.identity().clone(),
        enrolled.email().clone(),
        enrolled.name().to_string(),
        false,
    );
    app.users
        .add_user(inactive, Secret::new(PASSWORD.to_string()), true)
        .await;

    let response = app.post_login_token(&code).await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(
        json(response).await,
        json!({
            "status": "fail",
            "data": {"login": false, "message": "Email or password is invalid."}
        })
    );
}
