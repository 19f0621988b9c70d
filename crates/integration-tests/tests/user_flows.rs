//! Integration tests for accounts and one-time code flows.
//!
//! Requests go through the full router (bearer extraction, request ids,
//! permissions) over in-memory stores, a recording mailer and a static
//! geocoder.

use serde_json::json;

use campfinder_integration_tests::{ADD_USER, TestApp, error_code, error_message};

const ME: &str = "{ user { id name email role isEmailConfirmed } }";

// ============================================================================
// Registration & Login
// ============================================================================

#[tokio::test]
async fn test_register_defaults_to_user_role() {
    let app = TestApp::new();

    let body = app
        .graphql(
            r"mutation($name: String!, $email: String!, $password: String!) {
                addNewUser(name: $name, email: $email, password: $password) { role email }
            }",
            json!({"name": "Jane", "email": "Jane.Doe@Email.com", "password": "password"}),
            None,
        )
        .await;

    assert_eq!(body["data"]["addNewUser"]["role"], "user");
    assert_eq!(body["data"]["addNewUser"]["email"], "jane.doe@email.com");
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let app = TestApp::new();
    app.register("Jane", "jane@email.com", "user").await;

    let body = app
        .graphql(
            ADD_USER,
            json!({"name": "Other", "email": "JANE@email.com", "role": "user", "password": "password"}),
            None,
        )
        .await;

    assert!(error_message(&body).unwrap_or_default().contains("Email already in use"));
    assert_eq!(error_code(&body), Some("VALIDATION_ERROR"));
}

#[tokio::test]
async fn test_login_failure_does_not_reveal_which_part_was_wrong() {
    let app = TestApp::new();
    app.register("Jane", "jane@email.com", "user").await;

    let login = r"mutation($email: String!, $password: String!) { loginUser(email: $email, password: $password) }";
    let wrong_password = app
        .graphql(login, json!({"email": "jane@email.com", "password": "nope-nope"}), None)
        .await;
    let unknown_email = app
        .graphql(login, json!({"email": "who@email.com", "password": "password"}), None)
        .await;

    assert_eq!(error_message(&wrong_password), Some("Invalid email or password"));
    assert_eq!(error_message(&unknown_email), error_message(&wrong_password));
}

#[tokio::test]
async fn test_caller_query_requires_token() {
    let app = TestApp::new();
    let token = app.register("Jane", "jane@email.com", "user").await;

    let anonymous = app.graphql(ME, json!({}), None).await;
    assert_eq!(error_message(&anonymous), Some("Not Authorised!"));

    let forged = app.graphql(ME, json!({}), Some("not.a.token")).await;
    assert_eq!(error_message(&forged), Some("Not Authorised!"));

    let body = app.graphql(ME, json!({}), Some(&token)).await;
    assert_eq!(body["data"]["user"]["email"], "jane@email.com");
    assert_eq!(body["data"]["user"]["isEmailConfirmed"], false);
}

// ============================================================================
// One-Time Codes
// ============================================================================

#[tokio::test]
async fn test_forgot_and_reset_password() {
    let app = TestApp::new();
    app.register("Jane", "jane@email.com", "user").await;

    let body = app
        .graphql(
            r"mutation($email: String!) { forgotPassword(email: $email) }",
            json!({"email": "jane@email.com"}),
            None,
        )
        .await;
    assert_eq!(body["data"]["forgotPassword"], "Email sent");

    let code = app.mailer.last_code().await.expect("code was mailed");
    let reset = r"mutation($email: String!, $password: String!, $token: String!) {
        resetPassword(email: $email, password: $password, token: $token) { email }
    }";

    let wrong_code = if code == "0000" { "1111" } else { "0000" };
    let body = app
        .graphql(
            reset,
            json!({"email": "jane@email.com", "password": "new-password", "token": wrong_code}),
            None,
        )
        .await;
    assert_eq!(error_message(&body), Some("Invalid reset password token"));

    let body = app
        .graphql(
            reset,
            json!({"email": "jane@email.com", "password": "new-password", "token": code}),
            None,
        )
        .await;
    assert!(body.get("errors").is_none(), "{body}");

    app.login("jane@email.com", "new-password").await;
}

#[tokio::test]
async fn test_forgot_password_for_unknown_email() {
    let app = TestApp::new();

    let body = app
        .graphql(
            r"mutation($email: String!) { forgotPassword(email: $email) }",
            json!({"email": "ghost@email.com"}),
            None,
        )
        .await;

    assert_eq!(error_code(&body), Some("NOT_FOUND"));
    assert!(app.mailer.sent().await.is_empty());
}

#[tokio::test]
async fn test_confirm_email() {
    let app = TestApp::new();
    let token = app.register("Jane", "jane@email.com", "user").await;

    let confirm = r"mutation($token: String!) { confirmEmail(token: $token) { isEmailConfirmed } }";

    let body = app.graphql(confirm, json!({"token": "1234"}), Some(&token)).await;
    assert_eq!(error_message(&body), Some("Confirm email token not found"));

    let body = app
        .graphql("mutation { sendConfirmEmailToken }", json!({}), Some(&token))
        .await;
    assert_eq!(body["data"]["sendConfirmEmailToken"], "Email sent");

    let code = app.mailer.last_code().await.expect("code was mailed");
    let body = app.graphql(confirm, json!({"token": code}), Some(&token)).await;
    assert_eq!(body["data"]["confirmEmail"]["isEmailConfirmed"], true);
}

// ============================================================================
// Profile
// ============================================================================

#[tokio::test]
async fn test_update_password_checks_current_password() {
    let app = TestApp::new();
    let token = app.register("Jane", "jane@email.com", "user").await;

    let update = r"mutation($current: String!, $new: String!) {
        updatePassword(currentPassword: $current, newPassword: $new) { id }
    }";

    let body = app
        .graphql(update, json!({"current": "wrong-one", "new": "another-password"}), Some(&token))
        .await;
    assert_eq!(error_message(&body), Some("Invalid credentials"));

    let body = app
        .graphql(update, json!({"current": "password", "new": "another-password"}), Some(&token))
        .await;
    assert!(body.get("errors").is_none(), "{body}");
    app.login("jane@email.com", "another-password").await;
}

#[tokio::test]
async fn test_update_and_delete_own_account() {
    let app = TestApp::new();
    let token = app.register("Jane", "jane@email.com", "user").await;

    let body = app
        .graphql(
            r#"mutation { updateUser(name: "Jane Roe") { name email } }"#,
            json!({}),
            Some(&token),
        )
        .await;
    assert_eq!(body["data"]["updateUser"]["name"], "Jane Roe");
    assert_eq!(body["data"]["updateUser"]["email"], "jane@email.com");

    let body = app
        .graphql("mutation { deleteUser { email } }", json!({}), Some(&token))
        .await;
    assert_eq!(body["data"]["deleteUser"]["email"], "jane@email.com");

    // The token still verifies but its subject is gone.
    let body = app.graphql(ME, json!({}), Some(&token)).await;
    assert_eq!(error_message(&body), Some("Not Authorised!"));
}
