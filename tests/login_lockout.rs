//! End-to-end lockout behaviour over HTTP.

use chrono::{Duration, Utc};
use realty_auth::accounts::AccountStore;
use realty_auth::lockout::AccountSecurityState;

mod common;

const EMAIL: &str = "seller@example.com";
const PASSWORD: &str = "open sesame";

async fn security(server: &common::TestServer) -> AccountSecurityState {
    server
        .store
        .find_by_email(EMAIL)
        .await
        .unwrap()
        .expect("account exists")
        .security
}

#[tokio::test]
async fn test_five_failures_lock_the_account() {
    let server = common::start_server().await;
    common::register(&server, EMAIL, PASSWORD).await;

    for remaining in (1..=4).rev() {
        let (status, body) = common::login(&server, EMAIL, "wrong").await;
        assert_eq!(status, 401);
        assert_eq!(body["attempts_remaining"], remaining);
        assert_eq!(
            body["message"],
            format!("Invalid credentials. {remaining} attempt(s) remaining.")
        );
    }

    let (status, body) = common::login(&server, EMAIL, "wrong").await;
    assert_eq!(status, 403);
    assert_eq!(body["locked"], true);
    assert_eq!(body["remaining_minutes"], 15);
    assert_eq!(
        body["message"],
        "Account locked after 5 failed attempts. Try again in 15 minutes."
    );

    // The right password is refused while locked, and the counter does not move.
    let before = security(&server).await;
    let (status, body) = common::login(&server, EMAIL, PASSWORD).await;
    assert_eq!(status, 403);
    assert_eq!(body["locked"], true);
    assert!(body["remaining_minutes"].as_u64().unwrap() <= 15);
    assert!(body["remaining_seconds"].as_u64().unwrap() > 0);
    assert_eq!(security(&server).await, before);
    assert_eq!(before.failed_attempts, 5);
}

#[tokio::test]
async fn test_expired_lock_clears_on_next_login() {
    let server = common::start_server().await;
    common::register(&server, EMAIL, PASSWORD).await;

    let user = server.store.find_by_email(EMAIL).await.unwrap().unwrap();
    server
        .store
        .save_security(
            user.id,
            AccountSecurityState {
                failed_attempts: 5,
                locked_until: Some(Utc::now() - Duration::minutes(1)),
            },
        )
        .await
        .unwrap();

    let (status, body) = common::login(&server, EMAIL, PASSWORD).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Login successful");
    assert!(security(&server).await.is_clear());
}

#[tokio::test]
async fn test_expired_lock_then_wrong_password_restarts_count() {
    let server = common::start_server().await;
    common::register(&server, EMAIL, PASSWORD).await;

    let user = server.store.find_by_email(EMAIL).await.unwrap().unwrap();
    server
        .store
        .save_security(
            user.id,
            AccountSecurityState {
                failed_attempts: 5,
                locked_until: Some(Utc::now() - Duration::seconds(1)),
            },
        )
        .await
        .unwrap();

    let (status, body) = common::login(&server, EMAIL, "wrong").await;
    assert_eq!(status, 401);
    assert_eq!(body["attempts_remaining"], 4);
    assert_eq!(security(&server).await.failed_attempts, 1);
}

#[tokio::test]
async fn test_success_resets_failures_and_token_works() {
    let server = common::start_server().await;
    common::register(&server, EMAIL, PASSWORD).await;

    common::login(&server, EMAIL, "wrong").await;
    common::login(&server, EMAIL, "wrong").await;
    assert_eq!(security(&server).await.failed_attempts, 2);

    let (status, body) = common::login(&server, EMAIL, PASSWORD).await;
    assert_eq!(status, 200);
    assert!(security(&server).await.is_clear());

    let token = body["token"].as_str().unwrap();
    let res = common::client()
        .get(server.url("/auth/me"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let me: serde_json::Value = res.json().await.unwrap();
    assert_eq!(me["user"]["email"], EMAIL);
}

#[tokio::test]
async fn test_unknown_account_does_not_touch_guard() {
    let server = common::start_server().await;
    let (status, body) = common::login(&server, "nobody@example.com", "pw").await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let server = common::start_server().await;
    common::register(&server, EMAIL, PASSWORD).await;

    let res = common::client()
        .post(server.url("/auth/register"))
        .json(&serde_json::json!({ "name": "Again", "email": "Seller@Example.com", "password": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 409);
}
