use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use mailroom::domain::subscription::models::{
    email::SubscriberEmail, subscriber::SubscriberStatus,
};

use crate::helpers::spawn_app;

#[tokio::test]
async fn unsubscribing_with_the_personal_token_works() {
    let app = spawn_app().await;
    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    app.subscribe_and_confirm("ursula@domain.com").await;
    let email = SubscriberEmail::parse("ursula@domain.com".into()).unwrap();
    let saved = app.db.subscriber_with_email(&email).unwrap();

    let response = app
        .get_unsubscribe(&format!("token={}", saved.unsubscribe_token.as_ref()))
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["already_unsubscribed"], false);

    let saved = app.db.subscriber_with_email(&email).unwrap();
    assert_eq!(saved.status, SubscriberStatus::Unsubscribed);
    assert!(saved.unsubscribed_at.is_some());
}

#[tokio::test]
async fn unsubscribing_twice_reports_the_repeat_without_failing() {
    let app = spawn_app().await;
    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    app.subscribe_and_confirm("ursula@domain.com").await;
    let email = SubscriberEmail::parse("ursula@domain.com".into()).unwrap();
    let token = app
        .db
        .subscriber_with_email(&email)
        .unwrap()
        .unsubscribe_token;

    let first = app
        .get_unsubscribe(&format!("token={}", token.as_ref()))
        .await;
    assert_eq!(first.status().as_u16(), 200);

    let second = app
        .get_unsubscribe(&format!("token={}", token.as_ref()))
        .await;
    assert_eq!(second.status().as_u16(), 200);
    let body: serde_json::Value = second.json().await.unwrap();
    assert_eq!(body["already_unsubscribed"], true);
}

#[tokio::test]
async fn unsubscribing_by_email_address_works() {
    let app = spawn_app().await;
    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    app.subscribe_and_confirm("ursula@domain.com").await;

    let response = app.get_unsubscribe("email=URSULA%40domain.com").await;
    assert_eq!(response.status().as_u16(), 200);

    let email = SubscriberEmail::parse("ursula@domain.com".into()).unwrap();
    let saved = app.db.subscriber_with_email(&email).unwrap();
    assert_eq!(saved.status, SubscriberStatus::Unsubscribed);
}

#[tokio::test]
async fn an_unknown_unsubscribe_token_is_a_404() {
    let app = spawn_app().await;

    let response = app
        .get_unsubscribe(&format!("token={}", "b".repeat(64)))
        .await;

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn unsubscribing_without_a_selector_is_a_400() {
    let app = spawn_app().await;

    let response = app.get_unsubscribe("").await;

    assert_eq!(response.status().as_u16(), 400);
}
