use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use mailroom::domain::subscription::models::{
    email::SubscriberEmail, subscriber::SubscriberStatus,
};

use crate::helpers::spawn_app;

#[tokio::test]
async fn confirmations_without_token_are_rejected_with_a_400() {
    let app = spawn_app().await;

    let response = reqwest::get(&format!("{}/subscriptions/confirm", app.address))
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn the_link_returned_by_subscribe_confirms_the_subscriber() {
    let app = spawn_app().await;
    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    app.post_subscriptions("email=ursula%40domain.com".into())
        .await;
    let email_request = &app.email_server.received_requests().await.unwrap()[0];
    let links = app.get_confirmation_links(email_request);

    let response = reqwest::get(links.html).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["already_confirmed"], false);

    let email = SubscriberEmail::parse("ursula@domain.com".into()).unwrap();
    let saved = app.db.subscriber_with_email(&email).unwrap();
    assert_eq!(saved.status, SubscriberStatus::Confirmed);
    assert!(saved.confirmation_token.is_none());
    assert!(saved.confirmed_at.is_some());
}

#[tokio::test]
async fn confirming_sends_a_welcome_email() {
    let app = spawn_app().await;
    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&app.email_server)
        .await;

    app.subscribe_and_confirm("ursula@domain.com").await;
}

#[tokio::test]
async fn an_unknown_token_is_rejected_with_a_401() {
    let app = spawn_app().await;
    let token = "a".repeat(64);

    let response = app.get_confirm(&format!("token={}", token)).await;

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn a_malformed_token_is_rejected_with_a_401() {
    let app = spawn_app().await;

    let response = app.get_confirm("token=not-a-real-token").await;

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn a_confirmation_link_cannot_be_replayed_after_use() {
    let app = spawn_app().await;
    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    app.post_subscriptions("email=ursula%40domain.com".into())
        .await;
    let email_request = &app.email_server.received_requests().await.unwrap()[0];
    let links = app.get_confirmation_links(email_request);

    let first = reqwest::get(links.html.clone()).await.unwrap();
    assert_eq!(first.status().as_u16(), 200);

    // The token was retired on first use.
    let second = reqwest::get(links.html).await.unwrap();
    assert_eq!(second.status().as_u16(), 401);
}
