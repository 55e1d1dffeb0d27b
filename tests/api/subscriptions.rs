use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use mailroom::domain::subscription::models::{
    email::SubscriberEmail, subscriber::SubscriberStatus,
};

use crate::helpers::spawn_app;

#[tokio::test]
async fn subscribe_returns_a_200_for_valid_form_data() {
    let app = spawn_app().await;
    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app
        .post_subscriptions("name=le%20guin&email=ursula_le_guin%40gmail.com".into())
        .await;

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn subscribe_persists_a_pending_subscriber() {
    let app = spawn_app().await;
    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    app.post_subscriptions("name=le%20guin&email=ursula_le_guin%40gmail.com&source=footer".into())
        .await;

    let email = SubscriberEmail::parse("ursula_le_guin@gmail.com".into()).unwrap();
    let saved = app.db.subscriber_with_email(&email).unwrap();
    assert_eq!(saved.status, SubscriberStatus::Pending);
    assert!(saved.confirmation_token.is_some());
    assert_eq!(saved.source.as_deref(), Some("footer"));
}

#[tokio::test]
async fn the_stored_email_is_trimmed_and_lower_cased() {
    let app = spawn_app().await;
    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    app.post_subscriptions("email=%20Ursula_Le_Guin%40GMAIL.com%20".into())
        .await;

    let email = SubscriberEmail::parse("ursula_le_guin@gmail.com".into()).unwrap();
    assert!(app.db.subscriber_with_email(&email).is_some());
}

#[tokio::test]
async fn subscribe_returns_a_400_when_data_is_missing() {
    let app = spawn_app().await;
    let test_cases = vec![
        ("name=le%20guin", "missing the email"),
        ("", "missing everything"),
    ];

    for (invalid_body, error_message) in test_cases {
        let response = app.post_subscriptions(invalid_body.into()).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            error_message
        );
    }
}

#[tokio::test]
async fn subscribe_returns_a_400_when_fields_are_present_but_invalid() {
    let app = spawn_app().await;
    let test_cases = vec![
        ("name=Ursula&email=", "empty email"),
        ("name=Ursula&email=definitely-not-an-email", "invalid email"),
        ("name=%3CUrsula%3E&email=ursula%40domain.com", "forbidden name characters"),
    ];

    for (body, description) in test_cases {
        let response = app.post_subscriptions(body.into()).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not return a 400 when the payload was {}.",
            description
        );
    }
}

#[tokio::test]
async fn subscribing_twice_while_pending_is_a_409_without_a_second_email() {
    let app = spawn_app().await;
    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let first = app
        .post_subscriptions("email=ursula%40domain.com".into())
        .await;
    assert_eq!(200, first.status().as_u16());

    let second = app
        .post_subscriptions("email=URSULA%40domain.com".into())
        .await;
    assert_eq!(409, second.status().as_u16());
}

#[tokio::test]
async fn subscribing_an_already_confirmed_email_is_a_409() {
    let app = spawn_app().await;
    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    app.subscribe_and_confirm("ursula@domain.com").await;

    let response = app
        .post_subscriptions("email=ursula%40domain.com".into())
        .await;
    assert_eq!(409, response.status().as_u16());
}

#[tokio::test]
async fn subscribe_fails_with_a_500_if_the_confirmation_email_cannot_be_sent() {
    let app = spawn_app().await;
    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app
        .post_subscriptions("email=ursula%40domain.com".into())
        .await;

    assert_eq!(500, response.status().as_u16());
}
