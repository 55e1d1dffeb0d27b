use chrono::{Duration, Utc};
use uuid::Uuid;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

use mailroom::domain::campaign::models::campaign::{Campaign, CampaignStatus};

use crate::helpers::{spawn_app, TestApp};

fn due_campaign() -> Campaign {
    Campaign {
        id: Uuid::new_v4(),
        status: CampaignStatus::Scheduled,
        subject: "Issue #1".try_into().unwrap(),
        content_html: "<p>News</p>".try_into().unwrap(),
        content_text: "News".try_into().unwrap(),
        scheduled_at: Some(Utc::now() - Duration::minutes(5)),
        sent_at: None,
        sent_to_count: None,
    }
}

async fn mount_provider(app: &TestApp) {
    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;
}

#[tokio::test]
async fn dispatch_without_the_trigger_header_is_a_401() {
    let app = spawn_app().await;

    let response = app.post_dispatch(None).await;

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn dispatch_with_the_wrong_trigger_token_is_a_401() {
    let app = spawn_app().await;

    let response = app.post_dispatch(Some("definitely-wrong")).await;

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn a_run_with_nothing_due_returns_an_empty_report() {
    let app = spawn_app().await;

    let response = app.post_dispatch(Some(app.trigger_token.as_str())).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["outcomes"], serde_json::json!([]));
}

#[tokio::test]
async fn a_due_campaign_is_delivered_to_confirmed_subscribers_only() {
    let app = spawn_app().await;
    mount_provider(&app).await;

    app.subscribe_and_confirm("confirmed@domain.com").await;
    // A pending subscriber must not receive the campaign.
    app.post_subscriptions("email=pending%40domain.com".into())
        .await;

    let campaign = due_campaign();
    app.db.seed_campaign(campaign.clone());
    let requests_before = app.email_server.received_requests().await.unwrap().len();

    let response = app.post_dispatch(Some(app.trigger_token.as_str())).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["outcomes"][0]["status"], "completed");
    assert_eq!(body["outcomes"][0]["sent"], 1);
    assert_eq!(body["outcomes"][0]["failed"], 0);

    let finalized = app.db.campaign(campaign.id).unwrap();
    assert_eq!(finalized.status, CampaignStatus::Sent);
    assert_eq!(finalized.sent_to_count, Some(1));

    let requests = app.email_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), requests_before + 1);
    let delivered: serde_json::Value =
        serde_json::from_slice(&requests.last().unwrap().body).unwrap();
    assert_eq!(delivered["To"], "confirmed@domain.com");
    assert!(delivered["HtmlBody"]
        .as_str()
        .unwrap()
        .contains("/subscriptions/unsubscribe?token="));
}

#[tokio::test]
async fn one_failing_recipient_does_not_stop_the_campaign() {
    let app = spawn_app().await;
    mount_provider(&app).await;

    app.subscribe_and_confirm("healthy@domain.com").await;
    app.subscribe_and_confirm("broken@domain.com").await;

    // From here on the provider rejects one mailbox and accepts the rest.
    app.email_server.reset().await;
    Mock::given(path("/email"))
        .and(method("POST"))
        .and(body_string_contains("broken@domain.com"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.email_server)
        .await;
    mount_provider(&app).await;

    let campaign = due_campaign();
    app.db.seed_campaign(campaign.clone());

    let response = app.post_dispatch(Some(app.trigger_token.as_str())).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["outcomes"][0]["status"], "completed");
    assert_eq!(body["outcomes"][0]["sent"], 1);
    assert_eq!(body["outcomes"][0]["failed"], 1);

    let finalized = app.db.campaign(campaign.id).unwrap();
    assert_eq!(finalized.status, CampaignStatus::Sent);
    assert_eq!(finalized.sent_to_count, Some(1));
    assert_eq!(app.db.sends_for(campaign.id).len(), 2);
}

#[tokio::test]
async fn a_second_trigger_finds_nothing_left_to_send() {
    let app = spawn_app().await;
    mount_provider(&app).await;

    app.subscribe_and_confirm("confirmed@domain.com").await;
    app.db.seed_campaign(due_campaign());

    let first = app.post_dispatch(Some(app.trigger_token.as_str())).await;
    assert_eq!(first.status().as_u16(), 200);

    let second = app.post_dispatch(Some(app.trigger_token.as_str())).await;
    let body: serde_json::Value = second.json().await.unwrap();
    assert_eq!(body["outcomes"], serde_json::json!([]));
}
