use std::sync::Arc;

use once_cell::sync::Lazy;
use secrecy::ExposeSecret;
use wiremock::MockServer;

use mailroom::configuration::get_configuration;
use mailroom::domain::campaign::service::CampaignDispatcher;
use mailroom::domain::subscription::service::SubscriptionLifecycle;
use mailroom::inbound::http::Application;
use mailroom::outbound::db::memory_db::MemoryDb;
use mailroom::outbound::notifier::email_client::EmailClient;
use mailroom::outbound::telemetry::init_logger;

#[derive(Debug)]
pub struct ConfirmationLinks {
    pub html: reqwest::Url,
    pub plain_text: reqwest::Url,
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    /// Handle onto the same in-memory store the application uses.
    pub db: MemoryDb,
    pub email_server: MockServer,
    pub trigger_token: String,
}

impl TestApp {
    pub async fn post_subscriptions(&self, body: String) -> reqwest::Response {
        reqwest::Client::new()
            .post(&format!("{}/subscriptions", &self.address))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_confirm(&self, query: &str) -> reqwest::Response {
        reqwest::Client::new()
            .get(&format!("{}/subscriptions/confirm?{}", &self.address, query))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_unsubscribe(&self, query: &str) -> reqwest::Response {
        reqwest::Client::new()
            .get(&format!(
                "{}/subscriptions/unsubscribe?{}",
                &self.address, query
            ))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_dispatch(&self, trigger_token: Option<&str>) -> reqwest::Response {
        let mut request = reqwest::Client::new().post(&format!("{}/campaigns/dispatch", &self.address));
        if let Some(token) = trigger_token {
            request = request.header("X-Dispatch-Token", token);
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub fn get_confirmation_links(&self, email_request: &wiremock::Request) -> ConfirmationLinks {
        let body: serde_json::Value = serde_json::from_slice(&email_request.body).unwrap();
        let get_link = |s: &str| {
            let links: Vec<_> = linkify::LinkFinder::new()
                .links(s)
                .filter(|l| *l.kind() == linkify::LinkKind::Url)
                .collect();
            assert_eq!(links.len(), 1);
            let raw_link = links[0].as_str().to_owned();
            let mut confirmation_link = reqwest::Url::parse(&raw_link).unwrap();
            assert_eq!(confirmation_link.host_str().unwrap(), "127.0.0.1");
            confirmation_link.set_port(Some(self.port)).unwrap();
            confirmation_link
        };

        let html = get_link(body["HtmlBody"].as_str().unwrap());
        let plain_text = get_link(body["TextBody"].as_str().unwrap());
        ConfirmationLinks { html, plain_text }
    }

    /// Subscribes and follows the emailed confirmation link; the caller
    /// gets a confirmed subscriber on record.
    pub async fn subscribe_and_confirm(&self, email: &str) {
        self.post_subscriptions(format!("email={}", urlencoding(email)))
            .await
            .error_for_status()
            .expect("Subscription request failed.");

        let email_request = self
            .email_server
            .received_requests()
            .await
            .unwrap()
            .pop()
            .unwrap();
        let links = self.get_confirmation_links(&email_request);
        reqwest::get(links.html)
            .await
            .unwrap()
            .error_for_status()
            .expect("Confirmation request failed.");
    }
}

fn urlencoding(s: &str) -> String {
    s.replace('@', "%40").replace(' ', "%20")
}

static TRACING: Lazy<()> = Lazy::new(|| {
    let c = get_configuration().expect("Failed to read configuration");
    let default_filter_level = c.log_level();
    let subscriber_name = "test".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        init_logger(&subscriber_name, &default_filter_level, std::io::stdout);
    } else {
        init_logger(&subscriber_name, &default_filter_level, std::io::sink);
    }
});

pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);
    let email_server = MockServer::start().await;
    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration");
        c.application.port = 0;
        c.application.base_url = "http://127.0.0.1".to_string();
        c.email_client.base_url = email_server.uri();
        c
    };
    let trigger_token = configuration
        .application
        .trigger_token
        .expose_secret()
        .clone();

    let db = MemoryDb::new();
    let email_client = Arc::new(EmailClient::new(
        configuration.email_client,
        configuration.application.base_url.clone(),
    ));

    let subscription_service = SubscriptionLifecycle::new(
        Arc::new(db.clone()),
        Arc::new(db.clone()),
        Arc::clone(&email_client),
    );
    let dispatch_service = CampaignDispatcher::new(
        Arc::new(db.clone()),
        Arc::clone(&email_client),
        configuration.application.base_url.clone(),
        configuration.dispatch.clone(),
    );

    let application = Application::build(
        subscription_service,
        dispatch_service,
        configuration.application,
    )
    .await
    .expect("Failed to build application");
    let application_port = application.port();
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address: format!("http://localhost:{}", application_port),
        port: application_port,
        db,
        email_server,
        trigger_token,
    }
}
