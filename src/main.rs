use std::sync::Arc;

use mailroom::configuration::get_configuration;
use mailroom::domain::campaign::service::CampaignDispatcher;
use mailroom::domain::subscription::service::SubscriptionLifecycle;
use mailroom::inbound::http::Application;
use mailroom::outbound::db::postgres_db::PostgresDb;
use mailroom::outbound::notifier::email_client::EmailClient;
use mailroom::outbound::telemetry::init_logger;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let configuration = get_configuration().expect("Failed to read configuration");
    init_logger("mailroom", &configuration.log_level(), std::io::stdout);

    let db = Arc::new(PostgresDb::new(&configuration.database));
    let email_client = Arc::new(EmailClient::new(
        configuration.email_client,
        configuration.application.base_url.clone(),
    ));

    let subscription_service =
        SubscriptionLifecycle::new(Arc::clone(&db), Arc::clone(&db), Arc::clone(&email_client));
    let dispatch_service = CampaignDispatcher::new(
        Arc::clone(&db),
        Arc::clone(&email_client),
        configuration.application.base_url.clone(),
        configuration.dispatch.clone(),
    );

    let application =
        Application::build(subscription_service, dispatch_service, configuration.application)
            .await?;
    application.run_until_stopped().await?;
    Ok(())
}
