use crate::configuration::ApplicationSettings;
use crate::domain::campaign::ports::DispatchService;
use crate::domain::subscription::ports::SubscriptionService;
use crate::inbound::http::handlers::{
    confirm, health_check, subscribe, trigger_dispatch, unsubscribe,
};
use crate::inbound::http::state::{SharedDispatchState, SharedSubscriptionState};
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

mod errors;
mod handlers;
pub mod state;

pub use errors::AppError;

pub struct Application<SS, DS>
where
    SS: SubscriptionService,
    DS: DispatchService,
{
    port: u16,
    server: Server,
    subscription_state: SharedSubscriptionState<SS>,
    dispatch_state: SharedDispatchState<DS>,
}

fn run<SS: SubscriptionService, DS: DispatchService>(
    listener: TcpListener,
    subscription_state: SharedSubscriptionState<SS>,
    dispatch_state: SharedDispatchState<DS>,
) -> Result<Server, std::io::Error> {
    let subscription_state = web::Data::new(subscription_state);
    let dispatch_state = web::Data::new(dispatch_state);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .app_data(subscription_state.clone())
            .route("/subscriptions", web::post().to(subscribe::<SS>))
            .route("/subscriptions/confirm", web::get().to(confirm::<SS>))
            .route(
                "/subscriptions/unsubscribe",
                web::get().to(unsubscribe::<SS>),
            )
            .app_data(dispatch_state.clone())
            .route("/campaigns/dispatch", web::post().to(trigger_dispatch::<DS>))
    })
    .listen(listener)?
    .run();

    Ok(server)
}

impl<SS, DS> Application<SS, DS>
where
    SS: SubscriptionService,
    DS: DispatchService,
{
    pub async fn build(
        subscription_service: SS,
        dispatch_service: DS,
        configuration: ApplicationSettings,
    ) -> Result<Self, std::io::Error> {
        let address = format!("{}:{}", configuration.host, configuration.port);
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let subscription_state = SharedSubscriptionState::new(subscription_service);
        let dispatch_state =
            SharedDispatchState::new(dispatch_service, configuration.trigger_token);

        let server = run(
            listener,
            subscription_state.clone(),
            dispatch_state.clone(),
        )?;

        Ok(Self {
            port,
            server,
            subscription_state,
            dispatch_state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn subscription_state(&self) -> SharedSubscriptionState<SS> {
        self.subscription_state.clone()
    }

    pub fn dispatch_state(&self) -> SharedDispatchState<DS> {
        self.dispatch_state.clone()
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}
