use crate::{
    domain::subscription::ports::{SubscriptionService, UnsubscribeRequest},
    inbound::http::{errors::AppError, state::SharedSubscriptionState},
};
use actix_web::{web, HttpResponse};

#[tracing::instrument(name = "Removing a subscriber", skip(req, state))]
pub async fn unsubscribe<SS: SubscriptionService>(
    req: web::Query<UnsubscribeRequest>,
    state: web::Data<SharedSubscriptionState<SS>>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    let outcome = state.subscription_service().unsubscribe(req).await?;
    Ok(HttpResponse::Ok().json(outcome))
}
