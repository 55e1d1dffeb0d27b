use crate::{
    domain::subscription::{models::token::TokenRequest, ports::SubscriptionService},
    inbound::http::{errors::AppError, state::SharedSubscriptionState},
};
use actix_web::{web, HttpResponse};

#[tracing::instrument(name = "Confirm a pending subscriber", skip(req, state))]
pub async fn confirm<SS: SubscriptionService>(
    req: web::Query<TokenRequest>,
    state: web::Data<SharedSubscriptionState<SS>>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    let outcome = state.subscription_service().confirm(req).await?;
    Ok(HttpResponse::Ok().json(outcome))
}
