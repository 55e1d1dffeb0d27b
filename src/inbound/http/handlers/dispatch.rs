use crate::{
    domain::campaign::ports::DispatchService,
    inbound::http::{errors::AppError, state::SharedDispatchState},
};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use secrecy::ExposeSecret;

const TRIGGER_TOKEN_HEADER: &str = "X-Dispatch-Token";

fn authorize<DS: DispatchService>(
    request: &HttpRequest,
    state: &SharedDispatchState<DS>,
) -> Result<(), AppError> {
    let provided = request
        .headers()
        .get(TRIGGER_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::AuthError(format!("Missing the '{}' header", TRIGGER_TOKEN_HEADER))
        })?;

    if provided != state.trigger_token().expose_secret() {
        return Err(AppError::AuthError("Invalid dispatch trigger token".into()));
    }
    Ok(())
}

/// Runs one dispatch pass over every campaign currently due and reports
/// the per-campaign outcome. The caller (a cron hook, typically) is
/// authenticated with a shared secret before any work starts.
#[tracing::instrument(name = "Triggering a scheduled dispatch run", skip(request, state))]
pub async fn trigger_dispatch<DS: DispatchService>(
    request: HttpRequest,
    state: web::Data<SharedDispatchState<DS>>,
) -> Result<HttpResponse, AppError> {
    authorize(&request, &state)?;

    let report = state
        .dispatch_service()
        .run_scheduled_dispatch(Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(report))
}
