use crate::error::AppError;
use crate::models::claims::IdentityClaim;
use crate::models::results::SuccessResponse;
use crate::utils::auth::TokenService;
use actix_web::{web, HttpResponse};
use tracing::info;

/// Issue a token for the supplied identity and set it as the `token` cookie
///
/// The identity is taken as asserted by the client; no credential is checked.
#[utoipa::path(
    post,
    path = "/jwt",
    responses(
        (status = 200, description = "Token cookie set", body = SuccessResponse),
        (status = 400, description = "Body is not a JSON object"),
        (status = 429, description = "Too many token requests", body = crate::error::ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn issue_token(
    tokens: web::Data<TokenService>,
    payload: web::Json<IdentityClaim>,
) -> Result<HttpResponse, AppError> {
    let identity = payload.into_inner();
    let email = identity.email.clone().unwrap_or_default();

    let token = tokens.issue(identity, chrono::Utc::now())?;
    info!(email = %email, "Token issued");

    Ok(HttpResponse::Ok()
        .cookie(tokens.cookie(token))
        .json(SuccessResponse { success: true }))
}

/// Clear the token cookie
#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 200, description = "Token cookie cleared", body = SuccessResponse)
    ),
    tag = "Authentication"
)]
pub async fn logout(tokens: web::Data<TokenService>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(tokens.removal_cookie())
        .json(SuccessResponse { success: true })
}
