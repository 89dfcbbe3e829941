use crate::db::Database;
use crate::utils::auth::TokenService;
use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Serialize, ToSchema)]
pub struct HealthChecks {
    pub jwt_uses_default: bool,
    pub store_ok: bool,
}

/// Plain-text greeting
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Server is up", body = String)),
    tag = "Health"
)]
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hello from taslix Server....")
}

/// Health check with dependency checks
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is degraded", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health(
    database: web::Data<Database>,
    tokens: web::Data<TokenService>,
) -> impl Responder {
    let jwt_uses_default = tokens.uses_default_secret();
    let store_ok = database.is_healthy();

    if jwt_uses_default {
        warn!("Health check: Using default JWT secret - NOT SECURE FOR PRODUCTION");
    }
    if !store_ok {
        warn!("Health check: document store unavailable");
    }

    let healthy = store_ok && !jwt_uses_default;
    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            jwt_uses_default,
            store_ok,
        },
    };

    if healthy {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
