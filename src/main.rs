mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod routes;
mod utils;

use actix_cors::Cors;
use actix_web::{http::header, App, HttpServer};
use config::AppConfig;
use db::Database;
use dotenv::dotenv;
use middleware::rate_limit::RateLimitMiddleware;
use routes::AppState;
use std::{env, io, time::Duration};
use tracing::{debug, error, info, warn};
use tracing_actix_web::TracingLogger;
use utils::auth::TokenService;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const LIMITER_PRUNE_INTERVAL: Duration = Duration::from_secs(300);

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::api::index,
        handlers::api::health,
        handlers::auth::issue_token,
        handlers::auth::logout,
        handlers::jobs::add_job,
        handlers::jobs::list_jobs,
        handlers::jobs::list_filtered_jobs,
        handlers::jobs::get_job,
        handlers::jobs::list_buyer_jobs,
        handlers::jobs::update_job,
        handlers::jobs::delete_job,
        handlers::bids::add_bid,
        handlers::bids::update_bid_status,
        handlers::bids::list_bids,
        handlers::bids::list_user_bids,
    ),
    components(
        schemas(
            handlers::api::HealthResponse,
            handlers::api::HealthChecks,
            models::results::InsertOneResult,
            models::results::UpdateResult,
            models::results::DeleteResult,
            models::results::SuccessResponse,
            models::bid::BidStatusUpdate,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and health endpoints"),
        (name = "Authentication", description = "Token cookie issuance and removal"),
        (name = "Jobs", description = "Job postings"),
        (name = "Bids", description = "Bids on job postings")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "token",
                    "JWT set by POST /jwt",
                ))),
            );
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load environment variables
    dotenv().ok();

    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .json()
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Invalid configuration");
        io::Error::other(e)
    })?;
    if config.uses_default_secret() {
        warn!("JWT_SECRET not set; using the development default");
    }

    let database = Database::open(&config.db_path).map_err(|e| {
        error!(error = %e, db_path = %config.db_path, "Failed to open database");
        io::Error::other(e)
    })?;
    info!(db_path = %config.db_path, "Database initialized");

    let state = AppState::new(database, TokenService::from_config(&config)).map_err(io::Error::other)?;
    let database = state.database.clone();
    let jwt_limiter = RateLimitMiddleware::new(config.jwt_rate_limit);
    let pruned_limiter = jwt_limiter.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(LIMITER_PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            let tracked = pruned_limiter.prune();
            debug!(tracked, "Pruned rate limiter state");
        }
    });
    let origins = config.cors_origins.clone();

    let bind_address = config.bind_address();
    info!(
        bind_address = %bind_address,
        production = config.production,
        token_ttl_days = config.token_ttl_days,
        "Starting taslix API server"
    );
    info!(
        swagger_url = %format!("http://{}/swagger-ui/", bind_address),
        "Swagger UI available"
    );

    HttpServer::new(move || {
        let cors = origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);

        let openapi = ApiDoc::openapi();

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
            .configure(|cfg| routes::configure(cfg, &state, jwt_limiter.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await?;

    info!("Server stopped; flushing database");
    database.close().await.map_err(io::Error::other)
}
