use crate::db::bid_repository::BidRepository;
use crate::db::job_repository::JobRepository;
use crate::db::{Database, StoreError};
use crate::handlers::{api, auth, bids, jobs};
use crate::middleware::auth::AuthMiddleware;
use crate::middleware::rate_limit::RateLimitMiddleware;
use crate::utils::auth::TokenService;
use actix_web::web;

/// Handles shared by every worker, registered as app data.
#[derive(Clone)]
pub struct AppState {
    pub database: web::Data<Database>,
    pub jobs: web::Data<JobRepository>,
    pub bids: web::Data<BidRepository>,
    pub tokens: web::Data<TokenService>,
}

impl AppState {
    pub fn new(database: Database, tokens: TokenService) -> Result<Self, StoreError> {
        Ok(AppState {
            jobs: web::Data::new(JobRepository::new(&database)?),
            bids: web::Data::new(BidRepository::new(&database)?),
            database: web::Data::new(database),
            tokens: web::Data::new(tokens),
        })
    }
}

pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState, jwt_limiter: RateLimitMiddleware) {
    cfg.app_data(state.database.clone())
        .app_data(state.jobs.clone())
        .app_data(state.bids.clone())
        .app_data(state.tokens.clone())
        // Public routes
        .route("/", web::get().to(api::index))
        .route("/health", web::get().to(api::health))
        .service(
            web::resource("/jwt")
                .wrap(jwt_limiter)
                .route(web::post().to(auth::issue_token)),
        )
        .route("/logout", web::get().to(auth::logout))
        .route("/add-job", web::post().to(jobs::add_job))
        .route("/jobs", web::get().to(jobs::list_jobs))
        .route("/all-jobs", web::get().to(jobs::list_filtered_jobs))
        .route("/add-bid", web::post().to(bids::add_bid))
        .route("/bids", web::get().to(bids::list_bids))
        // Token-protected routes
        .service(
            web::resource("/job/{id}")
                .wrap(AuthMiddleware)
                .route(web::get().to(jobs::get_job))
                .route(web::delete().to(jobs::delete_job)),
        )
        .service(
            web::resource("/jobs/{email}")
                .wrap(AuthMiddleware)
                .route(web::get().to(jobs::list_buyer_jobs)),
        )
        .service(
            web::resource("/update-job/{id}")
                .wrap(AuthMiddleware)
                .route(web::put().to(jobs::update_job)),
        )
        .service(
            web::resource("/bid-status-update/{id}")
                .wrap(AuthMiddleware)
                .route(web::patch().to(bids::update_bid_status)),
        )
        .service(
            web::resource("/bids/{email}")
                .wrap(AuthMiddleware)
                .route(web::get().to(bids::list_user_bids)),
        );
}
