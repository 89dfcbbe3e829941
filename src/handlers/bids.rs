use crate::db::bid_repository::BidRepository;
use crate::db::job_repository::JobRepository;
use crate::error::AppError;
use crate::models::bid::{BidListQuery, BidStatusUpdate, NewBid};
use crate::models::claims::Claims;
use crate::utils::auth::ensure_owner;
use actix_web::{web, HttpResponse};
use tracing::{info, warn};

/// Place a bid on a job and bump the job's bid counter
///
/// One bid per bidder and job. The insert and the counter increment are two
/// separate writes: if the increment fails the bid stays stored and the error
/// is reported.
#[utoipa::path(
    post,
    path = "/add-bid",
    responses(
        (status = 200, description = "Bid stored", body = crate::models::results::InsertOneResult),
        (status = 400, description = "Missing `email` or `jobId`"),
        (status = 409, description = "Bidder already bid on this job", body = crate::error::ErrorResponse)
    ),
    tag = "Bids"
)]
pub async fn add_bid(
    bids: web::Data<BidRepository>,
    jobs: web::Data<JobRepository>,
    payload: web::Json<NewBid>,
) -> Result<HttpResponse, AppError> {
    let bid = payload.into_inner();

    if bids
        .find_by_bidder_and_job(&bid.email, &bid.job_id)
        .await?
        .is_some()
    {
        warn!(email = %bid.email, job_id = %bid.job_id, "Duplicate bid rejected");
        return Err(AppError::duplicate_bid());
    }

    let job_id = bid.job_id.clone();
    let result = bids.create(bid.into_document()).await?;

    let counted = jobs.increment_bid_count(&job_id).await?;
    if counted.matched_count == 0 {
        warn!(job_id = %job_id, bid_id = %result.inserted_id, "Bid placed on unknown job");
    }

    Ok(HttpResponse::Ok().json(result))
}

/// Set the status of a bid
#[utoipa::path(
    patch,
    path = "/bid-status-update/{id}",
    params(("id" = String, Path, description = "Bid id")),
    request_body = BidStatusUpdate,
    responses(
        (status = 200, description = "Update acknowledged", body = crate::models::results::UpdateResult),
        (status = 401, description = "No token cookie", body = crate::error::ErrorResponse),
        (status = 403, description = "Invalid or expired token", body = crate::error::ErrorResponse)
    ),
    security(("cookie_auth" = [])),
    tag = "Bids"
)]
pub async fn update_bid_status(
    claims: web::ReqData<Claims>,
    bids: web::Data<BidRepository>,
    path: web::Path<String>,
    payload: web::Json<BidStatusUpdate>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let result = bids.set_status(&id, &payload.status).await?;
    info!(bid_id = %id, by = ?claims.email(), "Bid status changed");
    Ok(HttpResponse::Ok().json(result))
}

/// List every bid
#[utoipa::path(
    get,
    path = "/bids",
    responses((status = 200, description = "All bids in natural order")),
    tag = "Bids"
)]
pub async fn list_bids(bids: web::Data<BidRepository>) -> Result<HttpResponse, AppError> {
    let all = bids.list_all().await?;
    Ok(HttpResponse::Ok().json(all))
}

/// List the caller's bids, or with `buyer` set, the bids on the caller's jobs
#[utoipa::path(
    get,
    path = "/bids/{email}",
    params(
        ("email" = String, Path, description = "Caller email; must match the token"),
        BidListQuery
    ),
    responses(
        (status = 200, description = "Matching bids"),
        (status = 401, description = "No token cookie, or token is for someone else", body = crate::error::ErrorResponse),
        (status = 403, description = "Invalid or expired token", body = crate::error::ErrorResponse)
    ),
    security(("cookie_auth" = [])),
    tag = "Bids"
)]
pub async fn list_user_bids(
    claims: web::ReqData<Claims>,
    bids: web::Data<BidRepository>,
    path: web::Path<String>,
    query: web::Query<BidListQuery>,
) -> Result<HttpResponse, AppError> {
    let email = path.into_inner();
    ensure_owner(&claims, &email)?;

    let matching = if query.as_buyer() {
        bids.list_by_buyer(&email).await?
    } else {
        bids.list_by_bidder(&email).await?
    };
    Ok(HttpResponse::Ok().json(matching))
}
