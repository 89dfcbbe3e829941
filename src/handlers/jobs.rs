use crate::db::collection::{Document, Filter};
use crate::db::job_repository::JobRepository;
use crate::error::AppError;
use crate::models::claims::Claims;
use crate::models::job::JobListQuery;
use crate::utils::auth::ensure_owner;
use actix_web::{web, HttpResponse};
use tracing::info;

/// Post a new job
#[utoipa::path(
    post,
    path = "/add-job",
    responses(
        (status = 200, description = "Job stored", body = crate::models::results::InsertOneResult),
        (status = 400, description = "Body is not a JSON object")
    ),
    tag = "Jobs"
)]
pub async fn add_job(
    jobs: web::Data<JobRepository>,
    payload: web::Json<Document>,
) -> Result<HttpResponse, AppError> {
    let result = jobs.create(payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// List every job
#[utoipa::path(
    get,
    path = "/jobs",
    responses((status = 200, description = "All jobs in natural order")),
    tag = "Jobs"
)]
pub async fn list_jobs(jobs: web::Data<JobRepository>) -> Result<HttpResponse, AppError> {
    let all = jobs.list(&Filter::new(), None).await?;
    Ok(HttpResponse::Ok().json(all))
}

/// List jobs matching a title search and category, optionally sorted by deadline
#[utoipa::path(
    get,
    path = "/all-jobs",
    params(JobListQuery),
    responses((status = 200, description = "Matching jobs")),
    tag = "Jobs"
)]
pub async fn list_filtered_jobs(
    jobs: web::Data<JobRepository>,
    query: web::Query<JobListQuery>,
) -> Result<HttpResponse, AppError> {
    let sort = query.sort();
    let matching = jobs.list(&query.filter(), sort.as_ref()).await?;
    Ok(HttpResponse::Ok().json(matching))
}

/// Fetch one job; the body is `null` when no job has this id
#[utoipa::path(
    get,
    path = "/job/{id}",
    params(("id" = String, Path, description = "Job id")),
    responses(
        (status = 200, description = "The job, or null"),
        (status = 401, description = "No token cookie", body = crate::error::ErrorResponse),
        (status = 403, description = "Invalid or expired token", body = crate::error::ErrorResponse)
    ),
    security(("cookie_auth" = [])),
    tag = "Jobs"
)]
pub async fn get_job(
    jobs: web::Data<JobRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let job = jobs.get_by_id(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(job))
}

/// List the jobs posted by the caller
#[utoipa::path(
    get,
    path = "/jobs/{email}",
    params(("email" = String, Path, description = "Buyer email; must match the token")),
    responses(
        (status = 200, description = "Jobs whose buyer is `email`"),
        (status = 401, description = "No token cookie, or token is for someone else", body = crate::error::ErrorResponse),
        (status = 403, description = "Invalid or expired token", body = crate::error::ErrorResponse)
    ),
    security(("cookie_auth" = [])),
    tag = "Jobs"
)]
pub async fn list_buyer_jobs(
    claims: web::ReqData<Claims>,
    jobs: web::Data<JobRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let email = path.into_inner();
    ensure_owner(&claims, &email)?;

    let posted = jobs.list_by_buyer(&email).await?;
    Ok(HttpResponse::Ok().json(posted))
}

/// Create or replace a job under the given id
#[utoipa::path(
    put,
    path = "/update-job/{id}",
    params(("id" = String, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job updated, or created when absent", body = crate::models::results::UpdateResult),
        (status = 401, description = "No token cookie", body = crate::error::ErrorResponse),
        (status = 403, description = "Invalid or expired token", body = crate::error::ErrorResponse)
    ),
    security(("cookie_auth" = [])),
    tag = "Jobs"
)]
pub async fn update_job(
    claims: web::ReqData<Claims>,
    jobs: web::Data<JobRepository>,
    path: web::Path<String>,
    payload: web::Json<Document>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let result = jobs.upsert(&id, payload.into_inner()).await?;
    info!(job_id = %id, by = ?claims.email(), "Job updated");
    Ok(HttpResponse::Ok().json(result))
}

/// Delete a job. Bids placed on it are left in place.
#[utoipa::path(
    delete,
    path = "/job/{id}",
    params(("id" = String, Path, description = "Job id")),
    responses(
        (status = 200, description = "Delete acknowledged", body = crate::models::results::DeleteResult),
        (status = 401, description = "No token cookie", body = crate::error::ErrorResponse),
        (status = 403, description = "Invalid or expired token", body = crate::error::ErrorResponse)
    ),
    security(("cookie_auth" = [])),
    tag = "Jobs"
)]
pub async fn delete_job(
    claims: web::ReqData<Claims>,
    jobs: web::Data<JobRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let result = jobs.delete(&id).await?;
    info!(job_id = %id, by = ?claims.email(), "Job deleted");
    Ok(HttpResponse::Ok().json(result))
}
