use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json as ResponseJson,
    routing::{get, post},
};
use axum_extra::extract::Query;
use db::{
    entity,
    graph::{resolve_reference, resolve_references},
    models::{
        employee::Employee,
        job::{Job, JobPayload, JobWithRelations},
        piece_of_work::PieceOfWork,
    },
    pagination::Pageable,
};
use deployment::Deployment;
use sqlx::SqlitePool;
use tracing::debug;
use utils::{header_util::EntityAction, response::ApiResponse};

use super::{
    alert_headers, created_headers, not_found, page_headers, page_request, reject_identity,
    require_identity,
};
use crate::{DeploymentImpl, error::ApiError};

const BASE_PATH: &str = "/api/jobs";

/// Turn the payload into a graph whose employee and chores are all known to exist.
async fn resolve_graph(pool: &SqlitePool, payload: JobPayload) -> Result<JobWithRelations, ApiError> {
    let employee = resolve_reference::<Employee>(pool, payload.employee).await?;
    let chores = resolve_references::<PieceOfWork>(pool, &payload.chores).await?;
    Ok(payload.into_graph(employee, chores))
}

pub async fn create_job(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<JobPayload>,
) -> Result<(StatusCode, HeaderMap, ResponseJson<ApiResponse<JobWithRelations>>), ApiError> {
    debug!("REST request to save Job : {:?}", payload);
    reject_identity::<Job>(payload.identity())?;
    let pool = &deployment.db().pool;

    let mut job = resolve_graph(pool, payload).await?;
    Job::insert_graph(pool, &mut job).await?;
    let headers = created_headers::<Job>(&deployment, BASE_PATH, job.id);
    Ok((StatusCode::CREATED, headers, ResponseJson(ApiResponse::success(job))))
}

/// Replaces the job's chores with exactly the ones in the payload.
pub async fn update_job(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<JobPayload>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<JobWithRelations>>), ApiError> {
    debug!("REST request to update Job : {:?}", payload);
    let id = require_identity::<Job>(payload.identity())?;
    let pool = &deployment.db().pool;

    let mut job = resolve_graph(pool, payload).await?;
    if !Job::update_graph(pool, &mut job).await? {
        return Err(not_found::<Job>(id));
    }
    let headers = alert_headers::<Job>(&deployment, EntityAction::Updated, id);
    Ok((headers, ResponseJson(ApiResponse::success(job))))
}

pub async fn get_jobs(
    State(deployment): State<DeploymentImpl>,
    Query(pageable): Query<Pageable>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<Vec<JobWithRelations>>>), ApiError> {
    debug!("REST request to get a page of Jobs");
    let request = page_request::<Job>(&deployment, &pageable)?;
    let pool = &deployment.db().pool;

    let page = entity::find_page::<Job>(pool, &request).await?;
    let headers = page_headers(BASE_PATH, &page);
    let jobs = JobWithRelations::load_all(pool, page.content).await?;
    Ok((headers, ResponseJson(ApiResponse::success(jobs))))
}

pub async fn get_job(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<JobWithRelations>>, ApiError> {
    debug!("REST request to get Job : {}", id);
    let job = JobWithRelations::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| not_found::<Job>(id))?;
    Ok(ResponseJson(ApiResponse::success(job)))
}

pub async fn delete_job(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<()>>), ApiError> {
    debug!("REST request to delete Job : {}", id);
    if entity::delete::<_, Job>(&deployment.db().pool, id).await? == 0 {
        return Err(not_found::<Job>(id));
    }
    let headers = alert_headers::<Job>(&deployment, EntityAction::Deleted, id);
    Ok((headers, ResponseJson(ApiResponse::success(()))))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route("/jobs", post(create_job).put(update_job).get(get_jobs))
        .route("/jobs/{id}", get(get_job).delete(delete_job))
}
