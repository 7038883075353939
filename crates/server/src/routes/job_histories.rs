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
    graph::resolve_reference,
    models::{
        department::Department,
        employee::Employee,
        job::Job,
        job_history::{JobHistory, JobHistoryPayload, JobHistoryWithRelations},
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

const BASE_PATH: &str = "/api/job-histories";

type References = (Option<Job>, Option<Department>, Option<Employee>);

/// Load the job, department and employee named by the payload; fails before any write.
async fn resolve_references(
    pool: &SqlitePool,
    payload: &JobHistoryPayload,
) -> Result<References, ApiError> {
    Ok((
        resolve_reference::<Job>(pool, payload.job).await?,
        resolve_reference::<Department>(pool, payload.department).await?,
        resolve_reference::<Employee>(pool, payload.employee).await?,
    ))
}

pub async fn create_job_history(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<JobHistoryPayload>,
) -> Result<(StatusCode, HeaderMap, ResponseJson<ApiResponse<JobHistoryWithRelations>>), ApiError>
{
    debug!("REST request to save JobHistory : {:?}", payload);
    reject_identity::<JobHistory>(payload.identity())?;
    let pool = &deployment.db().pool;

    let (job, department, employee) = resolve_references(pool, &payload).await?;
    let job_history = JobHistory::create(pool, &payload).await?;
    let headers = created_headers::<JobHistory>(&deployment, BASE_PATH, job_history.id);
    Ok((
        StatusCode::CREATED,
        headers,
        ResponseJson(ApiResponse::success(JobHistoryWithRelations {
            job_history,
            job,
            department,
            employee,
        })),
    ))
}

pub async fn update_job_history(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<JobHistoryPayload>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<JobHistoryWithRelations>>), ApiError> {
    debug!("REST request to update JobHistory : {:?}", payload);
    let id = require_identity::<JobHistory>(payload.identity())?;
    let pool = &deployment.db().pool;

    let (job, department, employee) = resolve_references(pool, &payload).await?;
    let job_history = JobHistory::update(pool, id, &payload)
        .await?
        .ok_or_else(|| not_found::<JobHistory>(id))?;
    let headers = alert_headers::<JobHistory>(&deployment, EntityAction::Updated, id);
    Ok((
        headers,
        ResponseJson(ApiResponse::success(JobHistoryWithRelations {
            job_history,
            job,
            department,
            employee,
        })),
    ))
}

pub async fn get_job_histories(
    State(deployment): State<DeploymentImpl>,
    Query(pageable): Query<Pageable>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<Vec<JobHistoryWithRelations>>>), ApiError> {
    debug!("REST request to get a page of JobHistories");
    let request = page_request::<JobHistory>(&deployment, &pageable)?;
    let pool = &deployment.db().pool;

    let page = entity::find_page::<JobHistory>(pool, &request).await?;
    let headers = page_headers(BASE_PATH, &page);
    let histories = JobHistoryWithRelations::load_all(pool, page.content).await?;
    Ok((headers, ResponseJson(ApiResponse::success(histories))))
}

pub async fn get_job_history(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<JobHistoryWithRelations>>, ApiError> {
    debug!("REST request to get JobHistory : {}", id);
    let job_history = JobHistoryWithRelations::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| not_found::<JobHistory>(id))?;
    Ok(ResponseJson(ApiResponse::success(job_history)))
}

pub async fn delete_job_history(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<()>>), ApiError> {
    debug!("REST request to delete JobHistory : {}", id);
    if entity::delete::<_, JobHistory>(&deployment.db().pool, id).await? == 0 {
        return Err(not_found::<JobHistory>(id));
    }
    let headers = alert_headers::<JobHistory>(&deployment, EntityAction::Deleted, id);
    Ok((headers, ResponseJson(ApiResponse::success(()))))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route(
            "/job-histories",
            post(create_job_history)
                .put(update_job_history)
                .get(get_job_histories),
        )
        .route(
            "/job-histories/{id}",
            get(get_job_history).delete(delete_job_history),
        )
}
