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
        department::{Department, DepartmentPayload, DepartmentWithLocation},
        location::Location,
    },
    pagination::Pageable,
};
use deployment::Deployment;
use tracing::debug;
use utils::{header_util::EntityAction, response::ApiResponse};

use super::{
    alert_headers, created_headers, not_found, page_headers, page_request, reject_identity,
    require_identity,
};
use crate::{DeploymentImpl, error::ApiError};

const BASE_PATH: &str = "/api/departments";

pub async fn create_department(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<DepartmentPayload>,
) -> Result<(StatusCode, HeaderMap, ResponseJson<ApiResponse<DepartmentWithLocation>>), ApiError> {
    debug!("REST request to save Department : {:?}", payload);
    reject_identity::<Department>(payload.identity())?;
    let pool = &deployment.db().pool;

    let location = resolve_reference::<Location>(pool, payload.location).await?;
    let department = Department::create(pool, &payload).await?;
    let headers = created_headers::<Department>(&deployment, BASE_PATH, department.id);
    Ok((
        StatusCode::CREATED,
        headers,
        ResponseJson(ApiResponse::success(DepartmentWithLocation {
            department,
            location,
        })),
    ))
}

pub async fn update_department(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<DepartmentPayload>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<DepartmentWithLocation>>), ApiError> {
    debug!("REST request to update Department : {:?}", payload);
    let id = require_identity::<Department>(payload.identity())?;
    let pool = &deployment.db().pool;

    let location = resolve_reference::<Location>(pool, payload.location).await?;
    let department = Department::update(pool, id, &payload)
        .await?
        .ok_or_else(|| not_found::<Department>(id))?;
    let headers = alert_headers::<Department>(&deployment, EntityAction::Updated, id);
    Ok((
        headers,
        ResponseJson(ApiResponse::success(DepartmentWithLocation {
            department,
            location,
        })),
    ))
}

pub async fn get_departments(
    State(deployment): State<DeploymentImpl>,
    Query(pageable): Query<Pageable>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<Vec<DepartmentWithLocation>>>), ApiError> {
    debug!("REST request to get a page of Departments");
    let request = page_request::<Department>(&deployment, &pageable)?;
    let pool = &deployment.db().pool;

    let page = entity::find_page::<Department>(pool, &request).await?;
    let headers = page_headers(BASE_PATH, &page);
    let departments = DepartmentWithLocation::load_all(pool, page.content).await?;
    Ok((headers, ResponseJson(ApiResponse::success(departments))))
}

pub async fn get_department(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<DepartmentWithLocation>>, ApiError> {
    debug!("REST request to get Department : {}", id);
    let department = DepartmentWithLocation::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| not_found::<Department>(id))?;
    Ok(ResponseJson(ApiResponse::success(department)))
}

pub async fn delete_department(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<()>>), ApiError> {
    debug!("REST request to delete Department : {}", id);
    if entity::delete::<_, Department>(&deployment.db().pool, id).await? == 0 {
        return Err(not_found::<Department>(id));
    }
    let headers = alert_headers::<Department>(&deployment, EntityAction::Deleted, id);
    Ok((headers, ResponseJson(ApiResponse::success(()))))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route(
            "/departments",
            post(create_department)
                .put(update_department)
                .get(get_departments),
        )
        .route(
            "/departments/{id}",
            get(get_department).delete(delete_department),
        )
}
