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
        employee::{Employee, EmployeePayload, EmployeeWithRelations},
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

const BASE_PATH: &str = "/api/employees";

/// Fail before writing if the manager or department does not exist.
async fn check_references(pool: &SqlitePool, payload: &EmployeePayload) -> Result<(), ApiError> {
    resolve_reference::<Employee>(pool, payload.manager).await?;
    resolve_reference::<Department>(pool, payload.department).await?;
    Ok(())
}

async fn load(pool: &SqlitePool, id: i64) -> Result<EmployeeWithRelations, ApiError> {
    EmployeeWithRelations::find_by_id(pool, id)
        .await?
        .ok_or_else(|| not_found::<Employee>(id))
}

pub async fn create_employee(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<EmployeePayload>,
) -> Result<(StatusCode, HeaderMap, ResponseJson<ApiResponse<EmployeeWithRelations>>), ApiError> {
    debug!("REST request to save Employee : {:?}", payload);
    reject_identity::<Employee>(payload.identity())?;
    let pool = &deployment.db().pool;

    check_references(pool, &payload).await?;
    let employee = Employee::create(pool, &payload).await?;
    let headers = created_headers::<Employee>(&deployment, BASE_PATH, employee.id);
    let employee = load(pool, employee.id).await?;
    Ok((
        StatusCode::CREATED,
        headers,
        ResponseJson(ApiResponse::success(employee)),
    ))
}

pub async fn update_employee(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<EmployeePayload>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<EmployeeWithRelations>>), ApiError> {
    debug!("REST request to update Employee : {:?}", payload);
    let id = require_identity::<Employee>(payload.identity())?;
    let pool = &deployment.db().pool;

    check_references(pool, &payload).await?;
    Employee::update(pool, id, &payload)
        .await?
        .ok_or_else(|| not_found::<Employee>(id))?;
    let headers = alert_headers::<Employee>(&deployment, EntityAction::Updated, id);
    let employee = load(pool, id).await?;
    Ok((headers, ResponseJson(ApiResponse::success(employee))))
}

pub async fn get_employees(
    State(deployment): State<DeploymentImpl>,
    Query(pageable): Query<Pageable>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<Vec<EmployeeWithRelations>>>), ApiError> {
    debug!("REST request to get a page of Employees");
    let request = page_request::<Employee>(&deployment, &pageable)?;
    let pool = &deployment.db().pool;

    let page = entity::find_page::<Employee>(pool, &request).await?;
    let headers = page_headers(BASE_PATH, &page);
    let employees = EmployeeWithRelations::load_all(pool, page.content).await?;
    Ok((headers, ResponseJson(ApiResponse::success(employees))))
}

pub async fn get_employee(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<EmployeeWithRelations>>, ApiError> {
    debug!("REST request to get Employee : {}", id);
    let employee = load(&deployment.db().pool, id).await?;
    Ok(ResponseJson(ApiResponse::success(employee)))
}

/// Reports, jobs and job history entries keep their rows with the reference cleared.
pub async fn delete_employee(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<()>>), ApiError> {
    debug!("REST request to delete Employee : {}", id);
    if entity::delete::<_, Employee>(&deployment.db().pool, id).await? == 0 {
        return Err(not_found::<Employee>(id));
    }
    let headers = alert_headers::<Employee>(&deployment, EntityAction::Deleted, id);
    Ok((headers, ResponseJson(ApiResponse::success(()))))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route(
            "/employees",
            post(create_employee).put(update_employee).get(get_employees),
        )
        .route("/employees/{id}", get(get_employee).delete(delete_employee))
}
