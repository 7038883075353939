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
    models::region::{Region, RegionPayload},
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

const BASE_PATH: &str = "/api/regions";

pub async fn create_region(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<RegionPayload>,
) -> Result<(StatusCode, HeaderMap, ResponseJson<ApiResponse<Region>>), ApiError> {
    debug!("REST request to save Region : {:?}", payload);
    reject_identity::<Region>(payload.identity())?;

    let region = Region::create(&deployment.db().pool, &payload).await?;
    let headers = created_headers::<Region>(&deployment, BASE_PATH, region.id);
    Ok((StatusCode::CREATED, headers, ResponseJson(ApiResponse::success(region))))
}

pub async fn update_region(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<RegionPayload>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<Region>>), ApiError> {
    debug!("REST request to update Region : {:?}", payload);
    let id = require_identity::<Region>(payload.identity())?;

    let region = Region::update(&deployment.db().pool, id, &payload)
        .await?
        .ok_or_else(|| not_found::<Region>(id))?;
    let headers = alert_headers::<Region>(&deployment, EntityAction::Updated, id);
    Ok((headers, ResponseJson(ApiResponse::success(region))))
}

pub async fn get_regions(
    State(deployment): State<DeploymentImpl>,
    Query(pageable): Query<Pageable>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<Vec<Region>>>), ApiError> {
    debug!("REST request to get a page of Regions");
    let request = page_request::<Region>(&deployment, &pageable)?;

    let page = entity::find_page::<Region>(&deployment.db().pool, &request).await?;
    let headers = page_headers(BASE_PATH, &page);
    Ok((headers, ResponseJson(ApiResponse::success(page.content))))
}

pub async fn get_region(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Region>>, ApiError> {
    debug!("REST request to get Region : {}", id);
    let region = entity::find_by_id::<Region>(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| not_found::<Region>(id))?;
    Ok(ResponseJson(ApiResponse::success(region)))
}

pub async fn delete_region(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<()>>), ApiError> {
    debug!("REST request to delete Region : {}", id);
    if entity::delete::<_, Region>(&deployment.db().pool, id).await? == 0 {
        return Err(not_found::<Region>(id));
    }
    let headers = alert_headers::<Region>(&deployment, EntityAction::Deleted, id);
    Ok((headers, ResponseJson(ApiResponse::success(()))))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route(
            "/regions",
            post(create_region).put(update_region).get(get_regions),
        )
        .route("/regions/{id}", get(get_region).delete(delete_region))
}
