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
        country::Country,
        location::{Location, LocationPayload, LocationWithCountry},
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

const BASE_PATH: &str = "/api/locations";

pub async fn create_location(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<LocationPayload>,
) -> Result<(StatusCode, HeaderMap, ResponseJson<ApiResponse<LocationWithCountry>>), ApiError> {
    debug!("REST request to save Location : {:?}", payload);
    reject_identity::<Location>(payload.identity())?;
    let pool = &deployment.db().pool;

    let country = resolve_reference::<Country>(pool, payload.country).await?;
    let location = Location::create(pool, &payload).await?;
    let headers = created_headers::<Location>(&deployment, BASE_PATH, location.id);
    Ok((
        StatusCode::CREATED,
        headers,
        ResponseJson(ApiResponse::success(LocationWithCountry { location, country })),
    ))
}

pub async fn update_location(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<LocationPayload>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<LocationWithCountry>>), ApiError> {
    debug!("REST request to update Location : {:?}", payload);
    let id = require_identity::<Location>(payload.identity())?;
    let pool = &deployment.db().pool;

    let country = resolve_reference::<Country>(pool, payload.country).await?;
    let location = Location::update(pool, id, &payload)
        .await?
        .ok_or_else(|| not_found::<Location>(id))?;
    let headers = alert_headers::<Location>(&deployment, EntityAction::Updated, id);
    Ok((
        headers,
        ResponseJson(ApiResponse::success(LocationWithCountry { location, country })),
    ))
}

pub async fn get_locations(
    State(deployment): State<DeploymentImpl>,
    Query(pageable): Query<Pageable>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<Vec<LocationWithCountry>>>), ApiError> {
    debug!("REST request to get a page of Locations");
    let request = page_request::<Location>(&deployment, &pageable)?;
    let pool = &deployment.db().pool;

    let page = entity::find_page::<Location>(pool, &request).await?;
    let headers = page_headers(BASE_PATH, &page);
    let locations = LocationWithCountry::load_all(pool, page.content).await?;
    Ok((headers, ResponseJson(ApiResponse::success(locations))))
}

pub async fn get_location(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<LocationWithCountry>>, ApiError> {
    debug!("REST request to get Location : {}", id);
    let location = LocationWithCountry::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| not_found::<Location>(id))?;
    Ok(ResponseJson(ApiResponse::success(location)))
}

pub async fn delete_location(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<()>>), ApiError> {
    debug!("REST request to delete Location : {}", id);
    if entity::delete::<_, Location>(&deployment.db().pool, id).await? == 0 {
        return Err(not_found::<Location>(id));
    }
    let headers = alert_headers::<Location>(&deployment, EntityAction::Deleted, id);
    Ok((headers, ResponseJson(ApiResponse::success(()))))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route(
            "/locations",
            post(create_location).put(update_location).get(get_locations),
        )
        .route("/locations/{id}", get(get_location).delete(delete_location))
}
