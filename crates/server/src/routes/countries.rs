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
        country::{Country, CountryPayload, CountryWithRegion},
        region::Region,
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

const BASE_PATH: &str = "/api/countries";

pub async fn create_country(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<CountryPayload>,
) -> Result<(StatusCode, HeaderMap, ResponseJson<ApiResponse<CountryWithRegion>>), ApiError> {
    debug!("REST request to save Country : {:?}", payload);
    reject_identity::<Country>(payload.identity())?;
    let pool = &deployment.db().pool;

    let region = resolve_reference::<Region>(pool, payload.region).await?;
    let country = Country::create(pool, &payload).await?;
    let headers = created_headers::<Country>(&deployment, BASE_PATH, country.id);
    Ok((
        StatusCode::CREATED,
        headers,
        ResponseJson(ApiResponse::success(CountryWithRegion { country, region })),
    ))
}

pub async fn update_country(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<CountryPayload>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<CountryWithRegion>>), ApiError> {
    debug!("REST request to update Country : {:?}", payload);
    let id = require_identity::<Country>(payload.identity())?;
    let pool = &deployment.db().pool;

    let region = resolve_reference::<Region>(pool, payload.region).await?;
    let country = Country::update(pool, id, &payload)
        .await?
        .ok_or_else(|| not_found::<Country>(id))?;
    let headers = alert_headers::<Country>(&deployment, EntityAction::Updated, id);
    Ok((
        headers,
        ResponseJson(ApiResponse::success(CountryWithRegion { country, region })),
    ))
}

pub async fn get_countries(
    State(deployment): State<DeploymentImpl>,
    Query(pageable): Query<Pageable>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<Vec<CountryWithRegion>>>), ApiError> {
    debug!("REST request to get a page of Countries");
    let request = page_request::<Country>(&deployment, &pageable)?;
    let pool = &deployment.db().pool;

    let page = entity::find_page::<Country>(pool, &request).await?;
    let headers = page_headers(BASE_PATH, &page);
    let countries = CountryWithRegion::load_all(pool, page.content).await?;
    Ok((headers, ResponseJson(ApiResponse::success(countries))))
}

pub async fn get_country(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<CountryWithRegion>>, ApiError> {
    debug!("REST request to get Country : {}", id);
    let country = CountryWithRegion::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| not_found::<Country>(id))?;
    Ok(ResponseJson(ApiResponse::success(country)))
}

pub async fn delete_country(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<()>>), ApiError> {
    debug!("REST request to delete Country : {}", id);
    if entity::delete::<_, Country>(&deployment.db().pool, id).await? == 0 {
        return Err(not_found::<Country>(id));
    }
    let headers = alert_headers::<Country>(&deployment, EntityAction::Deleted, id);
    Ok((headers, ResponseJson(ApiResponse::success(()))))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route(
            "/countries",
            post(create_country).put(update_country).get(get_countries),
        )
        .route("/countries/{id}", get(get_country).delete(delete_country))
}
