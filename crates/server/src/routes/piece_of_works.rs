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
    models::piece_of_work::{PieceOfWork, PieceOfWorkPayload},
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

const BASE_PATH: &str = "/api/piece-of-works";

pub async fn create_piece_of_work(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<PieceOfWorkPayload>,
) -> Result<(StatusCode, HeaderMap, ResponseJson<ApiResponse<PieceOfWork>>), ApiError> {
    debug!("REST request to save PieceOfWork : {:?}", payload);
    reject_identity::<PieceOfWork>(payload.identity())?;

    let piece_of_work = PieceOfWork::create(&deployment.db().pool, &payload).await?;
    let headers = created_headers::<PieceOfWork>(&deployment, BASE_PATH, piece_of_work.id);
    Ok((
        StatusCode::CREATED,
        headers,
        ResponseJson(ApiResponse::success(piece_of_work)),
    ))
}

pub async fn update_piece_of_work(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<PieceOfWorkPayload>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<PieceOfWork>>), ApiError> {
    debug!("REST request to update PieceOfWork : {:?}", payload);
    let id = require_identity::<PieceOfWork>(payload.identity())?;

    let piece_of_work = PieceOfWork::update(&deployment.db().pool, id, &payload)
        .await?
        .ok_or_else(|| not_found::<PieceOfWork>(id))?;
    let headers = alert_headers::<PieceOfWork>(&deployment, EntityAction::Updated, id);
    Ok((headers, ResponseJson(ApiResponse::success(piece_of_work))))
}

pub async fn get_piece_of_works(
    State(deployment): State<DeploymentImpl>,
    Query(pageable): Query<Pageable>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<Vec<PieceOfWork>>>), ApiError> {
    debug!("REST request to get a page of PieceOfWorks");
    let request = page_request::<PieceOfWork>(&deployment, &pageable)?;

    let page = entity::find_page::<PieceOfWork>(&deployment.db().pool, &request).await?;
    let headers = page_headers(BASE_PATH, &page);
    Ok((headers, ResponseJson(ApiResponse::success(page.content))))
}

pub async fn get_piece_of_work(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<PieceOfWork>>, ApiError> {
    debug!("REST request to get PieceOfWork : {}", id);
    let piece_of_work = entity::find_by_id::<PieceOfWork>(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| not_found::<PieceOfWork>(id))?;
    Ok(ResponseJson(ApiResponse::success(piece_of_work)))
}

/// Also drops the piece of work from every job's chores.
pub async fn delete_piece_of_work(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<()>>), ApiError> {
    debug!("REST request to delete PieceOfWork : {}", id);
    if entity::delete::<_, PieceOfWork>(&deployment.db().pool, id).await? == 0 {
        return Err(not_found::<PieceOfWork>(id));
    }
    let headers = alert_headers::<PieceOfWork>(&deployment, EntityAction::Deleted, id);
    Ok((headers, ResponseJson(ApiResponse::success(()))))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route(
            "/piece-of-works",
            post(create_piece_of_work)
                .put(update_piece_of_work)
                .get(get_piece_of_works),
        )
        .route(
            "/piece-of-works/{id}",
            get(get_piece_of_work).delete(delete_piece_of_work),
        )
}
