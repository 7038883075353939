use axum::{
    Router,
    http::{HeaderMap, HeaderValue, header::LOCATION},
    middleware::from_fn_with_state,
};
use db::{
    entity::Entity,
    pagination::{Page, PageRequest, Pageable},
};
use deployment::Deployment;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utils::header_util::{self, EntityAction};

use crate::{
    DeploymentImpl,
    error::{ApiError, failure_headers},
};

pub mod countries;
pub mod departments;
pub mod employees;
pub mod health;
pub mod job_histories;
pub mod jobs;
pub mod locations;
pub mod piece_of_works;
pub mod regions;

pub fn router(deployment: DeploymentImpl) -> Router {
    let api = Router::new()
        .merge(health::router(&deployment))
        .merge(regions::router(&deployment))
        .merge(countries::router(&deployment))
        .merge(locations::router(&deployment))
        .merge(departments::router(&deployment))
        .merge(employees::router(&deployment))
        .merge(jobs::router(&deployment))
        .merge(piece_of_works::router(&deployment))
        .merge(job_histories::router(&deployment))
        .layer(from_fn_with_state(deployment.clone(), failure_headers));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(deployment)
}

/// Create must not carry an identity.
pub(crate) fn reject_identity<T: Entity>(id: Option<i64>) -> Result<(), ApiError> {
    match id {
        Some(_) => Err(ApiError::IdExists { entity: T::NAME }),
        None => Ok(()),
    }
}

/// Update must carry one.
pub(crate) fn require_identity<T: Entity>(id: Option<i64>) -> Result<i64, ApiError> {
    id.ok_or(ApiError::IdNull { entity: T::NAME })
}

pub(crate) fn not_found<T: Entity>(id: i64) -> ApiError {
    ApiError::NotFound {
        entity: T::NAME,
        id,
    }
}

pub(crate) fn page_request<T: Entity>(
    deployment: &DeploymentImpl,
    pageable: &Pageable,
) -> Result<PageRequest, ApiError> {
    let config = deployment.config();
    pageable
        .resolve(T::SORTABLE, config.default_page_size, config.max_page_size)
        .map_err(ApiError::bad_sort(T::NAME))
}

pub(crate) fn page_headers<T>(base_path: &str, page: &Page<T>) -> HeaderMap {
    header_util::pagination(base_path, page.total_elements, page.page, page.size)
}

pub(crate) fn alert_headers<T: Entity>(
    deployment: &DeploymentImpl,
    action: EntityAction,
    id: i64,
) -> HeaderMap {
    header_util::entity_alert(
        &deployment.config().app_name,
        action,
        T::NAME,
        &id.to_string(),
    )
}

/// Alert headers plus `Location: {base_path}/{id}`.
pub(crate) fn created_headers<T: Entity>(
    deployment: &DeploymentImpl,
    base_path: &str,
    id: i64,
) -> HeaderMap {
    let mut headers = alert_headers::<T>(deployment, EntityAction::Created, id);
    if let Ok(location) = HeaderValue::from_str(&format!("{base_path}/{id}")) {
        headers.insert(LOCATION, location);
    }
    headers
}

#[cfg(test)]
mod tests {
    use db::models::region::Region;

    use super::*;

    #[test]
    fn test_identity_checks() {
        assert!(reject_identity::<Region>(None).is_ok());
        assert!(matches!(
            reject_identity::<Region>(Some(3)),
            Err(ApiError::IdExists { entity: "region" })
        ));
        assert_eq!(require_identity::<Region>(Some(3)).unwrap(), 3);
        assert!(matches!(
            require_identity::<Region>(None),
            Err(ApiError::IdNull { entity: "region" })
        ));
    }
}
