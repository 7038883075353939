use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use db::{graph::GraphError, pagination::PageableError};
use deployment::Deployment;
use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;
use utils::{header_util, response::ApiResponse};

use crate::DeploymentImpl;

/// Machine-readable half of an error body: which entity, and why.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    pub entity_name: String,
    pub error_key: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("A new {entity} cannot already have an ID")]
    IdExists { entity: &'static str },
    #[error("Invalid id")]
    IdNull { entity: &'static str },
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("Invalid sort for {entity}: {source}")]
    BadSort {
        entity: &'static str,
        source: PageableError,
    },
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    pub fn bad_sort(entity: &'static str) -> impl FnOnce(PageableError) -> Self {
        move |source| ApiError::BadSort { entity, source }
    }

    fn status_and_details(&self) -> (StatusCode, &'static str, &'static str) {
        match self {
            ApiError::IdExists { entity } => (StatusCode::BAD_REQUEST, *entity, "idexists"),
            ApiError::IdNull { entity } => (StatusCode::BAD_REQUEST, *entity, "idnull"),
            ApiError::NotFound { entity, .. } => (StatusCode::NOT_FOUND, *entity, "notfound"),
            ApiError::BadSort { entity, .. } => (StatusCode::BAD_REQUEST, *entity, "badsort"),
            ApiError::Graph(GraphError::MissingReference { entity, .. }) => {
                (StatusCode::BAD_REQUEST, *entity, "idnotfound")
            }
            ApiError::Graph(GraphError::Database(_)) | ApiError::Database(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "", "internal")
            }
        }
    }
}

/// Carried on error responses so [`failure_headers`] can add the alert headers,
/// which need the configured application name.
#[derive(Debug, Clone)]
struct FailureAlert {
    entity_name: &'static str,
    error_key: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, entity_name, error_key) = self.status_and_details();

        let message = if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            tracing::debug!(error_key, "Rejected request: {}", self);
            self.to_string()
        };

        let body = ApiResponse::<(), ErrorDetails>::error_with_data(
            &message,
            ErrorDetails {
                entity_name: entity_name.to_string(),
                error_key: error_key.to_string(),
            },
        );

        let mut response = (status, ResponseJson(body)).into_response();
        response.extensions_mut().insert(FailureAlert {
            entity_name,
            error_key,
        });
        response
    }
}

/// Middleware adding `X-{app}-error` / `X-{app}-params` to responses built from an [`ApiError`].
pub async fn failure_headers(
    State(deployment): State<DeploymentImpl>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    if let Some(alert) = response.extensions_mut().remove::<FailureAlert>() {
        let headers = header_util::failure_alert(
            &deployment.config().app_name,
            alert.entity_name,
            alert.error_key,
        );
        response.headers_mut().extend(headers);
    }
    response
}
