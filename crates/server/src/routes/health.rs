use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use deployment::Deployment;
use utils::response::ApiResponse;

use crate::DeploymentImpl;

/// 503 while the database cannot answer a trivial query.
pub async fn health_check(
    State(deployment): State<DeploymentImpl>,
) -> (StatusCode, ResponseJson<ApiResponse<String>>) {
    match sqlx::query("SELECT 1")
        .execute(&deployment.db().pool)
        .await
    {
        Ok(_) => (
            StatusCode::OK,
            ResponseJson(ApiResponse::success("OK".to_string())),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ResponseJson(ApiResponse::error("Database unavailable")),
            )
        }
    }
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route("/health", get(health_check))
}
