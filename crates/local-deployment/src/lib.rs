use std::sync::Arc;

use async_trait::async_trait;
use db::DBService;
use deployment::{Deployment, DeploymentError};
use services::services::{config::Config, database_validator::DatabaseValidator};
use tracing::{info, warn};

#[derive(Clone)]
pub struct LocalDeployment {
    config: Arc<Config>,
    db: DBService,
}

impl LocalDeployment {
    /// Wrap an already-open database, e.g. an in-memory one in tests.
    pub fn new_with(config: Config, db: DBService) -> Self {
        Self {
            config: Arc::new(config),
            db,
        }
    }
}

#[async_trait]
impl Deployment for LocalDeployment {
    async fn new() -> Result<Self, DeploymentError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                warn!("Ignoring unreadable .env file: {}", e);
            }
        }

        let config = Config::load()?;
        let db = DBService::new(&config.database_url).await?;

        let validation = DatabaseValidator::new(db.pool.clone()).ensure_ready().await?;
        info!("{}", validation.summary());

        Ok(Self::new_with(config, db))
    }

    fn config(&self) -> &Config {
        &self.config
    }

    fn db(&self) -> &DBService {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_with_shares_state_across_clones() {
        let db = DBService::new_in_memory().await.unwrap();
        let config = Config {
            app_name: "people".to_string(),
            ..Default::default()
        };
        let deployment = LocalDeployment::new_with(config, db);
        let clone = deployment.clone();

        assert_eq!(clone.config().app_name, "people");
        assert_ready(&deployment).await;
        assert_ready(&clone).await;
    }

    async fn assert_ready(deployment: &LocalDeployment) {
        let tables = DatabaseValidator::new(deployment.db().pool.clone())
            .validate()
            .await
            .unwrap();
        assert!(tables.is_ok());
    }
}
