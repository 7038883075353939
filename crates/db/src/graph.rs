//! Reference fix-ups applied to an incoming entity graph before it is saved.
//!
//! Payloads point at related rows by key only. Each reference is loaded here so
//! a dangling key is reported as a client error instead of a foreign key failure
//! halfway through a write.

use sqlx::SqlitePool;
use thiserror::Error;

use crate::entity::{self, Entity, EntityRef};

#[derive(Debug, Error)]
pub enum GraphError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("{entity} {id} does not exist")]
    MissingReference { entity: &'static str, id: i64 },
}

/// Load the entity behind an optional reference.
pub async fn resolve_reference<T: Entity>(
    pool: &SqlitePool,
    reference: Option<EntityRef>,
) -> Result<Option<T>, GraphError> {
    let Some(EntityRef { id }) = reference else {
        return Ok(None);
    };
    entity::find_by_id::<T>(pool, id)
        .await?
        .map(Some)
        .ok_or(GraphError::MissingReference {
            entity: T::NAME,
            id,
        })
}

/// Load every referenced entity, keeping the payload order. The first missing key fails the graph.
pub async fn resolve_references<T: Entity + Clone>(
    pool: &SqlitePool,
    references: &[EntityRef],
) -> Result<Vec<T>, GraphError> {
    let ids: Vec<i64> = references.iter().map(|r| r.id).collect();
    let found = entity::find_by_ids::<T>(pool, &ids).await?;

    ids.into_iter()
        .map(|id| {
            found
                .iter()
                .find(|e| e.id() == id)
                .cloned()
                .ok_or(GraphError::MissingReference {
                    entity: T::NAME,
                    id,
                })
        })
        .collect()
}
