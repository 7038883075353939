use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

use crate::entity::{Entity, payload_identity, same_identity};

#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: i64,
    pub region_name: Option<String>,
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}

impl Entity for Region {
    const NAME: &'static str = "region";
    const TABLE: &'static str = "region";
    const COLUMNS: &'static str = "id, region_name";
    const SORTABLE: &'static [(&'static str, &'static str)] =
        &[("id", "id"), ("regionName", "region_name")];

    fn id(&self) -> i64 {
        self.id
    }
}

/// Request body for create and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct RegionPayload {
    pub id: Option<i64>,
    pub region_name: Option<String>,
}

impl RegionPayload {
    pub fn identity(&self) -> Option<i64> {
        payload_identity(self.id)
    }
}

impl Region {
    pub async fn create(pool: &SqlitePool, data: &RegionPayload) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Region>(
            r#"INSERT INTO region (region_name)
               VALUES ($1)
               RETURNING id, region_name"#,
        )
        .bind(&data.region_name)
        .fetch_one(pool)
        .await
    }

    /// Returns `None` when no region has this id.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &RegionPayload,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Region>(
            r#"UPDATE region
               SET region_name = $2
               WHERE id = $1
               RETURNING id, region_name"#,
        )
        .bind(id)
        .bind(&data.region_name)
        .fetch_optional(pool)
        .await
    }
}
