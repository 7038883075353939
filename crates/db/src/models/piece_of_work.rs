use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

use crate::entity::{Entity, payload_identity, same_identity};

/// A unit of work that can be attached to any number of jobs through `job_chore`.
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct PieceOfWork {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl PartialEq for PieceOfWork {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}

impl Entity for PieceOfWork {
    const NAME: &'static str = "pieceOfWork";
    const TABLE: &'static str = "piece_of_work";
    const COLUMNS: &'static str = "id, title, description";
    const SORTABLE: &'static [(&'static str, &'static str)] = &[
        ("id", "id"),
        ("title", "title"),
        ("description", "description"),
    ];

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct PieceOfWorkPayload {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl PieceOfWorkPayload {
    pub fn identity(&self) -> Option<i64> {
        payload_identity(self.id)
    }
}

impl PieceOfWork {
    pub async fn create(pool: &SqlitePool, data: &PieceOfWorkPayload) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, PieceOfWork>(
            r#"INSERT INTO piece_of_work (title, description)
               VALUES ($1, $2)
               RETURNING id, title, description"#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .fetch_one(pool)
        .await
    }

    /// Job links are owned by the job side and are left untouched here.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &PieceOfWorkPayload,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, PieceOfWork>(
            r#"UPDATE piece_of_work
               SET title = $2, description = $3
               WHERE id = $1
               RETURNING id, title, description"#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.description)
        .fetch_optional(pool)
        .await
    }
}
