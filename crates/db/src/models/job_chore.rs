use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use ts_rs::TS;

use super::{job::Job, piece_of_work::PieceOfWork};
use crate::join_list::JoinedEntity;

/// Join row between a job and a piece of work. Keyed by the pair; carries no data of its own.
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct JobChore {
    pub job_id: i64,
    pub piece_of_work_id: i64,
    #[sqlx(skip)]
    #[serde(skip)]
    #[ts(skip)]
    pub job: Option<Job>,
    #[sqlx(skip)]
    #[serde(skip)]
    #[ts(skip)]
    pub piece_of_work: Option<PieceOfWork>,
}

impl JoinedEntity<Job, PieceOfWork> for JobChore {
    fn join(owner_id: i64, related: PieceOfWork) -> Self {
        Self {
            job_id: owner_id,
            piece_of_work_id: related.id,
            job: None,
            piece_of_work: Some(related),
        }
    }

    fn related_id(&self) -> i64 {
        self.piece_of_work_id
    }

    fn related(&self) -> Option<&PieceOfWork> {
        self.piece_of_work.as_ref()
    }
}

impl JoinedEntity<PieceOfWork, Job> for JobChore {
    fn join(owner_id: i64, related: Job) -> Self {
        Self {
            job_id: related.id,
            piece_of_work_id: owner_id,
            job: Some(related),
            piece_of_work: None,
        }
    }

    fn related_id(&self) -> i64 {
        self.job_id
    }

    fn related(&self) -> Option<&Job> {
        self.job.as_ref()
    }
}

type ChoreRecord = (i64, i64, Option<String>, Option<String>);

fn from_record((job_id, piece_of_work_id, title, description): ChoreRecord) -> JobChore {
    JobChore {
        job_id,
        piece_of_work_id,
        job: None,
        piece_of_work: Some(PieceOfWork {
            id: piece_of_work_id,
            title,
            description,
        }),
    }
}

impl JobChore {
    /// Join rows of one job with their piece of work loaded, in insertion order.
    pub async fn find_by_job_id(pool: &SqlitePool, job_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let records: Vec<ChoreRecord> = sqlx::query_as(
            r#"SELECT jc.job_id, jc.piece_of_work_id, p.title, p.description
               FROM job_chore jc
               JOIN piece_of_work p ON p.id = jc.piece_of_work_id
               WHERE jc.job_id = $1
               ORDER BY jc.rowid"#,
        )
        .bind(job_id)
        .fetch_all(pool)
        .await?;

        Ok(records.into_iter().map(from_record).collect())
    }

    /// Join rows for several jobs, grouped by job id.
    pub async fn find_by_job_ids(
        pool: &SqlitePool,
        job_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<Self>>, sqlx::Error> {
        let mut grouped: HashMap<i64, Vec<Self>> = HashMap::new();
        if job_ids.is_empty() {
            return Ok(grouped);
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"SELECT jc.job_id, jc.piece_of_work_id, p.title, p.description
               FROM job_chore jc
               JOIN piece_of_work p ON p.id = jc.piece_of_work_id
               WHERE jc.job_id IN ("#,
        );
        let mut separated = builder.separated(", ");
        for id in job_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY jc.rowid");

        let records: Vec<ChoreRecord> = builder.build_query_as::<ChoreRecord>().fetch_all(pool).await?;
        for record in records {
            let chore = from_record(record);
            grouped.entry(chore.job_id).or_default().push(chore);
        }
        Ok(grouped)
    }

    /// Insert rows in order. A pair that already exists is left as is.
    pub async fn insert_all(conn: &mut SqliteConnection, rows: &[Self]) -> Result<(), sqlx::Error> {
        for row in rows {
            sqlx::query(
                "INSERT OR IGNORE INTO job_chore (job_id, piece_of_work_id) VALUES ($1, $2)",
            )
            .bind(row.job_id)
            .bind(row.piece_of_work_id)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    /// Strip every join row of a job before its current set is written back.
    pub async fn delete_by_job_id<'e, E>(executor: E, job_id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM job_chore WHERE job_id = $1")
            .bind(job_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_for_job(pool: &SqlitePool, job_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM job_chore WHERE job_id = $1")
            .bind(job_id)
            .fetch_one(pool)
            .await
    }
}
