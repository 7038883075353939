use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

use super::{department::Department, employee::Employee, job::Job};
use crate::entity::{self, Entity, EntityRef, payload_identity, same_identity};

/// A period during which an employee held a job in a department.
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct JobHistory {
    pub id: i64,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub job_id: Option<i64>,
    pub department_id: Option<i64>,
    pub employee_id: Option<i64>,
}

impl PartialEq for JobHistory {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}

impl Entity for JobHistory {
    const NAME: &'static str = "jobHistory";
    const TABLE: &'static str = "job_history";
    const COLUMNS: &'static str = "id, start_date, end_date, job_id, department_id, employee_id";
    const SORTABLE: &'static [(&'static str, &'static str)] = &[
        ("id", "id"),
        ("startDate", "start_date"),
        ("endDate", "end_date"),
    ];

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct JobHistoryWithRelations {
    #[serde(flatten)]
    #[ts(flatten)]
    pub job_history: JobHistory,
    pub job: Option<Job>,
    pub department: Option<Department>,
    pub employee: Option<Employee>,
}

impl std::ops::Deref for JobHistoryWithRelations {
    type Target = JobHistory;
    fn deref(&self) -> &Self::Target {
        &self.job_history
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct JobHistoryPayload {
    pub id: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub job: Option<EntityRef>,
    pub department: Option<EntityRef>,
    pub employee: Option<EntityRef>,
}

impl JobHistoryPayload {
    pub fn identity(&self) -> Option<i64> {
        payload_identity(self.id)
    }
}

impl JobHistory {
    pub async fn create(pool: &SqlitePool, data: &JobHistoryPayload) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, JobHistory>(
            r#"INSERT INTO job_history (start_date, end_date, job_id, department_id, employee_id)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, start_date, end_date, job_id, department_id, employee_id"#,
        )
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.job.map(|r| r.id))
        .bind(data.department.map(|r| r.id))
        .bind(data.employee.map(|r| r.id))
        .fetch_one(pool)
        .await
    }

    /// All three references are always written; a missing one is stored as NULL.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &JobHistoryPayload,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, JobHistory>(
            r#"UPDATE job_history
               SET start_date = $2, end_date = $3, job_id = $4, department_id = $5, employee_id = $6
               WHERE id = $1
               RETURNING id, start_date, end_date, job_id, department_id, employee_id"#,
        )
        .bind(id)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.job.map(|r| r.id))
        .bind(data.department.map(|r| r.id))
        .bind(data.employee.map(|r| r.id))
        .fetch_optional(pool)
        .await
    }
}

impl JobHistoryWithRelations {
    pub async fn load_all(
        pool: &SqlitePool,
        histories: Vec<JobHistory>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let job_ids: Vec<i64> = histories.iter().filter_map(|h| h.job_id).collect();
        let department_ids: Vec<i64> = histories.iter().filter_map(|h| h.department_id).collect();
        let employee_ids: Vec<i64> = histories.iter().filter_map(|h| h.employee_id).collect();
        let jobs = entity::find_map_by_ids::<Job>(pool, &job_ids).await?;
        let departments = entity::find_map_by_ids::<Department>(pool, &department_ids).await?;
        let employees = entity::find_map_by_ids::<Employee>(pool, &employee_ids).await?;

        Ok(histories
            .into_iter()
            .map(|job_history| {
                let job = job_history.job_id.and_then(|id| jobs.get(&id).cloned());
                let department = job_history
                    .department_id
                    .and_then(|id| departments.get(&id).cloned());
                let employee = job_history
                    .employee_id
                    .and_then(|id| employees.get(&id).cloned());
                Self {
                    job_history,
                    job,
                    department,
                    employee,
                }
            })
            .collect())
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let Some(job_history) = entity::find_by_id::<JobHistory>(pool, id).await? else {
            return Ok(None);
        };
        Ok(Self::load_all(pool, vec![job_history]).await?.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DBService,
        models::{
            department::{Department, DepartmentPayload},
            job::JobPayload,
        },
    };

    #[tokio::test]
    async fn test_loads_references_and_detaches_on_delete() {
        let db = DBService::new_in_memory().await.unwrap();
        let department = Department::create(
            &db.pool,
            &DepartmentPayload {
                department_name: "Research".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let mut job = JobPayload::default().into_graph(None, vec![]);
        Job::insert_graph(&db.pool, &mut job).await.unwrap();

        let history = JobHistory::create(
            &db.pool,
            &JobHistoryPayload {
                start_date: Some(DateTime::<Utc>::UNIX_EPOCH),
                job: Some(EntityRef { id: job.job.id }),
                department: Some(EntityRef { id: department.id }),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let loaded = JobHistoryWithRelations::find_by_id(&db.pool, history.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.job.as_ref().map(|j| j.id), Some(job.job.id));
        assert_eq!(loaded.department.as_ref().map(|d| d.id), Some(department.id));
        assert!(loaded.employee.is_none());
        assert_eq!(loaded.start_date, Some(DateTime::<Utc>::UNIX_EPOCH));

        entity::delete::<_, Department>(&db.pool, department.id).await.unwrap();
        let reloaded = entity::find_by_id::<JobHistory>(&db.pool, history.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.department_id, None);
        assert_eq!(reloaded.job_id, Some(job.job.id));
    }
}
