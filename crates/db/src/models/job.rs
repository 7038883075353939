use serde::{Deserialize, Serialize, Serializer};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

use super::{employee::Employee, job_chore::JobChore, piece_of_work::PieceOfWork};
use crate::{
    entity::{self, Entity, EntityRef, payload_identity, same_identity},
    join_list::{JoinList, JoinListFacade},
};

#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i64,
    pub job_title: Option<String>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    pub employee_id: Option<i64>, // Foreign key to Employee
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}

impl Entity for Job {
    const NAME: &'static str = "job";
    const TABLE: &'static str = "job";
    const COLUMNS: &'static str = "id, job_title, min_salary, max_salary, employee_id";
    const SORTABLE: &'static [(&'static str, &'static str)] = &[
        ("id", "id"),
        ("jobTitle", "job_title"),
        ("minSalary", "min_salary"),
        ("maxSalary", "max_salary"),
    ];

    fn id(&self) -> i64 {
        self.id
    }
}

/// A job together with its employee and its chores.
///
/// The chores are stored as join rows; `chores()` / `chores_mut()` expose them
/// as a list of pieces of work and serialize as `"chores": [PieceOfWork]`.
#[derive(Debug, Clone, Default, Serialize, TS)]
pub struct JobWithRelations {
    #[serde(flatten)]
    #[ts(flatten)]
    pub job: Job,
    pub employee: Option<Employee>,
    #[serde(rename = "chores", serialize_with = "serialize_chores")]
    #[ts(type = "Array<PieceOfWork>")]
    pub job_chores: Vec<JobChore>,
}

fn serialize_chores<S: Serializer>(rows: &[JobChore], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(JoinList::<Job, PieceOfWork, JobChore>::new(rows).iter())
}

impl std::ops::Deref for JobWithRelations {
    type Target = Job;
    fn deref(&self) -> &Self::Target {
        &self.job
    }
}

impl JobWithRelations {
    pub fn chores(&self) -> JoinList<'_, Job, PieceOfWork, JobChore> {
        JoinList::new(&self.job_chores)
    }

    pub fn chores_mut(&mut self) -> JoinListFacade<'_, Job, PieceOfWork, JobChore> {
        JoinListFacade::new(self.job.id, &mut self.job_chores)
    }

    pub async fn load_all(pool: &SqlitePool, jobs: Vec<Job>) -> Result<Vec<Self>, sqlx::Error> {
        let employee_ids: Vec<i64> = jobs.iter().filter_map(|j| j.employee_id).collect();
        let job_ids: Vec<i64> = jobs.iter().map(|j| j.id).collect();
        let employees = entity::find_map_by_ids::<Employee>(pool, &employee_ids).await?;
        let mut chores = JobChore::find_by_job_ids(pool, &job_ids).await?;

        Ok(jobs
            .into_iter()
            .map(|job| {
                let employee = job.employee_id.and_then(|id| employees.get(&id).cloned());
                let job_chores = chores.remove(&job.id).unwrap_or_default();
                Self {
                    job,
                    employee,
                    job_chores,
                }
            })
            .collect())
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let Some(job) = entity::find_by_id::<Job>(pool, id).await? else {
            return Ok(None);
        };
        let employee = match job.employee_id {
            Some(employee_id) => entity::find_by_id::<Employee>(pool, employee_id).await?,
            None => None,
        };
        let job_chores = JobChore::find_by_job_id(pool, id).await?;
        Ok(Some(Self {
            job,
            employee,
            job_chores,
        }))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct JobPayload {
    pub id: Option<i64>,
    pub job_title: Option<String>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    pub employee: Option<EntityRef>,
    #[serde(default)]
    pub chores: Vec<EntityRef>,
}

impl JobPayload {
    pub fn identity(&self) -> Option<i64> {
        payload_identity(self.id)
    }

    /// Assemble the graph to save from already-resolved references.
    /// Repeated chores collapse into a single join row.
    pub fn into_graph(
        self,
        employee: Option<Employee>,
        chores: Vec<PieceOfWork>,
    ) -> JobWithRelations {
        let mut graph = JobWithRelations {
            job: Job {
                id: self.identity().unwrap_or(0),
                job_title: self.job_title,
                min_salary: self.min_salary,
                max_salary: self.max_salary,
                employee_id: employee.as_ref().map(|e| e.id),
            },
            employee,
            job_chores: Vec::with_capacity(chores.len()),
        };
        let mut facade = graph.chores_mut();
        for chore in chores {
            facade.add(chore);
        }
        graph
    }
}

impl Job {
    /// Insert the job and its join rows in one transaction; ids are written back into `graph`.
    pub async fn insert_graph(
        pool: &SqlitePool,
        graph: &mut JobWithRelations,
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let job = sqlx::query_as::<_, Job>(
            r#"INSERT INTO job (job_title, min_salary, max_salary, employee_id)
               VALUES ($1, $2, $3, $4)
               RETURNING id, job_title, min_salary, max_salary, employee_id"#,
        )
        .bind(&graph.job.job_title)
        .bind(graph.job.min_salary)
        .bind(graph.job.max_salary)
        .bind(graph.job.employee_id)
        .fetch_one(&mut *tx)
        .await?;

        for row in &mut graph.job_chores {
            row.job_id = job.id;
        }
        JobChore::insert_all(&mut *tx, &graph.job_chores).await?;
        tx.commit().await?;

        graph.job = job;
        Ok(())
    }

    /// Overwrite the job row, including a possibly-NULL `employee_id`, then
    /// replace its join rows with the ones held by `graph`.
    ///
    /// Returns `false` without writing anything if the job does not exist.
    pub async fn update_graph(
        pool: &SqlitePool,
        graph: &mut JobWithRelations,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated = sqlx::query_as::<_, Job>(
            r#"UPDATE job
               SET job_title = $2, min_salary = $3, max_salary = $4, employee_id = $5
               WHERE id = $1
               RETURNING id, job_title, min_salary, max_salary, employee_id"#,
        )
        .bind(graph.job.id)
        .bind(&graph.job.job_title)
        .bind(graph.job.min_salary)
        .bind(graph.job.max_salary)
        .bind(graph.job.employee_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(job) = updated else {
            return Ok(false);
        };

        JobChore::delete_by_job_id(&mut *tx, job.id).await?;
        for row in &mut graph.job_chores {
            row.job_id = job.id;
        }
        JobChore::insert_all(&mut *tx, &graph.job_chores).await?;
        tx.commit().await?;

        graph.job = job;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DBService,
        models::piece_of_work::{PieceOfWork, PieceOfWorkPayload},
    };

    async fn chore(pool: &SqlitePool, title: &str) -> PieceOfWork {
        PieceOfWork::create(
            pool,
            &PieceOfWorkPayload {
                title: Some(title.to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }

    fn payload(title: &str) -> JobPayload {
        JobPayload {
            job_title: Some(title.to_string()),
            min_salary: Some(1),
            max_salary: Some(1),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_graph_writes_join_rows() {
        let db = DBService::new_in_memory().await.unwrap();
        let a = chore(&db.pool, "a").await;
        let b = chore(&db.pool, "b").await;

        let mut graph = payload("engineer").into_graph(None, vec![b.clone(), a.clone(), b.clone()]);
        Job::insert_graph(&db.pool, &mut graph).await.unwrap();
        assert_ne!(graph.job.id, 0);

        let loaded = JobWithRelations::find_by_id(&db.pool, graph.job.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.chores().ids(), vec![b.id, a.id]);
        assert_eq!(JobChore::count_for_job(&db.pool, graph.job.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_graph_replaces_join_rows() {
        let db = DBService::new_in_memory().await.unwrap();
        let a = chore(&db.pool, "a").await;
        let b = chore(&db.pool, "b").await;
        let c = chore(&db.pool, "c").await;

        let mut graph = payload("engineer").into_graph(None, vec![a.clone(), b.clone()]);
        Job::insert_graph(&db.pool, &mut graph).await.unwrap();

        let mut update = JobPayload {
            id: Some(graph.job.id),
            ..payload("senior engineer")
        }
        .into_graph(None, vec![b.clone()]);
        update.chores_mut().add(c.clone());
        assert!(Job::update_graph(&db.pool, &mut update).await.unwrap());

        let loaded = JobWithRelations::find_by_id(&db.pool, graph.job.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.job.job_title.as_deref(), Some("senior engineer"));
        assert_eq!(loaded.chores().ids(), vec![b.id, c.id]);
    }

    #[tokio::test]
    async fn test_update_graph_missing_job() {
        let db = DBService::new_in_memory().await.unwrap();
        let mut graph = JobPayload {
            id: Some(42),
            ..payload("ghost")
        }
        .into_graph(None, vec![]);
        assert!(!Job::update_graph(&db.pool, &mut graph).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_graph_clears_employee() {
        let db = DBService::new_in_memory().await.unwrap();
        let employee = Employee::create(&db.pool, &Default::default()).await.unwrap();

        let mut graph = payload("engineer").into_graph(Some(employee), vec![]);
        Job::insert_graph(&db.pool, &mut graph).await.unwrap();
        assert!(graph.job.employee_id.is_some());

        let mut update = JobPayload {
            id: Some(graph.job.id),
            ..payload("engineer")
        }
        .into_graph(None, vec![]);
        Job::update_graph(&db.pool, &mut update).await.unwrap();

        let loaded = JobWithRelations::find_by_id(&db.pool, graph.job.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.job.employee_id, None);
        assert!(loaded.employee.is_none());
    }

    #[tokio::test]
    async fn test_delete_cascades_to_join_rows() {
        let db = DBService::new_in_memory().await.unwrap();
        let a = chore(&db.pool, "a").await;
        let b = chore(&db.pool, "b").await;

        let mut first = payload("first").into_graph(None, vec![a.clone(), b.clone()]);
        Job::insert_graph(&db.pool, &mut first).await.unwrap();
        let mut second = payload("second").into_graph(None, vec![a.clone()]);
        Job::insert_graph(&db.pool, &mut second).await.unwrap();

        // Removing a piece of work drops its links from every job.
        entity::delete::<_, PieceOfWork>(&db.pool, a.id).await.unwrap();
        assert_eq!(JobChore::count_for_job(&db.pool, first.job.id).await.unwrap(), 1);
        assert_eq!(JobChore::count_for_job(&db.pool, second.job.id).await.unwrap(), 0);

        // Removing a job drops its own links.
        entity::delete::<_, Job>(&db.pool, first.job.id).await.unwrap();
        assert_eq!(JobChore::count_for_job(&db.pool, first.job.id).await.unwrap(), 0);
    }

    #[test]
    fn test_serializes_chores_as_pieces_of_work() {
        let graph = JobPayload {
            id: Some(3),
            ..payload("engineer")
        }
        .into_graph(
            None,
            vec![PieceOfWork {
                id: 8,
                title: Some("deploy".to_string()),
                description: None,
            }],
        );

        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["jobTitle"], "engineer");
        assert_eq!(json["chores"][0]["id"], 8);
        assert_eq!(json["chores"][0]["title"], "deploy");
        assert!(json.get("jobChores").is_none());
    }

    #[test]
    fn test_identity_equality() {
        let a = Job {
            id: 1,
            ..Default::default()
        };
        let mut b = Job {
            id: 1,
            ..Default::default()
        };
        assert_eq!(a, b);
        b.id = 2;
        assert_ne!(a, b);
        let transient = Job::default();
        assert_ne!(transient, Job::default());
    }
}
