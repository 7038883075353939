use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

use super::location::Location;
use crate::entity::{self, Entity, EntityRef, payload_identity, same_identity};

#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: i64,
    pub department_name: String,
    pub location_id: Option<i64>, // Foreign key to Location
}

impl PartialEq for Department {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}

impl Entity for Department {
    const NAME: &'static str = "department";
    const TABLE: &'static str = "department";
    const COLUMNS: &'static str = "id, department_name, location_id";
    const SORTABLE: &'static [(&'static str, &'static str)] =
        &[("id", "id"), ("departmentName", "department_name")];

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct DepartmentWithLocation {
    #[serde(flatten)]
    #[ts(flatten)]
    pub department: Department,
    pub location: Option<Location>,
}

impl std::ops::Deref for DepartmentWithLocation {
    type Target = Department;
    fn deref(&self) -> &Self::Target {
        &self.department
    }
}

/// `departmentName` is required; a body without it is rejected during extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPayload {
    pub id: Option<i64>,
    pub department_name: String,
    pub location: Option<EntityRef>,
}

impl DepartmentPayload {
    pub fn identity(&self) -> Option<i64> {
        payload_identity(self.id)
    }
}

impl Department {
    pub async fn create(pool: &SqlitePool, data: &DepartmentPayload) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Department>(
            r#"INSERT INTO department (department_name, location_id)
               VALUES ($1, $2)
               RETURNING id, department_name, location_id"#,
        )
        .bind(&data.department_name)
        .bind(data.location.map(|l| l.id))
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &DepartmentPayload,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Department>(
            r#"UPDATE department
               SET department_name = $2, location_id = $3
               WHERE id = $1
               RETURNING id, department_name, location_id"#,
        )
        .bind(id)
        .bind(&data.department_name)
        .bind(data.location.map(|l| l.id))
        .fetch_optional(pool)
        .await
    }
}

impl DepartmentWithLocation {
    pub async fn load_all(
        pool: &SqlitePool,
        departments: Vec<Department>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let location_ids: Vec<i64> = departments.iter().filter_map(|d| d.location_id).collect();
        let locations = entity::find_map_by_ids::<Location>(pool, &location_ids).await?;

        Ok(departments
            .into_iter()
            .map(|department| {
                let location = department
                    .location_id
                    .and_then(|id| locations.get(&id).cloned());
                Self {
                    department,
                    location,
                }
            })
            .collect())
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let Some(department) = entity::find_by_id::<Department>(pool, id).await? else {
            return Ok(None);
        };
        Ok(Self::load_all(pool, vec![department]).await?.pop())
    }
}
