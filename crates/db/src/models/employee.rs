use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

use super::department::Department;
use crate::entity::{self, Entity, EntityRef, payload_identity, same_identity};

#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub hire_date: Option<DateTime<Utc>>,
    pub salary: Option<i64>,
    pub commission_pct: Option<i64>,
    pub manager_id: Option<i64>,    // Foreign key to another Employee
    pub department_id: Option<i64>, // Foreign key to Department
}

impl PartialEq for Employee {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}

impl Entity for Employee {
    const NAME: &'static str = "employee";
    const TABLE: &'static str = "employee";
    const COLUMNS: &'static str = "id, first_name, last_name, email, phone_number, hire_date, salary, commission_pct, manager_id, department_id";
    const SORTABLE: &'static [(&'static str, &'static str)] = &[
        ("id", "id"),
        ("firstName", "first_name"),
        ("lastName", "last_name"),
        ("email", "email"),
        ("phoneNumber", "phone_number"),
        ("hireDate", "hire_date"),
        ("salary", "salary"),
        ("commissionPct", "commission_pct"),
    ];

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct EmployeeWithRelations {
    #[serde(flatten)]
    #[ts(flatten)]
    pub employee: Employee,
    pub manager: Option<Employee>,
    pub department: Option<Department>,
}

impl std::ops::Deref for EmployeeWithRelations {
    type Target = Employee;
    fn deref(&self) -> &Self::Target {
        &self.employee
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayload {
    pub id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub hire_date: Option<DateTime<Utc>>,
    pub salary: Option<i64>,
    pub commission_pct: Option<i64>,
    pub manager: Option<EntityRef>,
    pub department: Option<EntityRef>,
}

impl EmployeePayload {
    pub fn identity(&self) -> Option<i64> {
        payload_identity(self.id)
    }
}

impl Employee {
    pub async fn create(pool: &SqlitePool, data: &EmployeePayload) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Employee>(
            r#"INSERT INTO employee (first_name, last_name, email, phone_number, hire_date, salary, commission_pct, manager_id, department_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING id, first_name, last_name, email, phone_number, hire_date, salary, commission_pct, manager_id, department_id"#,
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(&data.phone_number)
        .bind(data.hire_date)
        .bind(data.salary)
        .bind(data.commission_pct)
        .bind(data.manager.map(|m| m.id))
        .bind(data.department.map(|d| d.id))
        .fetch_one(pool)
        .await
    }

    /// Both references are written on every update, so removing a manager or
    /// department persists as NULL.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &EmployeePayload,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Employee>(
            r#"UPDATE employee
               SET first_name = $2, last_name = $3, email = $4, phone_number = $5, hire_date = $6,
                   salary = $7, commission_pct = $8, manager_id = $9, department_id = $10
               WHERE id = $1
               RETURNING id, first_name, last_name, email, phone_number, hire_date, salary, commission_pct, manager_id, department_id"#,
        )
        .bind(id)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(&data.phone_number)
        .bind(data.hire_date)
        .bind(data.salary)
        .bind(data.commission_pct)
        .bind(data.manager.map(|m| m.id))
        .bind(data.department.map(|d| d.id))
        .fetch_optional(pool)
        .await
    }
}

impl EmployeeWithRelations {
    pub async fn load_all(
        pool: &SqlitePool,
        employees: Vec<Employee>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let manager_ids: Vec<i64> = employees.iter().filter_map(|e| e.manager_id).collect();
        let department_ids: Vec<i64> = employees.iter().filter_map(|e| e.department_id).collect();
        let managers = entity::find_map_by_ids::<Employee>(pool, &manager_ids).await?;
        let departments = entity::find_map_by_ids::<Department>(pool, &department_ids).await?;

        Ok(employees
            .into_iter()
            .map(|employee| {
                let manager = employee.manager_id.and_then(|id| managers.get(&id).cloned());
                let department = employee
                    .department_id
                    .and_then(|id| departments.get(&id).cloned());
                Self {
                    employee,
                    manager,
                    department,
                }
            })
            .collect())
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let Some(employee) = entity::find_by_id::<Employee>(pool, id).await? else {
            return Ok(None);
        };
        Ok(Self::load_all(pool, vec![employee]).await?.pop())
    }
}
