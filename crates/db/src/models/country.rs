use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

use super::region::Region;
use crate::entity::{self, Entity, EntityRef, payload_identity, same_identity};

#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub id: i64,
    pub country_name: Option<String>,
    pub region_id: Option<i64>, // Foreign key to Region
}

impl PartialEq for Country {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}

impl Entity for Country {
    const NAME: &'static str = "country";
    const TABLE: &'static str = "country";
    const COLUMNS: &'static str = "id, country_name, region_id";
    const SORTABLE: &'static [(&'static str, &'static str)] =
        &[("id", "id"), ("countryName", "country_name")];

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CountryWithRegion {
    #[serde(flatten)]
    #[ts(flatten)]
    pub country: Country,
    pub region: Option<Region>,
}

impl std::ops::Deref for CountryWithRegion {
    type Target = Country;
    fn deref(&self) -> &Self::Target {
        &self.country
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CountryPayload {
    pub id: Option<i64>,
    pub country_name: Option<String>,
    pub region: Option<EntityRef>,
}

impl CountryPayload {
    pub fn identity(&self) -> Option<i64> {
        payload_identity(self.id)
    }
}

impl Country {
    pub async fn create(pool: &SqlitePool, data: &CountryPayload) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Country>(
            r#"INSERT INTO country (country_name, region_id)
               VALUES ($1, $2)
               RETURNING id, country_name, region_id"#,
        )
        .bind(&data.country_name)
        .bind(data.region.map(|r| r.id))
        .fetch_one(pool)
        .await
    }

    /// Writes `region_id` unconditionally so a cleared region persists as NULL.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &CountryPayload,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Country>(
            r#"UPDATE country
               SET country_name = $2, region_id = $3
               WHERE id = $1
               RETURNING id, country_name, region_id"#,
        )
        .bind(id)
        .bind(&data.country_name)
        .bind(data.region.map(|r| r.id))
        .fetch_optional(pool)
        .await
    }
}

impl CountryWithRegion {
    pub async fn load_all(
        pool: &SqlitePool,
        countries: Vec<Country>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let region_ids: Vec<i64> = countries.iter().filter_map(|c| c.region_id).collect();
        let regions = entity::find_map_by_ids::<Region>(pool, &region_ids).await?;

        Ok(countries
            .into_iter()
            .map(|country| {
                let region = country.region_id.and_then(|id| regions.get(&id).cloned());
                Self { country, region }
            })
            .collect())
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let Some(country) = entity::find_by_id::<Country>(pool, id).await? else {
            return Ok(None);
        };
        Ok(Self::load_all(pool, vec![country]).await?.pop())
    }
}
