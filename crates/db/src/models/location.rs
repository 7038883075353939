use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

use super::country::Country;
use crate::entity::{self, Entity, EntityRef, payload_identity, same_identity};

#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: i64,
    pub street_address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub state_province: Option<String>,
    pub country_id: Option<i64>, // Foreign key to Country
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}

impl Entity for Location {
    const NAME: &'static str = "location";
    const TABLE: &'static str = "location";
    const COLUMNS: &'static str =
        "id, street_address, postal_code, city, state_province, country_id";
    const SORTABLE: &'static [(&'static str, &'static str)] = &[
        ("id", "id"),
        ("streetAddress", "street_address"),
        ("postalCode", "postal_code"),
        ("city", "city"),
        ("stateProvince", "state_province"),
    ];

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct LocationWithCountry {
    #[serde(flatten)]
    #[ts(flatten)]
    pub location: Location,
    pub country: Option<Country>,
}

impl std::ops::Deref for LocationWithCountry {
    type Target = Location;
    fn deref(&self) -> &Self::Target {
        &self.location
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct LocationPayload {
    pub id: Option<i64>,
    pub street_address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub state_province: Option<String>,
    pub country: Option<EntityRef>,
}

impl LocationPayload {
    pub fn identity(&self) -> Option<i64> {
        payload_identity(self.id)
    }
}

impl Location {
    pub async fn create(pool: &SqlitePool, data: &LocationPayload) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Location>(
            r#"INSERT INTO location (street_address, postal_code, city, state_province, country_id)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, street_address, postal_code, city, state_province, country_id"#,
        )
        .bind(&data.street_address)
        .bind(&data.postal_code)
        .bind(&data.city)
        .bind(&data.state_province)
        .bind(data.country.map(|c| c.id))
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &LocationPayload,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Location>(
            r#"UPDATE location
               SET street_address = $2, postal_code = $3, city = $4, state_province = $5, country_id = $6
               WHERE id = $1
               RETURNING id, street_address, postal_code, city, state_province, country_id"#,
        )
        .bind(id)
        .bind(&data.street_address)
        .bind(&data.postal_code)
        .bind(&data.city)
        .bind(&data.state_province)
        .bind(data.country.map(|c| c.id))
        .fetch_optional(pool)
        .await
    }
}

impl LocationWithCountry {
    pub async fn load_all(
        pool: &SqlitePool,
        locations: Vec<Location>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let country_ids: Vec<i64> = locations.iter().filter_map(|l| l.country_id).collect();
        let countries = entity::find_map_by_ids::<Country>(pool, &country_ids).await?;

        Ok(locations
            .into_iter()
            .map(|location| {
                let country = location
                    .country_id
                    .and_then(|id| countries.get(&id).cloned());
                Self { location, country }
            })
            .collect())
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let Some(location) = entity::find_by_id::<Location>(pool, id).await? else {
            return Ok(None);
        };
        Ok(Self::load_all(pool, vec![location]).await?.pop())
    }
}
