use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::models::{Restaurant, Weekday};

/// Persistent store of restaurant records, keyed by id and by owner.
///
/// Each call is atomic for the record it touches; there are no multi-record
/// transactions. `update` and `delete` report `NotFound` for unknown ids, and
/// `insert` reports `Conflict` when the owner already has a restaurant.
#[async_trait]
pub trait RestaurantStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Restaurant>, DatabaseError>;

    async fn find(&self, id: Uuid) -> Result<Option<Restaurant>, DatabaseError>;

    async fn find_by_owner(&self, owner: Uuid) -> Result<Option<Restaurant>, DatabaseError>;

    async fn insert(&self, restaurant: &Restaurant) -> Result<(), DatabaseError>;

    async fn update(&self, restaurant: &Restaurant) -> Result<(), DatabaseError>;

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    /// Short name for logs and the health endpoint
    fn backend(&self) -> &'static str;
}

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS restaurants (
        id          UUID PRIMARY KEY,
        owner       UUID NOT NULL UNIQUE,
        name        TEXT NOT NULL DEFAULT '',
        category    TEXT NOT NULL,
        location    TEXT NOT NULL,
        address     TEXT NOT NULL,
        phone       TEXT NOT NULL DEFAULT '',
        website_url TEXT,
        max_pax     INTEGER NOT NULL CHECK (max_pax >= 1),
        time_open   INTEGER NOT NULL,
        time_close  INTEGER NOT NULL,
        days_close  TEXT[] NOT NULL DEFAULT '{}',
        description TEXT NOT NULL DEFAULT '',
        image       TEXT,
        created_at  TIMESTAMPTZ NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL,
        CHECK (time_close > time_open)
    )
"#;

const COLUMNS: &str = "id, owner, name, category, location, address, phone, website_url, \
     max_pax, time_open, time_close, days_close, description, image, created_at, updated_at";

#[derive(Debug, FromRow)]
struct RestaurantRow {
    id: Uuid,
    owner: Uuid,
    name: String,
    category: String,
    location: String,
    address: String,
    phone: String,
    website_url: Option<String>,
    max_pax: i32,
    time_open: i32,
    time_close: i32,
    days_close: Vec<String>,
    description: String,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RestaurantRow> for Restaurant {
    type Error = DatabaseError;

    fn try_from(row: RestaurantRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = move |e: crate::models::UnknownVariant| {
            DatabaseError::Corrupt(format!("restaurant {}: {}", id, e))
        };

        let days_close = row
            .days_close
            .iter()
            .map(|d| d.parse::<Weekday>())
            .collect::<Result<_, _>>()
            .map_err(corrupt)?;

        Ok(Restaurant {
            id: row.id,
            owner: row.owner,
            category: row.category.parse().map_err(corrupt)?,
            location: row.location.parse().map_err(corrupt)?,
            name: row.name,
            address: row.address,
            phone: row.phone,
            website_url: row.website_url,
            max_pax: row.max_pax,
            time_open: row.time_open,
            time_close: row.time_close,
            days_close,
            description: row.description,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn day_names(restaurant: &Restaurant) -> Vec<String> {
    restaurant
        .days_close
        .iter()
        .map(|d| d.as_str().to_string())
        .collect()
}

fn map_write_error(err: sqlx::Error, owner: Uuid) -> DatabaseError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return DatabaseError::Conflict(format!("owner {} already has a restaurant", owner));
        }
    }
    DatabaseError::Sqlx(err)
}

/// PostgreSQL-backed store
pub struct PgRestaurantRepository {
    pool: PgPool,
}

impl PgRestaurantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `restaurants` table if it does not exist yet
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    async fn select_optional(
        &self,
        column: &str,
        value: Uuid,
    ) -> Result<Option<Restaurant>, DatabaseError> {
        let sql = format!("SELECT {COLUMNS} FROM restaurants WHERE {column} = $1");
        let row = sqlx::query_as::<_, RestaurantRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Restaurant::try_from).transpose()
    }
}

#[async_trait]
impl RestaurantStore for PgRestaurantRepository {
    async fn list(&self) -> Result<Vec<Restaurant>, DatabaseError> {
        let sql = format!("SELECT {COLUMNS} FROM restaurants ORDER BY created_at, id");
        sqlx::query_as::<_, RestaurantRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Restaurant::try_from)
            .collect()
    }

    async fn find(&self, id: Uuid) -> Result<Option<Restaurant>, DatabaseError> {
        self.select_optional("id", id).await
    }

    async fn find_by_owner(&self, owner: Uuid) -> Result<Option<Restaurant>, DatabaseError> {
        self.select_optional("owner", owner).await
    }

    async fn insert(&self, r: &Restaurant) -> Result<(), DatabaseError> {
        let sql = format!(
            "INSERT INTO restaurants ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)"
        );
        sqlx::query(&sql)
            .bind(r.id)
            .bind(r.owner)
            .bind(&r.name)
            .bind(r.category.as_str())
            .bind(r.location.as_str())
            .bind(&r.address)
            .bind(&r.phone)
            .bind(&r.website_url)
            .bind(r.max_pax)
            .bind(r.time_open)
            .bind(r.time_close)
            .bind(day_names(r))
            .bind(&r.description)
            .bind(&r.image)
            .bind(r.created_at)
            .bind(r.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, r.owner))?;
        Ok(())
    }

    async fn update(&self, r: &Restaurant) -> Result<(), DatabaseError> {
        // owner and created_at never change
        let result = sqlx::query(
            r#"
            UPDATE restaurants SET
                name = $2, category = $3, location = $4, address = $5, phone = $6,
                website_url = $7, max_pax = $8, time_open = $9, time_close = $10,
                days_close = $11, description = $12, image = $13, updated_at = $14
            WHERE id = $1
            "#,
        )
        .bind(r.id)
        .bind(&r.name)
        .bind(r.category.as_str())
        .bind(r.location.as_str())
        .bind(&r.address)
        .bind(&r.phone)
        .bind(&r.website_url)
        .bind(r.max_pax)
        .bind(r.time_open)
        .bind(r.time_close)
        .bind(day_names(r))
        .bind(&r.description)
        .bind(&r.image)
        .bind(r.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("restaurant {} not found", r.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM restaurants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("restaurant {} not found", id)));
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
