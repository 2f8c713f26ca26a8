//! Database operations for the singleton `admin_filters` row (`id = 1`).

use chrono::{DateTime, Utc};
use radar_core::{AdminFilter, GeoScope};
use sqlx::{types::Json, PgConnection};

use crate::DbError;

const SINGLETON_ID: i32 = 1;

/// The stored admin filter as read from Postgres.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminFilterRow {
    pub include_keywords: Json<Vec<String>>,
    pub exclude_keywords: Json<Vec<String>>,
    pub geo_scope: String,
    pub industries: Json<Vec<String>>,
    pub updated_at: DateTime<Utc>,
}

impl AdminFilterRow {
    /// Convert into the domain filter.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidStoredValue`] if `geo_scope` holds a value
    /// outside `GLOBAL` / `INDIA`.
    pub fn into_admin_filter(self) -> Result<AdminFilter, DbError> {
        let geo_scope =
            self.geo_scope
                .parse::<GeoScope>()
                .map_err(|_| DbError::InvalidStoredValue {
                    table: "admin_filters",
                    column: "geo_scope",
                    value: self.geo_scope.clone(),
                })?;

        Ok(AdminFilter {
            include_keywords: self.include_keywords.0,
            exclude_keywords: self.exclude_keywords.0,
            geo_scope,
            industries: self.industries.0,
            updated_at: Some(self.updated_at),
        })
    }
}

/// Load the singleton filter, creating it from `defaults` on first access.
///
/// An existing row is returned untouched; `defaults` only seed a missing one.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure or
/// [`DbError::InvalidStoredValue`] if the stored row cannot be decoded.
pub async fn get_or_create_admin_filter(
    conn: &mut PgConnection,
    defaults: &AdminFilter,
) -> Result<AdminFilter, DbError> {
    sqlx::query(
        "INSERT INTO admin_filters (id, include_keywords, exclude_keywords, geo_scope, industries) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(SINGLETON_ID)
    .bind(Json(&defaults.include_keywords))
    .bind(Json(&defaults.exclude_keywords))
    .bind(defaults.geo_scope.as_str())
    .bind(Json(&defaults.industries))
    .execute(&mut *conn)
    .await?;

    let row = sqlx::query_as::<_, AdminFilterRow>(
        "SELECT include_keywords, exclude_keywords, geo_scope, industries, updated_at \
         FROM admin_filters WHERE id = $1",
    )
    .bind(SINGLETON_ID)
    .fetch_one(&mut *conn)
    .await?;

    row.into_admin_filter()
}

/// Replace the singleton filter's contents, creating the row if needed.
///
/// Callers validate the filter (see [`radar_core::AdminFilterUpdate`]) before
/// calling this; the returned filter carries the new `updated_at`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn replace_admin_filter(
    conn: &mut PgConnection,
    filter: &AdminFilter,
) -> Result<AdminFilter, DbError> {
    let row = sqlx::query_as::<_, AdminFilterRow>(
        "INSERT INTO admin_filters (id, include_keywords, exclude_keywords, geo_scope, industries) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (id) DO UPDATE SET \
             include_keywords = EXCLUDED.include_keywords, \
             exclude_keywords = EXCLUDED.exclude_keywords, \
             geo_scope = EXCLUDED.geo_scope, \
             industries = EXCLUDED.industries, \
             updated_at = NOW() \
         RETURNING include_keywords, exclude_keywords, geo_scope, industries, updated_at",
    )
    .bind(SINGLETON_ID)
    .bind(Json(&filter.include_keywords))
    .bind(Json(&filter.exclude_keywords))
    .bind(filter.geo_scope.as_str())
    .bind(Json(&filter.industries))
    .fetch_one(&mut *conn)
    .await?;

    row.into_admin_filter()
}
