//! Database access for the curated-location table and the alumni roster.
//!
//! The map pipeline treats both as read-only inputs; the single write path
//! is the manual-curation insert. Queries use the runtime API so the crate
//! builds without a live database.

use sqlx::{Pool, Postgres};

use crate::models::{Alumnus, CreateCuratedLocation, CuratedLocation};

pub async fn list_curated_locations(
    pool: &Pool<Postgres>,
) -> Result<Vec<CuratedLocation>, sqlx::Error> {
    sqlx::query_as::<_, CuratedLocation>(
        r#"
        SELECT id, standard_name, aliases, latitude, longitude, created_at, updated_at
        FROM curated_locations
        ORDER BY standard_name
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn insert_curated_location(
    pool: &Pool<Postgres>,
    new: &CreateCuratedLocation,
) -> Result<CuratedLocation, sqlx::Error> {
    sqlx::query_as::<_, CuratedLocation>(
        r#"
        INSERT INTO curated_locations (standard_name, aliases, latitude, longitude)
        VALUES ($1, $2, $3, $4)
        RETURNING id, standard_name, aliases, latitude, longitude, created_at, updated_at
        "#,
    )
    .bind(&new.standard_name)
    .bind(vec![new.college_name.clone()])
    .bind(new.latitude)
    .bind(new.longitude)
    .fetch_one(pool)
    .await
}

pub async fn list_alumni(pool: &Pool<Postgres>) -> Result<Vec<Alumnus>, sqlx::Error> {
    sqlx::query_as::<_, Alumnus>(
        r#"
        SELECT id, first_name, last_name, cohort_year, institution_name,
               is_archived, created_at, updated_at
        FROM alumni
        ORDER BY last_name, first_name
        "#,
    )
    .fetch_all(pool)
    .await
}
