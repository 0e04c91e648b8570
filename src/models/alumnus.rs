use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Alumnus roster record. Owned by the roster CRUD side of the application;
/// the map pipeline only reads it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Alumnus {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub cohort_year: Option<i32>,
    /// Free-text institution name as entered on the profile form.
    pub institution_name: Option<String>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One student sample inside an unmapped group.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnmappedStudent {
    pub first_name: String,
    pub last_name: String,
    pub cohort_year: Option<i32>,
}

/// Alumni sharing an institution name that could not be resolved to
/// coordinates, queued for manual curation in the admin UI.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnmappedGroup {
    pub college_name: String,
    pub student_count: usize,
    pub students: Vec<UnmappedStudent>,
}
