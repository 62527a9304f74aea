use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A holiday day is never classified as absence; recurring holidays match
/// on month and day every year.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Holiday {
    pub id: i64,
    pub name: String,

    #[schema(example = "2025-01-01", value_type = String, format = "date")]
    pub holiday_date: NaiveDate,

    pub is_recurring: bool,
    pub is_active: bool,
}
