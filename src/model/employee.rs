use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Directory record consumed by the engine: identity, hire date (tenure
/// accrual), display fields. Owned and edited elsewhere.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "EMP-001")]
    pub employee_code: String,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "2022-06-10", value_type = String, format = "date", nullable = true)]
    pub hire_date: Option<NaiveDate>,

    #[schema(example = "active")]
    pub status: String,
}
