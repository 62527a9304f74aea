use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    Display,
    ToSchema,
)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum PayrollRunStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    Display,
    ToSchema,
)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Cancelled,
}

/// Activation state of a fixed allowance/deduction assignment.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    Display,
    ToSchema,
)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ItemStatus {
    Active,
    Inactive,
}

/// Allowance class; a non-empty `formula` makes it attendance-driven,
/// evaluated against the run's variable set.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AllowanceType {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_taxable: bool,
    pub is_active: bool,

    #[schema(example = "OT15Minutes * MinuteRate * 1.5", nullable = true)]
    pub formula: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct DeductionType {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_mandatory: bool,
    pub is_active: bool,

    #[schema(example = "LateMinutes * MinuteRate", nullable = true)]
    pub formula: Option<String>,
}

/// Latest effective-dated row at or before the run's period end wins.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SalaryStructure {
    pub id: i64,
    pub employee_id: i64,
    pub base_salary: f64,

    #[schema(example = "2025-01-01", value_type = String, format = "date")]
    pub effective_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct EmployeeAllowance {
    pub id: i64,
    pub employee_id: i64,
    pub allowance_type_id: i64,
    pub amount: f64,

    #[schema(value_type = String, format = "date")]
    pub effective_date: NaiveDate,

    pub status: ItemStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct EmployeeDeduction {
    pub id: i64,
    pub employee_id: i64,
    pub deduction_type_id: i64,
    pub amount: f64,

    #[schema(value_type = String, format = "date")]
    pub effective_date: NaiveDate,

    pub status: ItemStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PayrollRun {
    pub id: i64,

    /// Payroll scheme reference; schemes are configuration owned elsewhere.
    pub scheme_id: Option<i64>,

    #[schema(example = "2025-06-01", value_type = String, format = "date")]
    pub period_start: NaiveDate,
    #[schema(example = "2025-06-30", value_type = String, format = "date")]
    pub period_end: NaiveDate,

    pub status: PayrollRunStatus,

    /// Denormalized sum of the run's entry net salaries, recomputed after
    /// every entry upsert.
    pub total_amount_paid: f64,

    pub notes: Option<String>,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<NaiveDateTime>,
}

/// One payslip line: label plus rounded amount.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PayItem {
    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PayrollEntry {
    pub id: i64,
    pub payroll_run_id: i64,
    pub employee_id: i64,

    pub gross_salary: f64,
    pub net_salary: f64,

    /// Itemized allowance/deduction breakdowns, serialized [`PayItem`] lists.
    pub calculated_allowances_json: Option<String>,
    pub calculated_deductions_json: Option<String>,

    #[schema(value_type = String, format = "date", nullable = true)]
    pub payment_date: Option<NaiveDate>,

    pub payment_status: PaymentStatus,
}
