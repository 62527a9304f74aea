#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use hrm_engine::db;
use sqlx::SqlitePool;

pub async fn pool() -> SqlitePool {
    db::init_memory_db().await
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn dt(y: i32, m: u32, day: u32, h: u32, mi: u32) -> NaiveDateTime {
    d(y, m, day).and_hms_opt(h, mi, 0).unwrap()
}

pub fn t(h: u32, mi: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, mi, 0).unwrap()
}

pub async fn insert_employee(
    pool: &SqlitePool,
    code: &str,
    hire_date: Option<NaiveDate>,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO employees (employee_code, first_name, last_name, email, hire_date) \
         VALUES (?, 'Test', 'User', ?, ?) RETURNING id",
    )
    .bind(code)
    .bind(format!("{}@example.com", code.to_lowercase()))
    .bind(hire_date)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Template schedule row (employee_id NULL) for one weekday.
pub async fn insert_template_schedule(
    pool: &SqlitePool,
    day_of_week: &str,
    is_working_day: bool,
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
    late_grace: Option<i64>,
    absence_after: Option<i64>,
    break_override: Option<i64>,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO working_schedules \
         (employee_id, name, day_of_week, is_working_day, start_time, end_time, \
          is_default, late_grace_min, absence_after_min, break_minutes_override) \
         VALUES (NULL, 'Standard', ?, ?, ?, ?, 1, ?, ?, ?) RETURNING id",
    )
    .bind(day_of_week)
    .bind(is_working_day)
    .bind(start)
    .bind(end)
    .bind(late_grace)
    .bind(absence_after)
    .bind(break_override)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Employee-specific schedule row, which beats the template.
pub async fn insert_employee_schedule(
    pool: &SqlitePool,
    employee_id: i64,
    day_of_week: &str,
    is_working_day: bool,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO working_schedules \
         (employee_id, name, day_of_week, is_working_day) \
         VALUES (?, 'Personal', ?, ?) RETURNING id",
    )
    .bind(employee_id)
    .bind(day_of_week)
    .bind(is_working_day)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Monday..Friday working template with 08:30-17:30 hours, 5 late-grace
/// minutes and a 240-minute absence threshold.
pub async fn standard_week(pool: &SqlitePool) {
    for dow in ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"] {
        insert_template_schedule(
            pool,
            dow,
            true,
            Some(t(8, 30)),
            Some(t(17, 30)),
            Some(5),
            Some(240),
            None,
        )
        .await;
    }
}

pub async fn insert_time_entry(
    pool: &SqlitePool,
    employee_id: i64,
    check_in: NaiveDateTime,
    check_out: Option<NaiveDateTime>,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO time_entries (employee_id, check_in_time, check_out_time) \
         VALUES (?, ?, ?) RETURNING id",
    )
    .bind(employee_id)
    .bind(check_in)
    .bind(check_out)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_holiday(
    pool: &SqlitePool,
    name: &str,
    date: NaiveDate,
    is_recurring: bool,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO holidays (name, holiday_date, is_recurring) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(date)
    .bind(is_recurring)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_leave_type(
    pool: &SqlitePool,
    name: &str,
    annual_quota: f64,
    affects_balance: bool,
    is_paid_leave: bool,
    accrue_per_year: f64,
    max_quota: f64,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO leave_types \
         (name, annual_quota, affects_balance, is_paid_leave, accrue_per_year, max_quota) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(annual_quota)
    .bind(affects_balance)
    .bind(is_paid_leave)
    .bind(accrue_per_year)
    .bind(max_quota)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_leave_request(
    pool: &SqlitePool,
    employee_id: i64,
    leave_type_id: i64,
    start: NaiveDateTime,
    end: NaiveDateTime,
    status: &str,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO leave_requests (employee_id, leave_type_id, start_date, end_date, status) \
         VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(employee_id)
    .bind(leave_type_id)
    .bind(start)
    .bind(end)
    .bind(status)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_ot_type(
    pool: &SqlitePool,
    name: &str,
    rate_multiplier: f64,
    is_holiday_rate: bool,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO ot_types (name, rate_multiplier, is_holiday_rate) \
         VALUES (?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(rate_multiplier)
    .bind(is_holiday_rate)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_ot_request(
    pool: &SqlitePool,
    employee_id: i64,
    ot_type_id: i64,
    start: NaiveDateTime,
    end: NaiveDateTime,
    status: &str,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO ot_requests (employee_id, ot_type_id, start_time, end_time, status) \
         VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(employee_id)
    .bind(ot_type_id)
    .bind(start)
    .bind(end)
    .bind(status)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_salary_structure(
    pool: &SqlitePool,
    employee_id: i64,
    base_salary: f64,
    effective_date: NaiveDate,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO salary_structures (employee_id, base_salary, effective_date) \
         VALUES (?, ?, ?) RETURNING id",
    )
    .bind(employee_id)
    .bind(base_salary)
    .bind(effective_date)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_payroll_run(
    pool: &SqlitePool,
    period_start: NaiveDate,
    period_end: NaiveDate,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO payroll_runs (period_start, period_end, status) \
         VALUES (?, ?, 'PENDING') RETURNING id",
    )
    .bind(period_start)
    .bind(period_end)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_allowance_type(
    pool: &SqlitePool,
    name: &str,
    formula: Option<&str>,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO allowance_types (name, formula) VALUES (?, ?) RETURNING id",
    )
    .bind(name)
    .bind(formula)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_deduction_type(
    pool: &SqlitePool,
    name: &str,
    formula: Option<&str>,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO deduction_types (name, formula) VALUES (?, ?) RETURNING id",
    )
    .bind(name)
    .bind(formula)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_employee_allowance(
    pool: &SqlitePool,
    employee_id: i64,
    allowance_type_id: i64,
    amount: f64,
    effective_date: NaiveDate,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO employee_allowances \
         (employee_id, allowance_type_id, amount, effective_date, status) \
         VALUES (?, ?, ?, ?, 'ACTIVE') RETURNING id",
    )
    .bind(employee_id)
    .bind(allowance_type_id)
    .bind(amount)
    .bind(effective_date)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn snapshot_rows(
    pool: &SqlitePool,
    employee_id: i64,
) -> Vec<(NaiveDate, String, i64, i64, i64, bool, i64, i64)> {
    sqlx::query_as(
        "SELECT day, status_code, work_minutes, late_minutes, early_leave_minutes, \
                is_paid_leave, ot_weekday_minutes, ot_holiday_minutes \
         FROM attendance_daily WHERE employee_id = ? ORDER BY day ASC",
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await
    .unwrap()
}

pub async fn balance_row(
    pool: &SqlitePool,
    employee_id: i64,
    leave_type_id: i64,
    year: i32,
) -> Option<(f64, f64, f64, f64, f64)> {
    sqlx::query_as(
        "SELECT opening, accrued, used, adjusted, carry_in FROM leave_balances \
         WHERE employee_id = ? AND leave_type_id = ? AND year = ?",
    )
    .bind(employee_id)
    .bind(leave_type_id)
    .bind(year)
    .fetch_optional(pool)
    .await
    .unwrap()
}
