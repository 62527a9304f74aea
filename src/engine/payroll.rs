//! Payroll Entry Calculator: base salary resolution, fixed and
//! formula-driven allowance/deduction items, gross/net computation and the
//! (run, employee) entry upsert.

use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};

use crate::engine::formula::eval_formula;
use crate::engine::snapshot::{self, AttendanceMetrics};
use crate::error::EngineError;
use crate::model::payroll::{ItemStatus, PayItem, PayrollEntry, PaymentStatus};

/// Money is rounded to 2 decimal places at output boundaries only.
pub fn money(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Formula variable set: attendance aggregates with their short aliases,
/// OT buckets, base salary and the derived pay rates.
pub fn formula_variables(metrics: &AttendanceMetrics, base_salary: f64) -> HashMap<String, f64> {
    let minute_rate = base_salary / 30.0 / 8.0 / 60.0;
    let hour_rate = minute_rate * 60.0;

    let late = metrics.late_minutes as f64;
    let early = metrics.early_leave_minutes as f64;
    let absent = metrics.absent_days as f64;
    let unpaid = metrics.unpaid_leave_days as f64;

    let ot1 = metrics.ot1x_minutes as f64;
    let ot15 = metrics.ot15x_minutes as f64;
    let ot30 = metrics.ot3x_minutes as f64;

    let mut vars = HashMap::new();
    vars.insert("BasicSalary".to_string(), base_salary);
    vars.insert("BASIC_SALARY".to_string(), base_salary);

    vars.insert("LateMinutes".to_string(), late);
    vars.insert("EarlyLeaveMinutes".to_string(), early);
    vars.insert("AbsenceDays".to_string(), absent);
    vars.insert("UnpaidLeaveDays".to_string(), unpaid);

    vars.insert("Late".to_string(), late);
    vars.insert("L".to_string(), late);
    vars.insert("EarlyOut".to_string(), early);
    vars.insert("E".to_string(), early);
    vars.insert("Absence".to_string(), absent);
    vars.insert("A".to_string(), absent);
    vars.insert("UnpaidLeave".to_string(), unpaid);
    vars.insert("UL".to_string(), unpaid);

    vars.insert("OTMinutes".to_string(), ot1 + ot15 + ot30);
    vars.insert("OT1Minutes".to_string(), ot1);
    vars.insert("OT1xMinutes".to_string(), ot1);
    vars.insert("OT15Minutes".to_string(), ot15);
    vars.insert("OT30Minutes".to_string(), ot30);
    vars.insert("MinuteRate".to_string(), minute_rate);
    vars.insert("HourRate".to_string(), hour_rate);

    vars
}

/// Does the formula reference a specific OT bucket variable?
fn uses_specific_ot(formula: &str) -> bool {
    formula.contains("OT1xMinutes")
        || formula.contains("OT15Minutes")
        || formula.contains("OT30Minutes")
}

async fn base_salary_for(
    conn: &mut SqliteConnection,
    employee_id: i64,
    period_end: NaiveDate,
) -> Result<f64, sqlx::Error> {
    let effective: Option<(f64,)> = sqlx::query_as(
        "SELECT base_salary FROM salary_structures \
         WHERE employee_id = ? AND effective_date <= ? \
         ORDER BY effective_date DESC, id DESC LIMIT 1",
    )
    .bind(employee_id)
    .bind(period_end)
    .fetch_optional(&mut *conn)
    .await?;
    if let Some((salary,)) = effective {
        return Ok(salary);
    }

    let any: Option<(f64,)> = sqlx::query_as(
        "SELECT base_salary FROM salary_structures \
         WHERE employee_id = ? \
         ORDER BY effective_date DESC, id DESC LIMIT 1",
    )
    .bind(employee_id)
    .fetch_optional(conn)
    .await?;
    Ok(any.map(|(salary,)| salary).unwrap_or(0.0))
}

async fn fixed_items(
    conn: &mut SqliteConnection,
    table: &str,
    join_table: &str,
    join_column: &str,
    employee_id: i64,
    period_start: NaiveDate,
    period_end: NaiveDate,
) -> Result<Vec<PayItem>, sqlx::Error> {
    let sql = format!(
        "SELECT t.name, x.amount FROM {table} x \
         JOIN {join_table} t ON t.id = x.{join_column} \
         WHERE x.employee_id = ? AND x.status = ? \
           AND x.effective_date >= ? AND x.effective_date <= ? \
         ORDER BY x.id ASC"
    );
    let rows: Vec<(String, f64)> = sqlx::query_as(&sql)
        .bind(employee_id)
        .bind(ItemStatus::Active)
        .bind(period_start)
        .bind(period_end)
        .fetch_all(conn)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(label, amount)| PayItem {
            label,
            amount: money(amount),
        })
        .collect())
}

/// Evaluates every active formula-typed allowance and deduction against the
/// period's variable set. When any configured formula references a specific
/// OT bucket, the combined `OTMinutes` variable is zeroed for the whole run
/// so overtime is not counted twice — a run-global rule, deliberately not
/// per-formula.
async fn formula_items(
    conn: &mut SqliteConnection,
    employee_id: i64,
    period_start: NaiveDate,
    period_end: NaiveDate,
    base_salary: f64,
) -> Result<(Vec<PayItem>, Vec<PayItem>), EngineError> {
    let metrics =
        snapshot::attendance_metrics_with(&mut *conn, employee_id, period_start, period_end)
            .await?;
    let mut vars = formula_variables(&metrics, base_salary);

    let allowance_types: Vec<(String, Option<String>)> = sqlx::query_as(
        "SELECT name, formula FROM allowance_types WHERE is_active = 1 ORDER BY id ASC",
    )
    .fetch_all(&mut *conn)
    .await?;
    let deduction_types: Vec<(String, Option<String>)> = sqlx::query_as(
        "SELECT name, formula FROM deduction_types WHERE is_active = 1 ORDER BY id ASC",
    )
    .fetch_all(&mut *conn)
    .await?;

    let has_specific_ot = allowance_types
        .iter()
        .chain(deduction_types.iter())
        .filter_map(|(_, f)| f.as_deref())
        .any(uses_specific_ot);
    if has_specific_ot {
        vars.insert("OTMinutes".to_string(), 0.0);
    }

    let eval_items = |types: Vec<(String, Option<String>)>| -> Vec<PayItem> {
        types
            .into_iter()
            .filter_map(|(name, formula)| {
                let formula = formula?;
                if formula.trim().is_empty() {
                    return None;
                }
                let amount = money(eval_formula(&formula, &vars));
                (amount != 0.0).then_some(PayItem {
                    label: name,
                    amount,
                })
            })
            .collect()
    };

    Ok((eval_items(allowance_types), eval_items(deduction_types)))
}

const ENTRY_COLUMNS: &str = "id, payroll_run_id, employee_id, gross_salary, net_salary, \
     calculated_allowances_json, calculated_deductions_json, payment_date, payment_status";

/// Computes and upserts the payroll entry for (run, employee), then
/// refreshes the run's denormalized total. One transaction: an unknown run
/// or employee aborts without writing anything.
pub async fn calculate_and_save_payroll_entry(
    pool: &SqlitePool,
    run_id: i64,
    employee_id: i64,
) -> Result<PayrollEntry, EngineError> {
    let mut tx = pool.begin().await?;

    let run: Option<(NaiveDate, NaiveDate)> =
        sqlx::query_as("SELECT period_start, period_end FROM payroll_runs WHERE id = ?")
            .bind(run_id)
            .fetch_optional(&mut *tx)
            .await?;
    let (period_start, period_end) = run.ok_or(EngineError::NotFound("payroll run"))?;

    let employee: Option<(i64,)> = sqlx::query_as("SELECT id FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(&mut *tx)
        .await?;
    if employee.is_none() {
        return Err(EngineError::NotFound("employee"));
    }

    let base_salary = money(base_salary_for(&mut tx, employee_id, period_end).await?);

    let mut allowances = fixed_items(
        &mut tx,
        "employee_allowances",
        "allowance_types",
        "allowance_type_id",
        employee_id,
        period_start,
        period_end,
    )
    .await?;
    let mut deductions = fixed_items(
        &mut tx,
        "employee_deductions",
        "deduction_types",
        "deduction_type_id",
        employee_id,
        period_start,
        period_end,
    )
    .await?;

    let (formula_allowances, formula_deductions) = formula_items(
        &mut tx,
        employee_id,
        period_start,
        period_end,
        base_salary,
    )
    .await?;
    allowances.extend(formula_allowances);
    deductions.extend(formula_deductions);

    let total_allowances = money(allowances.iter().map(|i| i.amount).sum());
    let total_deductions = money(deductions.iter().map(|i| i.amount).sum());
    let gross = money(base_salary + total_allowances);
    let net = money(gross - total_deductions);

    let allowances_json =
        serde_json::to_string(&allowances).map_err(|e| EngineError::Validation(e.to_string()))?;
    let deductions_json =
        serde_json::to_string(&deductions).map_err(|e| EngineError::Validation(e.to_string()))?;

    let existing: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM payroll_entries WHERE payroll_run_id = ? AND employee_id = ?",
    )
    .bind(run_id)
    .bind(employee_id)
    .fetch_optional(&mut *tx)
    .await?;

    let entry_id = match existing {
        Some((id,)) => {
            sqlx::query(
                "UPDATE payroll_entries \
                 SET gross_salary = ?, net_salary = ?, \
                     calculated_allowances_json = ?, calculated_deductions_json = ? \
                 WHERE id = ?",
            )
            .bind(gross)
            .bind(net)
            .bind(&allowances_json)
            .bind(&deductions_json)
            .bind(id)
            .execute(&mut *tx)
            .await?;
            id
        }
        None => {
            sqlx::query_scalar(
                "INSERT INTO payroll_entries \
                 (payroll_run_id, employee_id, gross_salary, net_salary, \
                  calculated_allowances_json, calculated_deductions_json, payment_status) \
                 VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
            )
            .bind(run_id)
            .bind(employee_id)
            .bind(gross)
            .bind(net)
            .bind(&allowances_json)
            .bind(&deductions_json)
            .bind(PaymentStatus::Pending)
            .fetch_one(&mut *tx)
            .await?
        }
    };

    sqlx::query(
        "UPDATE payroll_runs \
         SET total_amount_paid = (SELECT COALESCE(SUM(net_salary), 0) \
                                  FROM payroll_entries WHERE payroll_run_id = ?) \
         WHERE id = ?",
    )
    .bind(run_id)
    .bind(run_id)
    .execute(&mut *tx)
    .await?;

    let sql = format!("SELECT {ENTRY_COLUMNS} FROM payroll_entries WHERE id = ?");
    let entry: PayrollEntry = sqlx::query_as(&sql).bind(entry_id).fetch_one(&mut *tx).await?;

    tx.commit().await?;

    tracing::info!(
        run_id,
        employee_id,
        gross,
        net,
        "Payroll entry calculated"
    );
    Ok(entry)
}
