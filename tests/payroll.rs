//! OT bucket resolution and payroll entry calculation.

mod common;

use common::*;
use hrm_engine::config::AttendanceDefaults;
use hrm_engine::engine::{payroll, snapshot};
use hrm_engine::error::EngineError;
use hrm_engine::model::payroll::PayItem;

fn defaults() -> AttendanceDefaults {
    AttendanceDefaults::default()
}

fn items(json: &Option<String>) -> Vec<PayItem> {
    serde_json::from_str(json.as_deref().unwrap()).unwrap()
}

#[tokio::test]
async fn ot_fallback_clips_break_override_and_buckets_by_multiplier() {
    let pool = pool().await;
    let emp = insert_employee(&pool, "EMP-001", None).await;
    // Monday template carries a 15-minute break override
    insert_template_schedule(&pool, "Monday", true, None, None, None, None, Some(15)).await;

    let ot15 = insert_ot_type(&pool, "Weekday OT", 1.5, false).await;
    // 120 minutes on Monday evening
    insert_ot_request(
        &pool,
        emp,
        ot15,
        dt(2025, 6, 2, 18, 0),
        dt(2025, 6, 2, 20, 0),
        "Approved",
    )
    .await;

    let m = snapshot::attendance_metrics(&pool, emp, d(2025, 6, 1), d(2025, 6, 30))
        .await
        .unwrap();
    assert_eq!(m.ot15x_minutes, 105);
    assert_eq!(m.ot1x_minutes, 0);
    assert_eq!(m.ot3x_minutes, 0);
    assert_eq!(m.ot_total_minutes, 105);
    assert_eq!(m.ot_weekday_minutes, 105);
}

#[tokio::test]
async fn ot_buckets_split_by_rate_class() {
    let pool = pool().await;
    let emp = insert_employee(&pool, "EMP-001", None).await;

    let plain = insert_ot_type(&pool, "Weekend catch-up", 1.0, false).await;
    let holiday = insert_ot_type(&pool, "Holiday x3", 3.0, false).await;
    let flagged = insert_ot_type(&pool, "Special", 1.2, true).await;

    insert_ot_request(&pool, emp, plain, dt(2025, 6, 2, 18, 0), dt(2025, 6, 2, 19, 0), "Approved")
        .await;
    insert_ot_request(&pool, emp, holiday, dt(2025, 6, 3, 18, 0), dt(2025, 6, 3, 19, 30), "Approved")
        .await;
    insert_ot_request(&pool, emp, flagged, dt(2025, 6, 4, 18, 0), dt(2025, 6, 4, 18, 45), "Approved")
        .await;
    // pending requests are ignored
    insert_ot_request(&pool, emp, plain, dt(2025, 6, 5, 18, 0), dt(2025, 6, 5, 19, 0), "Pending")
        .await;

    let m = snapshot::attendance_metrics(&pool, emp, d(2025, 6, 1), d(2025, 6, 30))
        .await
        .unwrap();
    assert_eq!(m.ot1x_minutes, 60);
    // multiplier 3.0 and the explicit holiday flag both land in the 3x bucket
    assert_eq!(m.ot3x_minutes, 90 + 45);
    assert_eq!(m.ot15x_minutes, 0);
    assert_eq!(m.ot_total_minutes, 195);
}

#[tokio::test]
async fn snapshot_ot_wins_over_request_fallback() {
    let pool = pool().await;
    let defaults = defaults();
    let emp = insert_employee(&pool, "EMP-001", None).await;
    standard_week(&pool).await;
    // Thu checkout 90 minutes past the scheduled end
    insert_time_entry(&pool, emp, dt(2025, 6, 5, 8, 30), Some(dt(2025, 6, 5, 19, 0))).await;
    // a request that would contribute 60 fallback minutes
    let ot15 = insert_ot_type(&pool, "Weekday OT", 1.5, false).await;
    insert_ot_request(&pool, emp, ot15, dt(2025, 6, 2, 18, 0), dt(2025, 6, 2, 19, 0), "Approved")
        .await;

    snapshot::rebuild_attendance_range(&pool, &defaults, d(2025, 6, 2), d(2025, 6, 6), Some(emp))
        .await
        .unwrap();

    let m = snapshot::attendance_metrics(&pool, emp, d(2025, 6, 1), d(2025, 6, 30))
        .await
        .unwrap();
    assert_eq!(m.ot15x_minutes, 90);
    assert_eq!(m.ot1x_minutes, 0);
    assert_eq!(m.ot_total_minutes, 90);
}

#[tokio::test]
async fn entry_combines_base_fixed_and_formula_items() {
    let pool = pool().await;
    let defaults = defaults();
    let emp = insert_employee(&pool, "EMP-001", None).await;
    standard_week(&pool).await;

    // base 14400 makes MinuteRate exactly 1.0
    insert_salary_structure(&pool, emp, 14_400.0, d(2025, 1, 1)).await;

    // Mon: 5 late minutes past grace
    insert_time_entry(&pool, emp, dt(2025, 6, 2, 8, 40), Some(dt(2025, 6, 2, 17, 30))).await;
    snapshot::rebuild_attendance_range(&pool, &defaults, d(2025, 6, 2), d(2025, 6, 2), Some(emp))
        .await
        .unwrap();

    let transport = insert_allowance_type(&pool, "Transport", None).await;
    insert_employee_allowance(&pool, emp, transport, 500.0, d(2025, 6, 15)).await;
    insert_deduction_type(&pool, "Late penalty", Some("LateMinutes * MinuteRate")).await;
    // evaluates to zero and must be omitted from the itemization
    insert_allowance_type(&pool, "OT pay", Some("OTMinutes * MinuteRate")).await;

    let run = insert_payroll_run(&pool, d(2025, 6, 1), d(2025, 6, 30)).await;
    let entry = payroll::calculate_and_save_payroll_entry(&pool, run, emp)
        .await
        .unwrap();

    assert_eq!(entry.gross_salary, 14_900.0);
    assert_eq!(entry.net_salary, 14_895.0);

    let allowances = items(&entry.calculated_allowances_json);
    assert_eq!(allowances.len(), 1);
    assert_eq!(allowances[0].label, "Transport");
    assert_eq!(allowances[0].amount, 500.0);

    let deductions = items(&entry.calculated_deductions_json);
    assert_eq!(deductions.len(), 1);
    assert_eq!(deductions[0].label, "Late penalty");
    assert_eq!(deductions[0].amount, 5.0);

    let total: f64 = sqlx::query_scalar("SELECT total_amount_paid FROM payroll_runs WHERE id = ?")
        .bind(run)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(total, 14_895.0);
}

#[tokio::test]
async fn recalculation_upserts_the_same_entry() {
    let pool = pool().await;
    let emp = insert_employee(&pool, "EMP-001", None).await;
    insert_salary_structure(&pool, emp, 1000.0, d(2025, 1, 1)).await;
    let run = insert_payroll_run(&pool, d(2025, 6, 1), d(2025, 6, 30)).await;

    let first = payroll::calculate_and_save_payroll_entry(&pool, run, emp)
        .await
        .unwrap();
    assert_eq!(first.net_salary, 1000.0);

    // a raise effective before period end changes the recalculated entry
    insert_salary_structure(&pool, emp, 2000.0, d(2025, 6, 15)).await;
    let second = payroll::calculate_and_save_payroll_entry(&pool, run, emp)
        .await
        .unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.net_salary, 2000.0);

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM payroll_entries WHERE payroll_run_id = ? AND employee_id = ?",
    )
    .bind(run)
    .bind(emp)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);

    let total: f64 = sqlx::query_scalar("SELECT total_amount_paid FROM payroll_runs WHERE id = ?")
        .bind(run)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(total, 2000.0);
}

#[tokio::test]
async fn salary_structure_latest_effective_before_period_end_wins() {
    let pool = pool().await;
    let emp = insert_employee(&pool, "EMP-001", None).await;
    insert_salary_structure(&pool, emp, 1000.0, d(2025, 1, 1)).await;
    insert_salary_structure(&pool, emp, 2000.0, d(2025, 7, 1)).await;

    let june = insert_payroll_run(&pool, d(2025, 6, 1), d(2025, 6, 30)).await;
    let entry = payroll::calculate_and_save_payroll_entry(&pool, june, emp)
        .await
        .unwrap();
    assert_eq!(entry.gross_salary, 1000.0);

    let july = insert_payroll_run(&pool, d(2025, 7, 1), d(2025, 7, 31)).await;
    let entry = payroll::calculate_and_save_payroll_entry(&pool, july, emp)
        .await
        .unwrap();
    assert_eq!(entry.gross_salary, 2000.0);

    // only a future-dated structure: fall back to the most recent one
    let future_only = insert_employee(&pool, "EMP-002", None).await;
    insert_salary_structure(&pool, future_only, 3000.0, d(2026, 1, 1)).await;
    let entry = payroll::calculate_and_save_payroll_entry(&pool, june, future_only)
        .await
        .unwrap();
    assert_eq!(entry.gross_salary, 3000.0);
}

#[tokio::test]
async fn bucket_formulas_zero_the_combined_ot_variable() {
    let pool = pool().await;
    let emp = insert_employee(&pool, "EMP-001", None).await;
    let ot15 = insert_ot_type(&pool, "Weekday OT", 1.5, false).await;
    insert_ot_request(&pool, emp, ot15, dt(2025, 6, 2, 18, 0), dt(2025, 6, 2, 20, 0), "Approved")
        .await;

    insert_allowance_type(&pool, "Bucketed OT", Some("OT15Minutes * 2")).await;
    insert_allowance_type(&pool, "Combined OT", Some("OTMinutes * 1")).await;

    let run = insert_payroll_run(&pool, d(2025, 6, 1), d(2025, 6, 30)).await;
    let entry = payroll::calculate_and_save_payroll_entry(&pool, run, emp)
        .await
        .unwrap();

    // the combined variable is zeroed for the whole run, so only the
    // bucket-specific formula contributes
    let allowances = items(&entry.calculated_allowances_json);
    assert_eq!(allowances.len(), 1);
    assert_eq!(allowances[0].label, "Bucketed OT");
    assert_eq!(allowances[0].amount, 240.0);
    assert_eq!(entry.gross_salary, 240.0);
}

#[tokio::test]
async fn unknown_run_or_employee_is_not_found() {
    let pool = pool().await;
    let emp = insert_employee(&pool, "EMP-001", None).await;
    let run = insert_payroll_run(&pool, d(2025, 6, 1), d(2025, 6, 30)).await;

    let err = payroll::calculate_and_save_payroll_entry(&pool, 999, emp)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound("payroll run")));

    let err = payroll::calculate_and_save_payroll_entry(&pool, run, 999)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound("employee")));
}
