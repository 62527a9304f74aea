//! Leave ledger lifecycle: seeding, sufficiency, approval accounting.

mod common;

use common::*;
use hrm_engine::config::{AttendanceDefaults, LedgerPolicy};
use hrm_engine::engine::leave::{
    self, NewLeaveRequest, UpdateLeaveRequest,
};
use hrm_engine::error::EngineError;
use hrm_engine::model::leave::RequestStatus;

fn defaults() -> AttendanceDefaults {
    AttendanceDefaults::default()
}

fn policy() -> LedgerPolicy {
    LedgerPolicy::default()
}

#[tokio::test]
async fn seeding_accrues_by_tenure_and_caps() {
    let pool = pool().await;
    // 3 completed years of service as of 2026-01-01
    let junior = insert_employee(&pool, "EMP-001", Some(d(2022, 6, 10))).await;
    let veteran = insert_employee(&pool, "EMP-002", Some(d(2010, 1, 5))).await;
    let annual = insert_leave_type(&pool, "Annual", 6.0, true, true, 1.0, 10.0).await;
    // not seeded: does not affect the balance
    insert_leave_type(&pool, "Sick note", 0.0, false, true, 0.0, 0.0).await;

    let summary = leave::seed_leave_balances(&pool, 2026).await.unwrap();
    assert_eq!(summary.created, 2);
    assert_eq!(summary.seeded, 2);

    let (opening, ..) = balance_row(&pool, junior, annual, 2026).await.unwrap();
    assert_eq!(opening, 9.0);

    // 6 + 15 accrued years would be 21, capped at 10
    let (opening, ..) = balance_row(&pool, veteran, annual, 2026).await.unwrap();
    assert_eq!(opening, 10.0);
}

#[tokio::test]
async fn reseeding_keeps_existing_rows() {
    let pool = pool().await;
    let emp = insert_employee(&pool, "EMP-001", Some(d(2022, 6, 10))).await;
    let annual = insert_leave_type(&pool, "Annual", 6.0, true, true, 1.0, 10.0).await;

    leave::seed_leave_balances(&pool, 2026).await.unwrap();
    leave::adjust_leave_balance(&pool, emp, annual, 2026, 1.5)
        .await
        .unwrap();

    let summary = leave::seed_leave_balances(&pool, 2026).await.unwrap();
    assert_eq!(summary.created, 0);

    let (opening, _, _, adjusted, _) = balance_row(&pool, emp, annual, 2026).await.unwrap();
    assert_eq!(opening, 9.0);
    assert_eq!(adjusted, 1.5);
}

#[tokio::test]
async fn approval_charges_and_rejection_refunds() {
    let pool = pool().await;
    let emp = insert_employee(&pool, "EMP-001", None).await;
    let annual = insert_leave_type(&pool, "Annual", 6.0, true, true, 0.0, 0.0).await;
    leave::adjust_leave_balance(&pool, emp, annual, 2025, 5.0)
        .await
        .unwrap();

    // 480 minutes = exactly one standard day
    let req = insert_leave_request(
        &pool,
        emp,
        annual,
        dt(2025, 6, 2, 9, 0),
        dt(2025, 6, 2, 17, 0),
        "Pending",
    )
    .await;

    let approved = leave::approve_leave_request(&pool, &defaults(), &policy(), req)
        .await
        .unwrap();
    assert_eq!(approved.status, RequestStatus::Approved);
    let (_, _, used, ..) = balance_row(&pool, emp, annual, 2025).await.unwrap();
    assert_eq!(used, 1.0);

    // approving again is a no-op
    leave::approve_leave_request(&pool, &defaults(), &policy(), req)
        .await
        .unwrap();
    let (_, _, used, ..) = balance_row(&pool, emp, annual, 2025).await.unwrap();
    assert_eq!(used, 1.0);

    // rejecting an approved request gives the days back
    let rejected =
        leave::reject_leave_request(&pool, &defaults(), &policy(), req, Some("overbooked".into()))
            .await
            .unwrap();
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert_eq!(rejected.reason.as_deref(), Some("overbooked"));
    let (_, _, used, ..) = balance_row(&pool, emp, annual, 2025).await.unwrap();
    assert_eq!(used, 0.0);
}

#[tokio::test]
async fn insufficient_balance_rejects_and_leaves_ledger_untouched() {
    let pool = pool().await;
    let emp = insert_employee(&pool, "EMP-001", None).await;
    let annual = insert_leave_type(&pool, "Annual", 6.0, true, true, 0.0, 0.0).await;
    leave::adjust_leave_balance(&pool, emp, annual, 2025, 1.0)
        .await
        .unwrap();

    // 960 minutes = two standard days against 1.0 available
    let req = insert_leave_request(
        &pool,
        emp,
        annual,
        dt(2025, 6, 2, 8, 0),
        dt(2025, 6, 3, 0, 0),
        "Pending",
    )
    .await;

    let err = leave::approve_leave_request(&pool, &defaults(), &policy(), req)
        .await
        .unwrap_err();
    match err {
        EngineError::InsufficientBalance {
            year,
            needed,
            available,
        } => {
            assert_eq!(year, 2025);
            assert_eq!(needed, 2.0);
            assert_eq!(available, 1.0);
        }
        other => panic!("expected InsufficientBalance, got {other:?}"),
    }

    let (_, _, used, adjusted, _) = balance_row(&pool, emp, annual, 2025).await.unwrap();
    assert_eq!(used, 0.0);
    assert_eq!(adjusted, 1.0);

    let status: String = sqlx::query_scalar("SELECT status FROM leave_requests WHERE id = ?")
        .bind(req)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "Pending");
}

#[tokio::test]
async fn zero_length_span_costs_one_day() {
    let pool = pool().await;
    let emp = insert_employee(&pool, "EMP-001", None).await;
    let annual = insert_leave_type(&pool, "Annual", 6.0, true, true, 0.0, 0.0).await;
    leave::adjust_leave_balance(&pool, emp, annual, 2025, 3.0)
        .await
        .unwrap();

    let req = insert_leave_request(
        &pool,
        emp,
        annual,
        dt(2025, 6, 2, 9, 0),
        dt(2025, 6, 2, 9, 0),
        "Pending",
    )
    .await;
    leave::approve_leave_request(&pool, &defaults(), &policy(), req)
        .await
        .unwrap();

    let (_, _, used, ..) = balance_row(&pool, emp, annual, 2025).await.unwrap();
    assert_eq!(used, 1.0);
}

#[tokio::test]
async fn non_balance_types_bypass_the_ledger() {
    let pool = pool().await;
    let emp = insert_employee(&pool, "EMP-001", None).await;
    let unpaid = insert_leave_type(&pool, "Unpaid personal", 0.0, false, false, 0.0, 0.0).await;

    let req = insert_leave_request(
        &pool,
        emp,
        unpaid,
        dt(2025, 6, 2, 0, 0),
        dt(2025, 6, 9, 0, 0),
        "Pending",
    )
    .await;
    let approved = leave::approve_leave_request(&pool, &defaults(), &policy(), req)
        .await
        .unwrap();
    assert_eq!(approved.status, RequestStatus::Approved);
    assert!(balance_row(&pool, emp, unpaid, 2025).await.is_none());
}

#[tokio::test]
async fn overlapping_requests_are_refused() {
    let pool = pool().await;
    let emp = insert_employee(&pool, "EMP-001", None).await;
    let annual = insert_leave_type(&pool, "Annual", 6.0, true, true, 0.0, 0.0).await;

    leave::create_leave_request(
        &pool,
        &defaults(),
        &policy(),
        NewLeaveRequest {
            employee_id: emp,
            leave_type_id: annual,
            start_date: dt(2025, 6, 2, 0, 0),
            end_date: dt(2025, 6, 4, 0, 0),
            reason: None,
            status: None,
        },
    )
    .await
    .unwrap();

    let err = leave::create_leave_request(
        &pool,
        &defaults(),
        &policy(),
        NewLeaveRequest {
            employee_id: emp,
            leave_type_id: annual,
            start_date: dt(2025, 6, 3, 0, 0),
            end_date: dt(2025, 6, 5, 0, 0),
            reason: None,
            status: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Overlap { .. }));

    // a back-to-back request is fine
    leave::create_leave_request(
        &pool,
        &defaults(),
        &policy(),
        NewLeaveRequest {
            employee_id: emp,
            leave_type_id: annual,
            start_date: dt(2025, 6, 4, 0, 0),
            end_date: dt(2025, 6, 6, 0, 0),
            reason: None,
            status: None,
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn editing_an_approved_span_reverses_and_reapplies() {
    let pool = pool().await;
    let emp = insert_employee(&pool, "EMP-001", None).await;
    let annual = insert_leave_type(&pool, "Annual", 6.0, true, true, 0.0, 0.0).await;
    leave::adjust_leave_balance(&pool, emp, annual, 2025, 5.0)
        .await
        .unwrap();

    let req = insert_leave_request(
        &pool,
        emp,
        annual,
        dt(2025, 6, 2, 9, 0),
        dt(2025, 6, 2, 17, 0),
        "Pending",
    )
    .await;
    leave::approve_leave_request(&pool, &defaults(), &policy(), req)
        .await
        .unwrap();

    // shrink the span to half a standard day; still approved
    leave::update_leave_request(
        &pool,
        &defaults(),
        &policy(),
        req,
        UpdateLeaveRequest {
            end_date: Some(dt(2025, 6, 2, 13, 0)),
            ..UpdateLeaveRequest::default()
        },
    )
    .await
    .unwrap();

    let (_, _, used, ..) = balance_row(&pool, emp, annual, 2025).await.unwrap();
    assert_eq!(used, 0.5);

    // un-approving restores the whole charge
    leave::update_leave_request(
        &pool,
        &defaults(),
        &policy(),
        req,
        UpdateLeaveRequest {
            status: Some(RequestStatus::Pending),
            ..UpdateLeaveRequest::default()
        },
    )
    .await
    .unwrap();
    let (_, _, used, ..) = balance_row(&pool, emp, annual, 2025).await.unwrap();
    assert_eq!(used, 0.0);
}

#[tokio::test]
async fn missing_request_is_not_found() {
    let pool = pool().await;
    let err = leave::approve_leave_request(&pool, &defaults(), &policy(), 999)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn available_recomputes_from_stored_fields() {
    let pool = pool().await;
    let emp = insert_employee(&pool, "EMP-001", Some(d(2024, 3, 1))).await;
    let annual = insert_leave_type(&pool, "Annual", 6.0, true, true, 0.0, 0.0).await;

    leave::seed_leave_balances(&pool, 2025).await.unwrap();
    leave::adjust_leave_balance(&pool, emp, annual, 2025, -1.0)
        .await
        .unwrap();
    let req = insert_leave_request(
        &pool,
        emp,
        annual,
        dt(2025, 6, 2, 9, 0),
        dt(2025, 6, 2, 17, 0),
        "Pending",
    )
    .await;
    leave::approve_leave_request(&pool, &defaults(), &policy(), req)
        .await
        .unwrap();

    let views = leave::list_leave_balances(&pool, emp, 2025).await.unwrap();
    assert_eq!(views.len(), 1);
    let v = &views[0];
    assert_eq!(v.opening, 6.0);
    assert_eq!(v.adjusted, -1.0);
    assert_eq!(v.used, 1.0);
    assert_eq!(
        v.available,
        v.opening + v.accrued + v.carry_in + v.adjusted - v.used
    );
    assert_eq!(v.available, 4.0);
}
