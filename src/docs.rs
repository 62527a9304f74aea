use crate::api::attendance::RebuildRequest;
use crate::api::leave::{AdjustBody, RejectBody, SeedBody};
use crate::engine::leave::{LeaveBalanceView, NewLeaveRequest, SeedSummary, UpdateLeaveRequest};
use crate::engine::overtime::NewOvertimeRequest;
use crate::engine::snapshot::{AttendanceMetrics, RebuildSummary};
use crate::model::attendance::{AttendanceDaily, AttendanceStatus, TimeEntry};
use crate::model::employee::Employee;
use crate::model::holiday::Holiday;
use crate::model::leave::{LeaveBalance, LeaveRequest, LeaveType, RequestStatus};
use crate::model::overtime::{OvertimeRequest, OvertimeType};
use crate::model::payroll::{PayItem, PayrollEntry, PayrollRun, PayrollRunStatus, PaymentStatus};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Engine API",
        version = "1.0.0",
        description = r#"
## Attendance & Payroll Engine

This API exposes the attendance classification and payroll computation
engine of an HR back office.

### Key Features
- **Attendance Snapshot**
  - Rebuild the classified per-day records for a date range
  - Aggregate late/early/absence and overtime-bucket metrics for a period
- **Leave Ledger**
  - Submit, edit, approve and reject leave requests with balance enforcement
  - Seed yearly opening quotas (tenure accrual), adjust balances
- **Overtime**
  - Submit overtime requests (overlap-guarded), bucketed into 1x/1.5x/3x rates
- **Payroll**
  - Calculate a payroll entry from salary structure, fixed items and
    user-authored formulas over attendance variables

### Response Format
JSON-based RESTful responses.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::rebuild,
        crate::api::attendance::metrics,

        crate::api::leave::create_leave,
        crate::api::leave::update_leave,
        crate::api::leave::approve_leave,
        crate::api::leave::reject_leave,
        crate::api::leave::list_balances,
        crate::api::leave::seed_balances,
        crate::api::leave::adjust_balance,

        crate::api::overtime::create_ot,

        crate::api::payroll::calculate_entry
    ),
    components(
        schemas(
            RebuildRequest,
            RebuildSummary,
            AttendanceMetrics,
            AttendanceDaily,
            AttendanceStatus,
            TimeEntry,
            Employee,
            Holiday,
            NewLeaveRequest,
            UpdateLeaveRequest,
            RejectBody,
            SeedBody,
            SeedSummary,
            AdjustBody,
            LeaveRequest,
            LeaveType,
            LeaveBalance,
            LeaveBalanceView,
            RequestStatus,
            NewOvertimeRequest,
            OvertimeRequest,
            OvertimeType,
            PayrollRun,
            PayrollRunStatus,
            PayrollEntry,
            PaymentStatus,
            PayItem
        )
    ),
    tags(
        (name = "Attendance", description = "Snapshot rebuild and metrics APIs"),
        (name = "Leave", description = "Leave requests and balance ledger APIs"),
        (name = "Overtime", description = "Overtime request APIs"),
        (name = "Payroll", description = "Payroll entry calculation APIs"),
    )
)]
pub struct ApiDoc;
