use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub async fn init_db(database_url: &str) -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .expect("Failed to connect to database")
}

/// Single-connection in-memory database, mainly for tests and local
/// experiments. One connection is mandatory: every pooled connection to
/// `sqlite::memory:` would otherwise open its own empty database.
pub async fn init_memory_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    migrate(&pool).await.expect("Failed to run migrations");
    pool
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_code TEXT NOT NULL UNIQUE,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL,
        hire_date TEXT,
        status TEXT NOT NULL DEFAULT 'active'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS working_schedules (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER REFERENCES employees(id),
        name TEXT NOT NULL,
        day_of_week TEXT NOT NULL,
        is_working_day INTEGER NOT NULL DEFAULT 1,
        start_time TEXT,
        end_time TEXT,
        break_start_time TEXT,
        break_end_time TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        is_default INTEGER NOT NULL DEFAULT 0,
        late_grace_min INTEGER,
        early_leave_grace_min INTEGER,
        absence_after_min INTEGER,
        standard_daily_minutes INTEGER,
        break_minutes_override INTEGER
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS time_entries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL REFERENCES employees(id),
        check_in_time TEXT NOT NULL,
        check_out_time TEXT,
        notes TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS holidays (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        holiday_date TEXT NOT NULL UNIQUE,
        is_recurring INTEGER NOT NULL DEFAULT 0,
        is_active INTEGER NOT NULL DEFAULT 1
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS leave_types (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        description TEXT,
        annual_quota REAL NOT NULL DEFAULT 0,
        affects_balance INTEGER NOT NULL DEFAULT 1,
        is_paid_leave INTEGER NOT NULL DEFAULT 1,
        accrue_per_year REAL NOT NULL DEFAULT 0,
        max_quota REAL NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS leave_requests (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL REFERENCES employees(id),
        leave_type_id INTEGER NOT NULL REFERENCES leave_types(id),
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        reason TEXT,
        status TEXT NOT NULL DEFAULT 'Pending',
        request_date TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS leave_balances (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL REFERENCES employees(id),
        leave_type_id INTEGER NOT NULL REFERENCES leave_types(id),
        year INTEGER NOT NULL,
        opening REAL NOT NULL DEFAULT 0,
        accrued REAL NOT NULL DEFAULT 0,
        used REAL NOT NULL DEFAULT 0,
        adjusted REAL NOT NULL DEFAULT 0,
        carry_in REAL NOT NULL DEFAULT 0,
        UNIQUE (employee_id, leave_type_id, year)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS attendance_daily (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL REFERENCES employees(id),
        day TEXT NOT NULL,
        status_code TEXT NOT NULL,
        work_minutes INTEGER NOT NULL DEFAULT 0,
        late_minutes INTEGER NOT NULL DEFAULT 0,
        early_leave_minutes INTEGER NOT NULL DEFAULT 0,
        is_paid_leave INTEGER NOT NULL DEFAULT 1,
        ot_weekday_minutes INTEGER NOT NULL DEFAULT 0,
        ot_holiday_minutes INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS ot_types (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        description TEXT,
        rate_multiplier REAL NOT NULL DEFAULT 1.0,
        is_holiday_rate INTEGER NOT NULL DEFAULT 0,
        is_active INTEGER NOT NULL DEFAULT 1
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS ot_requests (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL REFERENCES employees(id),
        ot_type_id INTEGER NOT NULL REFERENCES ot_types(id),
        start_time TEXT NOT NULL,
        end_time TEXT NOT NULL,
        reason TEXT,
        status TEXT NOT NULL DEFAULT 'Pending',
        request_date TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS allowance_types (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        description TEXT,
        is_taxable INTEGER NOT NULL DEFAULT 1,
        is_active INTEGER NOT NULL DEFAULT 1,
        formula TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS deduction_types (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        description TEXT,
        is_mandatory INTEGER NOT NULL DEFAULT 0,
        is_active INTEGER NOT NULL DEFAULT 1,
        formula TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS salary_structures (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL REFERENCES employees(id),
        base_salary REAL NOT NULL,
        effective_date TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS employee_allowances (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL REFERENCES employees(id),
        allowance_type_id INTEGER NOT NULL REFERENCES allowance_types(id),
        amount REAL NOT NULL,
        effective_date TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'ACTIVE'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS employee_deductions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL REFERENCES employees(id),
        deduction_type_id INTEGER NOT NULL REFERENCES deduction_types(id),
        amount REAL NOT NULL,
        effective_date TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'ACTIVE'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS payroll_runs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        scheme_id INTEGER,
        period_start TEXT NOT NULL,
        period_end TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'PENDING',
        total_amount_paid REAL NOT NULL DEFAULT 0,
        notes TEXT,
        created_at TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS payroll_entries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        payroll_run_id INTEGER NOT NULL REFERENCES payroll_runs(id),
        employee_id INTEGER NOT NULL REFERENCES employees(id),
        gross_salary REAL NOT NULL,
        net_salary REAL NOT NULL,
        calculated_allowances_json TEXT,
        calculated_deductions_json TEXT,
        payment_date TEXT,
        payment_status TEXT NOT NULL DEFAULT 'PENDING',
        UNIQUE (payroll_run_id, employee_id)
    )
    "#,
];

pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for stmt in SCHEMA {
        sqlx::query(stmt).execute(pool).await?;
    }
    Ok(())
}
