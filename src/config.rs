use chrono::NaiveTime;
use dotenvy::dotenv;
use std::env;

/// Global fallback thresholds used when a working schedule leaves a policy
/// field NULL. Built once at startup and passed into the schedule resolver.
#[derive(Debug, Clone)]
pub struct AttendanceDefaults {
    pub late_grace_min: i64,
    pub early_leave_grace_min: i64,
    pub absence_after_min: i64,
    pub standard_daily_minutes: i64,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl Default for AttendanceDefaults {
    fn default() -> Self {
        Self {
            late_grace_min: 5,
            early_leave_grace_min: 0,
            absence_after_min: 240,
            standard_daily_minutes: 480,
            start_time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 30, 0).unwrap(),
        }
    }
}

impl AttendanceDefaults {
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            late_grace_min: env_int("ATT_DEFAULT_LATE_GRACE_MIN", base.late_grace_min),
            early_leave_grace_min: env_int(
                "ATT_DEFAULT_EARLY_LEAVE_GRACE_MIN",
                base.early_leave_grace_min,
            ),
            absence_after_min: env_int("ATT_DEFAULT_ABSENCE_AFTER_MIN", base.absence_after_min),
            standard_daily_minutes: env_int(
                "ATT_DEFAULT_STANDARD_DAILY_MINUTES",
                base.standard_daily_minutes,
            ),
            start_time: env_time("ATT_DEFAULT_START_TIME", base.start_time),
            end_time: env_time("ATT_DEFAULT_END_TIME", base.end_time),
        }
    }
}

/// Which ledger year a leave span is charged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearAttribution {
    /// Charge the whole span to the year the leave starts in.
    #[default]
    StartYear,
}

/// Policy knobs of the leave balance ledger. Kept as configuration rather
/// than constants: both rules are organizational choices.
#[derive(Debug, Clone)]
pub struct LedgerPolicy {
    /// A span rounding to zero minutes still costs one standard day.
    pub minimum_one_day: bool,
    pub year_attribution: YearAttribution,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            minimum_one_day: true,
            year_attribution: YearAttribution::StartYear,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub api_prefix: String,
    pub attendance_defaults: AttendanceDefaults,
    pub ledger_policy: LedgerPolicy,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),
            attendance_defaults: AttendanceDefaults::from_env(),
            ledger_policy: LedgerPolicy {
                minimum_one_day: env_bool("LEAVE_MINIMUM_ONE_DAY", true),
                year_attribution: YearAttribution::StartYear,
            },
        }
    }
}

fn env_int(name: &str, default: i64) -> i64 {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(|v| v.max(0))
        .unwrap_or(default)
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<bool>().ok())
        .unwrap_or(default)
}

fn env_time(name: &str, default: NaiveTime) -> NaiveTime {
    env::var(name)
        .ok()
        .and_then(|v| NaiveTime::parse_from_str(v.trim(), "%H:%M").ok())
        .unwrap_or(default)
}
