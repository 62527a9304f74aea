pub mod attendance;
pub mod employee;
pub mod holiday;
pub mod leave;
pub mod overtime;
pub mod payroll;
pub mod schedule;
