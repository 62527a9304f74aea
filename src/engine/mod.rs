//! The attendance classification and payroll computation engine.
//!
//! Every public operation is a synchronous read/compute/write sequence in
//! one transaction. The engine does no locking of its own: callers must
//! serialize overlapping rebuilds or approvals racing a rebuild.

pub mod classify;
pub mod formula;
pub mod leave;
pub mod overtime;
pub mod payroll;
pub mod schedule;
pub mod snapshot;
