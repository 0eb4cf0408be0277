//! SeaORM entity definitions.

pub mod alarm;
pub mod repair_job;
pub mod repair_report;
