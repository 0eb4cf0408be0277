//! Submission E2E test suite.
//!
//! Drives the full `/api` surface against an in-memory SQLite database and
//! in-process mail transports. No external services are needed.
//!
//! Run with: cargo test --test submission_e2e

mod test_helpers;

mod test_notification;
mod test_persistence;
mod test_validation;
