//! REMS repair report server library.
//!
//! Intake, persistence and notification for refrigerated container repair
//! reports. The binary in `main.rs` wires these modules into an actix-web
//! server; integration tests build the same app through [`app::configure`].

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
