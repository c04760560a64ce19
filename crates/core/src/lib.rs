//! Core domain types and pure logic for the logolens detection platform.
//!
//! Everything here is I/O-free: detection and frame records, session
//! summaries, logo analytics, configuration validation, and the core
//! error type. The service client lives in `logolens-client`.

pub mod config;
pub mod detection;
pub mod error;
pub mod session;
pub mod types;
