//! HTTP and streaming client library for the logolens detection service.
//!
//! Provides a typed REST wrapper, the chunked-stream transport for video
//! detection runs, newline framing and typed event decoding, the pure
//! session-state reducer, and the stream controller that orchestrates a
//! run and notifies observers.

pub mod api;
pub mod controller;
pub mod events;
pub mod framer;
pub mod messages;
pub mod responses;
pub mod session;
pub mod stream;
