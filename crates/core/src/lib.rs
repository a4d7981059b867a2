//! # JobSync Core
//!
//! Domain types and the pure scheduling algorithms for the JobSync
//! availability and booking engine. Everything in this crate is free of I/O:
//! the slot generator, booking validator, and route-rewrite arithmetic all
//! operate on values loaded by the callers (the `jobsync-db` repositories and
//! the `jobsync-api` handlers).

/// Booking validation against a contractor's availability
pub mod booking;
/// Error taxonomy shared across the service
pub mod errors;
/// Domain models and request/response types
pub mod models;
/// Route optimization acceptance and rewrite arithmetic
pub mod routeplan;
/// Open-slot generation over a date range
pub mod slots;
