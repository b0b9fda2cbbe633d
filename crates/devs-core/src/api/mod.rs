//! API types for devs-web JSON serialization.
//!
//! Table projections are converted into string-keyed, serializable shapes so any
//! client can render them. Service-level request/response bodies live in `service`.

pub mod service;
pub mod table;
