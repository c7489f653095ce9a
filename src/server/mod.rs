//! HTTP surface of the consultation backend.
//!
//! All handlers share one [`AppState`]; every outbound integration sits
//! behind a trait object inside it, so tests swap in fakes.

pub mod routes;

pub use routes::{app_router, AppState};
