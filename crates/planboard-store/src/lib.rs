//! [`PlanStore`](planboard_core::PlanStore) implementations.
//!
//! Two stores live here: an HTTP JSON client for the production backend and
//! an in-memory store that reproduces the backend's semantics for tests and
//! offline use.

/// HTTP JSON client for the plan backend.
pub mod http;
/// In-memory store with backend semantics and a call history.
pub mod memory;

pub use http::HttpPlanStore;
pub use memory::MemoryPlanStore;
