//! Statline backend library
//!
//! Exposes the reconciliation core and the service-layer modules for use
//! by the binary and integration tests.

pub mod api;
pub mod core;
pub mod models;
pub mod picks;
pub mod providers;
pub mod storage;
