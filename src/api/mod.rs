//! HTTP API surface.

mod routes;

pub use routes::{create_router, AppState};
