//! Standings reconciliation and derived-statistics engine.
//!
//! Everything in here is a pure, synchronous computation over
//! already-materialized inputs: no I/O, no clocks, no shared state.
//! Providers normalize payloads before they reach this module and the
//! service layer persists what comes out.

pub mod error;
pub mod extractor;
pub mod form;
pub mod reconciler;
pub mod summary;
pub mod verifier;

pub use error::CoreError;
