//! Data-source adapters.
//!
//! Each provider deserializes its own payload shape and normalizes it into
//! the core's input types at this boundary, so the engine never sees
//! provider-specific structures. Every fetch has a mock-mode short-circuit
//! so the service runs offline.

pub mod secondary;
pub mod sportsdataio;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{League, PrimaryTeam, SecondaryTeam};

/// The authoritative standings provider.
#[async_trait]
pub trait PrimarySource: Send + Sync {
    fn source_id(&self) -> &'static str;

    async fn fetch_standings(&self, league: League) -> Result<Vec<PrimaryTeam>>;
}

/// An independent provider used only to corroborate the primary record.
/// Swappable per league; returning an empty set degrades verification for
/// every team instead of failing the run.
#[async_trait]
pub trait SecondarySource: Send + Sync {
    fn source_id(&self, league: League) -> &'static str;

    async fn fetch_standings(&self, league: League) -> Result<Vec<SecondaryTeam>>;
}
