use thiserror::Error;

/// Hard failures surfaced by the engine. Degraded-but-reportable conditions
/// (an unmatched secondary source, a stat absent from one game's bag) are
/// carried in the output data instead and never raised here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Requested stat name is outside every league's vocabulary.
    #[error("unknown stat name: {0}")]
    UnknownStat(String),

    /// Structurally invalid primary payload; aborts the enclosing batch.
    #[error("malformed primary payload: {0}")]
    MalformedInput(String),
}
