//! Error types
//!
//! Pool and selection problems degrade gracefully at the call site; template
//! and settings problems are raised at load time.

use thiserror::Error;

/// Object pool failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoolError {
    /// Every item is already active
    #[error("pool exhausted: all {capacity} items are active")]
    Exhausted { capacity: usize },

    /// Handle refers to an item that was pooled (and maybe reused) since
    #[error("stale pool handle (slot {index})")]
    StaleHandle { index: usize },

    /// Weighted selector entry with a negative or non-finite weight
    #[error("invalid weight {weight} for selector entry {index}")]
    InvalidWeight { index: usize, weight: f32 },
}

/// Section template defects, detected when templates are loaded
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateError {
    #[error("template `{0}` allows no formations")]
    NoEligibleFormations(String),

    #[error("template `{name}` has an invalid column range {min}..={max}")]
    InvalidColumnRange { name: String, min: usize, max: usize },

    #[error("template `{name}` has an invalid gap range {min}..={max}")]
    InvalidGapRange { name: String, min: f32, max: f32 },

    #[error("template `{name}` has an invalid power-up range {min}..={max}")]
    InvalidPowerUpRange { name: String, min: usize, max: usize },

    #[error("template `{name}` has a negative score point frequency {frequency}")]
    InvalidScorePointFrequency { name: String, frequency: f32 },

    #[error("template `{name}`: {source}")]
    InvalidWeights {
        name: String,
        #[source]
        source: PoolError,
    },

    #[error("template `{0}` spawns power-ups but their weights sum to zero")]
    ZeroWeightSum(String),

    #[error("unknown section template `{0}`")]
    UnknownTemplate(String),

    #[error("duplicate section template `{0}`")]
    DuplicateTemplate(String),
}

/// Effect sequencing failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EffectsError {
    /// Hyperdrive triggered while a sequence is still running
    #[error("hyperdrive sequence already running")]
    SequenceReentrancy,
}

/// Settings loading failures
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    Template(#[from] TemplateError),

    #[error("invalid settings: {0}")]
    Value(String),
}
