//! FlyBit - an endless side-scrolling flyer
//!
//! Core modules:
//! - `sim`: Section generation, object pooling and the hyperdrive sequence
//! - `settings`: Data-driven templates and tuning
//! - `error`: Error types

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{EffectsError, PoolError, SettingsError, TemplateError};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed frame time used by the headless loop and tests
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Sections spawn this far left of their start point so neighbouring
    /// columns overlap instead of leaving a seam
    pub const SPAWN_SEAM_OFFSET: f32 = 0.05;

    /// Duration for effects that last until removed
    pub const UNLIMITED_EFFECT_DURATION: f32 = f32::MAX;

    /// Map rebuild radius after hyperdrive, in player see radii
    pub const REBUILD_RADIUS_FACTOR: f32 = 3.0;

    /// Animator state played when hyperdrive starts
    pub const HYPERDRIVE_BEGIN_ANIMATION: &str = "Hyperdrive_Begin";
    /// Animator trigger set when hyperdrive travel ends
    pub const EXIT_HYPERDRIVE_TRIGGER: &str = "Exit Hyperdrive";
}
