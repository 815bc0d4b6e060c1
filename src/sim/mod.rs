//! Simulation module
//!
//! Everything gameplay lives here and stays deterministic:
//! - Randomness only through a caller-supplied `Rng`
//! - Frame time passed in explicitly
//! - Map, score, player and presentation reached through `context` traits
//! - No rendering or platform dependencies

pub mod context;
pub mod curve;
pub mod formation;
pub mod hyperdrive;
pub mod map;
pub mod pickup;
pub mod pool;
pub mod section;
pub mod selector;
pub mod state;
pub mod template;
pub mod tracker;
pub mod travel_walls;

pub use context::{EffectsContext, EffectsRig, MapStream, PlayerState, ScorePointSource, ScoreSink};
pub use curve::BezierCurve;
pub use formation::{
    ColumnPlacement, Formation, FormationLayout, FormationParams, FormationSet, choose_formation,
    generate, roll_count,
};
pub use hyperdrive::{Effects, HyperdrivePhase, HyperdriveSettings, SequenceTimes};
pub use map::{ScorePointPool, SectionStream, StreamSettings};
pub use pickup::{PickupKind, activate};
pub use pool::{ObjectPool, PoolHandle, Poolable};
pub use section::{PowerUpHandle, WallSection};
pub use selector::WeightedPoolSelector;
pub use state::{
    Color, PlayerEffect, PowerUp, PowerUpKind, ScorePoint, StatRecordType, WallColumn,
};
pub use template::{PowerUpWeight, SectionTemplate};
pub use tracker::{HeadlessRig, MAX_FUEL, PlayerTracker, ScoreTracker};
pub use travel_walls::{TravelWallSettings, TravelWalls};
