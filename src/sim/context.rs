//! Collaborator interfaces
//!
//! Sections and the hyperdrive sequence talk to the map, the score keeper,
//! the player state and the presentation layer only through these traits.
//! Hosts pass them in explicitly; nothing here is a global.

use glam::Vec2;

use super::pool::PoolHandle;
use super::state::{Color, PlayerEffect, StatRecordType};

/// Shared score point supply borrowed by sections
pub trait ScorePointSource {
    /// How many more score points may be handed out right now
    fn score_points_available_to_spawn(&self) -> usize;
    /// Borrow a score point placed at world `position`
    fn get_score_point(&mut self, position: Vec2) -> Option<PoolHandle>;
    /// Give a borrowed score point back; stale handles are ignored
    fn return_score_point(&mut self, handle: PoolHandle);
}

/// The section stream as seen by effects
pub trait MapStream {
    /// How far ahead/behind the player sections are kept alive
    fn player_see_radius(&self) -> f32;
    /// Drop every section and restart the chain `radius` ahead of the
    /// origin, starting with the named template
    fn rebuild_map(&mut self, radius: f32, template: &str);
    fn move_map(&mut self, offset: Vec2);
    fn open_close_map(&mut self, open: bool);
    fn set_map_color(&mut self, color: Color);
}

/// Score and stat bookkeeping
pub trait ScoreSink {
    fn increase_score(&mut self);
    fn add_distance_traveled(&mut self, amount: f32);
    fn add_stat_record_value(&mut self, kind: StatRecordType, amount: f32);
}

/// Player fuel, effects and flags
pub trait PlayerState {
    fn add_fuel(&mut self, amount: f32);
    fn add_player_effect(&mut self, effect: PlayerEffect, duration: f32);
    fn remove_player_effect(&mut self, effect: PlayerEffect);
    /// Fuel bar fill in [0, 1]
    fn update_fuel_bar(&mut self, fraction: f32);
    fn set_invert(&mut self, invert: bool);
    /// False once the run is over; running sequences bail out
    fn is_alive(&self) -> bool;
}

/// Presentation hooks: transform, collider, camera, animator, visuals
pub trait EffectsRig {
    fn player_forward(&self) -> Vec2;
    fn set_player_forward(&mut self, forward: Vec2);
    fn player_position(&self) -> Vec2;
    fn set_player_position(&mut self, position: Vec2);
    fn set_player_collider(&mut self, enabled: bool);
    fn set_camera_tracking(&mut self, enabled: bool);
    fn play_animation(&mut self, name: &str);
    fn set_animation_trigger(&mut self, name: &str);
    /// Start/stop the speedline overlay
    fn set_speedlines(&mut self, playing: bool);
    /// Apply the black/white palette to camera, player sprite and UI
    fn apply_palette(&mut self, inverted: bool);
}

/// Everything an effect needs for one step
pub struct EffectsContext<'a> {
    pub map: &'a mut dyn MapStream,
    pub score: &'a mut dyn ScoreSink,
    pub player: &'a mut dyn PlayerState,
    pub rig: &'a mut dyn EffectsRig,
}
