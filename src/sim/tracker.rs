//! Headless score, player and presentation state
//!
//! Plain-data implementations of the collaborator traits, used by the
//! headless binary and by tests.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::context::{EffectsRig, PlayerState, ScoreSink};
use super::state::{PlayerEffect, StatRecordType};

/// Maximum fuel a player can hold
pub const MAX_FUEL: f32 = 100.0;

/// Score, distance and stat records for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreTracker {
    pub score: u64,
    pub distance_traveled: f32,
    pub stat_records: HashMap<StatRecordType, f32>,
}

impl ScoreTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stat(&self, kind: StatRecordType) -> f32 {
        self.stat_records.get(&kind).copied().unwrap_or(0.0)
    }
}

impl ScoreSink for ScoreTracker {
    fn increase_score(&mut self) {
        self.score += 1;
    }

    fn add_distance_traveled(&mut self, amount: f32) {
        self.distance_traveled += amount;
    }

    fn add_stat_record_value(&mut self, kind: StatRecordType, amount: f32) {
        *self.stat_records.entry(kind).or_insert(0.0) += amount;
    }
}

/// Player fuel and effect bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerTracker {
    pub fuel: f32,
    /// Remaining duration per active effect
    pub effects: HashMap<PlayerEffect, f32>,
    pub fuel_bar: f32,
    pub invert: bool,
    pub alive: bool,
}

impl Default for PlayerTracker {
    fn default() -> Self {
        Self {
            fuel: MAX_FUEL,
            effects: HashMap::new(),
            fuel_bar: 1.0,
            invert: false,
            alive: true,
        }
    }
}

impl PlayerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_effect(&self, effect: PlayerEffect) -> bool {
        self.effects.contains_key(&effect)
    }

    /// Count effect durations down; expired effects are removed
    pub fn tick(&mut self, dt: f32) {
        for remaining in self.effects.values_mut() {
            *remaining -= dt;
        }
        self.effects.retain(|_, remaining| *remaining > 0.0);
    }
}

impl PlayerState for PlayerTracker {
    fn add_fuel(&mut self, amount: f32) {
        self.fuel = (self.fuel + amount).clamp(0.0, MAX_FUEL);
        self.fuel_bar = self.fuel / MAX_FUEL;
    }

    fn add_player_effect(&mut self, effect: PlayerEffect, duration: f32) {
        self.effects.insert(effect, duration);
    }

    fn remove_player_effect(&mut self, effect: PlayerEffect) {
        self.effects.remove(&effect);
    }

    fn update_fuel_bar(&mut self, fraction: f32) {
        self.fuel_bar = fraction.clamp(0.0, 1.0);
    }

    fn set_invert(&mut self, invert: bool) {
        self.invert = invert;
    }

    fn is_alive(&self) -> bool {
        self.alive
    }
}

/// Recorded presentation state
#[derive(Debug, Clone)]
pub struct HeadlessRig {
    pub forward: Vec2,
    pub position: Vec2,
    pub collider_enabled: bool,
    pub camera_tracking: bool,
    pub speedlines: bool,
    pub inverted_palette: bool,
    /// Animations played and triggers set, in order
    pub animations: Vec<String>,
}

impl Default for HeadlessRig {
    fn default() -> Self {
        Self {
            forward: Vec2::X,
            position: Vec2::ZERO,
            collider_enabled: true,
            camera_tracking: true,
            speedlines: false,
            inverted_palette: false,
            animations: Vec::new(),
        }
    }
}

impl EffectsRig for HeadlessRig {
    fn player_forward(&self) -> Vec2 {
        self.forward
    }

    fn set_player_forward(&mut self, forward: Vec2) {
        self.forward = forward;
    }

    fn player_position(&self) -> Vec2 {
        self.position
    }

    fn set_player_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn set_player_collider(&mut self, enabled: bool) {
        self.collider_enabled = enabled;
    }

    fn set_camera_tracking(&mut self, enabled: bool) {
        self.camera_tracking = enabled;
    }

    fn play_animation(&mut self, name: &str) {
        self.animations.push(name.to_string());
    }

    fn set_animation_trigger(&mut self, name: &str) {
        self.animations.push(name.to_string());
    }

    fn set_speedlines(&mut self, playing: bool) {
        self.speedlines = playing;
    }

    fn apply_palette(&mut self, inverted: bool) {
        self.inverted_palette = inverted;
    }
}
