//! Pooled entities and shared game-state enums
//!
//! Entities never get destroyed: pools flip them between spawned and pooled
//! and the renderer only draws what is spawned.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pool::Poolable;

/// RGBA color used for palette swaps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// One wall column: a top and a bottom wall around a center
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WallColumn {
    /// Center in the owning section's local space
    pub center: Vec2,
    /// Top wall offset from `center`
    pub top: Vec2,
    /// Bottom wall offset from `center`
    pub bottom: Vec2,
    /// Opened columns slide their walls out of the way
    pub open: bool,
    pub visible: bool,
    pub color: Color,
}

impl WallColumn {
    pub fn spawn(&mut self, center: Vec2, top: Vec2, bottom: Vec2) {
        self.center = center;
        self.top = top;
        self.bottom = bottom;
    }

    pub fn open_close_column(&mut self, open: bool) {
        self.open = open;
    }

    /// Vertical extent of the gap (bottom edge, top edge), local space
    pub fn gap(&self) -> (f32, f32) {
        (self.center.y + self.bottom.y, self.center.y + self.top.y)
    }
}

impl Poolable for WallColumn {
    fn on_spawn(&mut self) {
        self.open = false;
        self.visible = true;
    }

    fn on_pool(&mut self) {
        self.visible = false;
        self.open = false;
    }
}

/// Power-up kinds a section can spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Swap the black/white palette
    Invert,
    /// Start a hyperdrive sequence
    Hyperdrive,
}

/// A power-up pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    /// Section-local position
    pub position: Vec2,
    /// Set on first contact so one pickup fires once
    pub activated: bool,
    pub visible: bool,
    pub color: Color,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind) -> Self {
        Self {
            kind,
            position: Vec2::ZERO,
            activated: false,
            visible: false,
            color: Color::default(),
        }
    }

    /// Mark as taken; returns the kind only on the first call per spawn
    pub fn try_activate(&mut self) -> Option<PowerUpKind> {
        if self.activated {
            return None;
        }
        self.activated = true;
        Some(self.kind)
    }
}

impl Poolable for PowerUp {
    fn on_spawn(&mut self) {
        self.activated = false;
        self.visible = true;
    }

    fn on_pool(&mut self) {
        self.visible = false;
    }
}

/// A score point pickup, shared between all sections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScorePoint {
    /// World position
    pub position: Vec2,
    pub can_be_taken: bool,
    pub visible: bool,
    pub color: Color,
}

impl Poolable for ScorePoint {
    fn on_spawn(&mut self) {
        self.can_be_taken = true;
        self.visible = true;
    }

    fn on_pool(&mut self) {
        self.can_be_taken = false;
        self.visible = false;
    }
}

/// Timed effects applied to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerEffect {
    /// Normal flight is overridden for the whole hyperdrive
    Hyperdrive,
    /// Player steers during hyperdrive travel
    HyperdriveController,
}

/// Stat records kept by the score tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatRecordType {
    HyperdrivePowerUpsTaken,
    HyperdriveDistanceTraveled,
}
