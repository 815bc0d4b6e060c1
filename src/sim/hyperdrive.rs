//! Hyperdrive sequence and palette effects
//!
//! The hyperdrive runs over many frames as a phase state machine. The host
//! calls [`Effects::step`] once per frame; every timed phase counts its own
//! remaining time down and runs its per-frame work before handing control
//! back. Instant phases (exit, finalize) run inside the step that ends the
//! phase before them.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::context::EffectsContext;
use super::state::{Color, PlayerEffect, StatRecordType};
use super::travel_walls::{TravelWallSettings, TravelWalls};
use crate::consts::{
    EXIT_HYPERDRIVE_TRIGGER, HYPERDRIVE_BEGIN_ANIMATION, REBUILD_RADIUS_FACTOR,
    UNLIMITED_EFFECT_DURATION,
};
use crate::error::EffectsError;

/// Hyperdrive timing and travel tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HyperdriveSettings {
    /// Turn phase length, seconds
    pub animation_time: f32,
    /// Travel phase length, seconds
    pub travel_time: f32,
    /// Cool-off phase length, seconds
    pub wait_time: f32,
    /// Pause after the begin animation starts, seconds
    pub begin_pause: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Map scroll speed while cooling off, units per second
    pub cool_off_scroll_speed: f32,
    /// Template the map is rebuilt with when travel ends
    pub entry_template: String,
    pub walls: TravelWallSettings,
}

impl Default for HyperdriveSettings {
    fn default() -> Self {
        Self {
            animation_time: 1.0,
            travel_time: 1.0,
            wait_time: 0.25,
            begin_pause: 0.5,
            min_distance: 250.0,
            max_distance: 500.0,
            cool_off_scroll_speed: 15.0,
            entry_template: "hyperdrive_entry".to_string(),
            walls: TravelWallSettings::default(),
        }
    }
}

/// Where the hyperdrive sequence currently is
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HyperdrivePhase {
    Idle,
    /// Player swings round to face the travel direction
    Turn { remaining: f32, start_forward: Vec2 },
    /// Begin animation plays out
    BeginAnimation { remaining: f32 },
    /// Distance is awarded every frame
    Travel { remaining: f32, distance: f32 },
    /// Player drifts back to the origin while the map scrolls in
    CoolOff { remaining: f32, start_position: Vec2 },
}

/// Simulated time spent in each timed phase of the last (or current) run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SequenceTimes {
    pub turn: f32,
    pub begin: f32,
    pub travel: f32,
    pub cool_off: f32,
}

impl SequenceTimes {
    pub fn total(&self) -> f32 {
        self.turn + self.begin + self.travel + self.cool_off
    }
}

/// Counts a phase timer down by at most its remaining time.
/// Returns (time used, time left).
fn consume(remaining: f32, dt: f32) -> (f32, f32) {
    let used = dt.max(0.0).min(remaining.max(0.0));
    (used, (remaining - used).max(0.0))
}

/// Fraction of a phase elapsed; zero-length phases count as done
fn elapsed_fraction(remaining: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        1.0
    } else {
        (1.0 - remaining / duration).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone)]
pub struct Effects {
    settings: HyperdriveSettings,
    phase: HyperdrivePhase,
    invert_effect_is_on: bool,
    travel_walls: TravelWalls,
    times: SequenceTimes,
    /// Distance drawn for the last travel phase
    travel_distance: f32,
    /// Distance awarded so far in the last travel phase
    traveled: f32,
}

impl Effects {
    pub fn new(settings: HyperdriveSettings) -> Self {
        let travel_walls = TravelWalls::new(&settings.walls);
        Self {
            settings,
            phase: HyperdrivePhase::Idle,
            invert_effect_is_on: false,
            travel_walls,
            times: SequenceTimes::default(),
            travel_distance: 0.0,
            traveled: 0.0,
        }
    }

    pub fn settings(&self) -> &HyperdriveSettings {
        &self.settings
    }

    pub fn phase(&self) -> HyperdrivePhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase != HyperdrivePhase::Idle
    }

    pub fn invert_effect_is_on(&self) -> bool {
        self.invert_effect_is_on
    }

    pub fn travel_walls(&self) -> &TravelWalls {
        &self.travel_walls
    }

    pub fn times(&self) -> SequenceTimes {
        self.times
    }

    pub fn travel_distance(&self) -> f32 {
        self.travel_distance
    }

    pub fn traveled(&self) -> f32 {
        self.traveled
    }

    /// Back to the default palette
    pub fn reset_all_effects(&mut self, ctx: &mut EffectsContext) {
        self.invert_effect_is_on = true;
        self.toggle_invert_effect(ctx);
    }

    pub fn toggle_invert_effect(&mut self, ctx: &mut EffectsContext) {
        self.invert_effect_is_on = !self.invert_effect_is_on;
        let wall_color = if self.invert_effect_is_on {
            Color::WHITE
        } else {
            Color::BLACK
        };

        ctx.rig.apply_palette(self.invert_effect_is_on);
        self.travel_walls.set_color(wall_color);
        ctx.map.set_map_color(wall_color);
        ctx.player.set_invert(self.invert_effect_is_on);
        log::info!("Invert effect {}", if self.invert_effect_is_on { "on" } else { "off" });
    }

    /// Start the hyperdrive sequence
    pub fn hyperdrive_travel(&mut self, ctx: &mut EffectsContext) -> Result<(), EffectsError> {
        if self.is_running() {
            log::warn!("Hyperdrive triggered while running ({:?}), ignoring", self.phase);
            return Err(EffectsError::SequenceReentrancy);
        }

        ctx.rig.set_camera_tracking(false);
        ctx.player.add_fuel(f32::MAX / 2.0);
        ctx.player
            .add_player_effect(PlayerEffect::Hyperdrive, UNLIMITED_EFFECT_DURATION);
        ctx.map.open_close_map(true);

        self.times = SequenceTimes::default();
        self.travel_distance = 0.0;
        self.traveled = 0.0;
        self.phase = HyperdrivePhase::Turn {
            remaining: self.settings.animation_time,
            start_forward: ctx.rig.player_forward(),
        };
        log::info!("Hyperdrive: turn");
        Ok(())
    }

    /// Advance the running sequence by one frame of `dt` seconds
    pub fn step<R: Rng + ?Sized>(&mut self, dt: f32, ctx: &mut EffectsContext, rng: &mut R) {
        if !self.is_running() {
            return;
        }
        if !ctx.player.is_alive() {
            self.abort(ctx);
            return;
        }

        match self.phase {
            HyperdrivePhase::Idle => {}
            HyperdrivePhase::Turn {
                remaining,
                start_forward,
            } => {
                let (used, remaining) = consume(remaining, dt);
                self.times.turn += used;

                let t = elapsed_fraction(remaining, self.settings.animation_time);
                let forward = start_forward.lerp(Vec2::X, t).normalize_or(Vec2::X);
                ctx.rig.set_player_forward(forward);

                if remaining > 0.0 {
                    self.phase = HyperdrivePhase::Turn {
                        remaining,
                        start_forward,
                    };
                } else {
                    ctx.rig.play_animation(HYPERDRIVE_BEGIN_ANIMATION);
                    self.phase = HyperdrivePhase::BeginAnimation {
                        remaining: self.settings.begin_pause,
                    };
                    log::info!("Hyperdrive: begin animation");
                }
            }
            HyperdrivePhase::BeginAnimation { remaining } => {
                let (used, remaining) = consume(remaining, dt);
                self.times.begin += used;

                if remaining > 0.0 {
                    self.phase = HyperdrivePhase::BeginAnimation { remaining };
                } else {
                    self.begin_travel(ctx, rng);
                }
            }
            HyperdrivePhase::Travel {
                remaining,
                distance,
            } => {
                let (used, remaining) = consume(remaining, dt);
                self.times.travel += used;

                let frame_distance = if self.settings.travel_time > 0.0 {
                    distance * (used / self.settings.travel_time)
                } else {
                    distance
                };
                self.traveled += frame_distance;
                self.travel_walls.advance(frame_distance);

                ctx.score.add_distance_traveled(frame_distance);
                ctx.score
                    .add_stat_record_value(StatRecordType::HyperdriveDistanceTraveled, frame_distance);
                ctx.player
                    .update_fuel_bar(1.0 - elapsed_fraction(remaining, self.settings.travel_time));

                if remaining > 0.0 {
                    self.phase = HyperdrivePhase::Travel {
                        remaining,
                        distance,
                    };
                } else {
                    self.exit_travel(ctx);
                }
            }
            HyperdrivePhase::CoolOff {
                remaining,
                start_position,
            } => {
                let (used, remaining) = consume(remaining, dt);
                self.times.cool_off += used;

                let t = elapsed_fraction(remaining, self.settings.wait_time);
                ctx.rig.set_player_position(start_position.lerp(Vec2::ZERO, t));
                ctx.player.update_fuel_bar(t);
                ctx.map
                    .move_map(Vec2::new(self.settings.cool_off_scroll_speed * used, 0.0));

                if remaining > 0.0 {
                    self.phase = HyperdrivePhase::CoolOff {
                        remaining,
                        start_position,
                    };
                } else {
                    self.finalize(ctx);
                }
            }
        }
    }

    fn begin_travel<R: Rng + ?Sized>(&mut self, ctx: &mut EffectsContext, rng: &mut R) {
        ctx.player
            .add_player_effect(PlayerEffect::HyperdriveController, UNLIMITED_EFFECT_DURATION);
        ctx.rig.set_speedlines(true);
        self.travel_walls.play();

        let (min, max) = (self.settings.min_distance, self.settings.max_distance);
        let distance = if max > min {
            rng.random_range(min..max)
        } else {
            min
        };
        self.travel_distance = distance;
        self.traveled = 0.0;
        self.phase = HyperdrivePhase::Travel {
            remaining: self.settings.travel_time,
            distance,
        };
        log::info!("Hyperdrive: travel {distance:.1}");
    }

    fn exit_travel(&mut self, ctx: &mut EffectsContext) {
        ctx.rig.set_speedlines(false);
        self.travel_walls.stop();
        ctx.rig.set_player_collider(false);
        ctx.player
            .remove_player_effect(PlayerEffect::HyperdriveController);
        ctx.rig.set_animation_trigger(EXIT_HYPERDRIVE_TRIGGER);

        let radius = ctx.map.player_see_radius() * REBUILD_RADIUS_FACTOR;
        ctx.map.rebuild_map(radius, &self.settings.entry_template);

        self.phase = HyperdrivePhase::CoolOff {
            remaining: self.settings.wait_time,
            start_position: ctx.rig.player_position(),
        };
        log::info!("Hyperdrive: exit, cooling off");
    }

    fn finalize(&mut self, ctx: &mut EffectsContext) {
        self.travel_walls.reset();
        ctx.player.remove_player_effect(PlayerEffect::Hyperdrive);
        ctx.rig.set_player_collider(true);
        ctx.rig.set_camera_tracking(true);
        self.phase = HyperdrivePhase::Idle;
        log::info!("Hyperdrive: done");
    }

    /// Tear the sequence down early, leaving the player in normal flight
    pub fn abort(&mut self, ctx: &mut EffectsContext) {
        if !self.is_running() {
            return;
        }
        log::warn!("Hyperdrive aborted in {:?}", self.phase);
        // The map is only closed again by the exit rebuild
        if !matches!(self.phase, HyperdrivePhase::CoolOff { .. }) {
            ctx.map.open_close_map(false);
        }
        ctx.rig.set_speedlines(false);
        ctx.player
            .remove_player_effect(PlayerEffect::HyperdriveController);
        self.finalize(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::context::MapStream;
    use crate::sim::tracker::{HeadlessRig, PlayerTracker, ScoreTracker};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Records map calls
    #[derive(Default)]
    struct RecordingMap {
        calls: Vec<String>,
        moved: Vec2,
        color: Option<Color>,
    }

    impl MapStream for RecordingMap {
        fn player_see_radius(&self) -> f32 {
            20.0
        }

        fn rebuild_map(&mut self, radius: f32, template: &str) {
            self.calls.push(format!("rebuild {radius} {template}"));
        }

        fn move_map(&mut self, offset: Vec2) {
            self.moved += offset;
        }

        fn open_close_map(&mut self, open: bool) {
            self.calls.push(format!("open {open}"));
        }

        fn set_map_color(&mut self, color: Color) {
            self.color = Some(color);
        }
    }

    struct Rig {
        map: RecordingMap,
        score: ScoreTracker,
        player: PlayerTracker,
        rig: HeadlessRig,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                map: RecordingMap::default(),
                score: ScoreTracker::new(),
                player: PlayerTracker::new(),
                rig: HeadlessRig::default(),
            }
        }

        fn ctx(&mut self) -> EffectsContext<'_> {
            EffectsContext {
                map: &mut self.map,
                score: &mut self.score,
                player: &mut self.player,
                rig: &mut self.rig,
            }
        }
    }

    fn settings() -> HyperdriveSettings {
        HyperdriveSettings {
            animation_time: 1.0,
            travel_time: 1.0,
            wait_time: 0.25,
            ..Default::default()
        }
    }

    /// Steps until idle, returns the number of frames
    fn run(effects: &mut Effects, rig: &mut Rig, rng: &mut Pcg32) -> usize {
        let mut frames = 0;
        while effects.is_running() {
            effects.step(SIM_DT, &mut rig.ctx(), rng);
            frames += 1;
            assert!(frames < 10_000, "sequence never finished");
        }
        frames
    }

    #[test]
    fn test_trigger_prelude() {
        let mut rig = Rig::new();
        rig.player.fuel = 10.0;
        let mut effects = Effects::new(settings());

        effects.hyperdrive_travel(&mut rig.ctx()).unwrap();

        assert!(!rig.rig.camera_tracking);
        assert_eq!(rig.player.fuel, crate::sim::tracker::MAX_FUEL);
        assert!(rig.player.has_effect(PlayerEffect::Hyperdrive));
        assert_eq!(rig.map.calls, vec!["open true"]);
        assert!(matches!(effects.phase(), HyperdrivePhase::Turn { .. }));
    }

    #[test]
    fn test_retrigger_rejected() {
        let mut rig = Rig::new();
        let mut effects = Effects::new(settings());
        effects.hyperdrive_travel(&mut rig.ctx()).unwrap();
        let phase = effects.phase();

        assert_eq!(
            effects.hyperdrive_travel(&mut rig.ctx()),
            Err(EffectsError::SequenceReentrancy)
        );
        assert_eq!(effects.phase(), phase);
        assert_eq!(rig.map.calls.len(), 1);
    }

    #[test]
    fn test_full_sequence_timing_and_distance() {
        let mut rig = Rig::new();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut effects = Effects::new(settings());

        effects.hyperdrive_travel(&mut rig.ctx()).unwrap();
        run(&mut effects, &mut rig, &mut rng);

        let times = effects.times();
        let timed = times.turn + times.travel + times.cool_off;
        assert!((timed - 2.25).abs() <= SIM_DT, "timed phases took {timed}");
        assert!((times.begin - 0.5).abs() <= SIM_DT);

        let drawn = effects.travel_distance();
        assert!((250.0..500.0).contains(&drawn));
        assert!((effects.traveled() - drawn).abs() < drawn * 1e-4);
        assert!((rig.score.distance_traveled - drawn).abs() < drawn * 1e-4);
        assert!(
            (rig.score.stat(StatRecordType::HyperdriveDistanceTraveled) - drawn).abs()
                < drawn * 1e-4
        );
    }

    #[test]
    fn test_exit_and_finalize_effects() {
        let mut rig = Rig::new();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut effects = Effects::new(settings());
        rig.rig.position = Vec2::new(4.0, -2.0);
        rig.rig.forward = Vec2::Y;

        effects.hyperdrive_travel(&mut rig.ctx()).unwrap();
        run(&mut effects, &mut rig, &mut rng);

        assert_eq!(
            rig.rig.animations,
            vec![HYPERDRIVE_BEGIN_ANIMATION, EXIT_HYPERDRIVE_TRIGGER]
        );
        assert_eq!(rig.map.calls[1], "rebuild 60 hyperdrive_entry");
        assert!((rig.rig.forward - Vec2::X).length() < 1e-5);
        assert!(rig.rig.position.length() < 1e-5);
        assert!((rig.map.moved.x - 15.0 * 0.25).abs() < 1e-3);
        assert_eq!(rig.player.fuel_bar, 1.0);

        assert!(!rig.player.has_effect(PlayerEffect::Hyperdrive));
        assert!(!rig.player.has_effect(PlayerEffect::HyperdriveController));
        assert!(rig.rig.collider_enabled);
        assert!(rig.rig.camera_tracking);
        assert!(!rig.rig.speedlines);
        assert_eq!(effects.travel_walls().active_count(), 0);
    }

    #[test]
    fn test_travel_phase_engages_effects() {
        let mut rig = Rig::new();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut effects = Effects::new(settings());

        effects.hyperdrive_travel(&mut rig.ctx()).unwrap();
        while !matches!(effects.phase(), HyperdrivePhase::Travel { .. }) {
            effects.step(SIM_DT, &mut rig.ctx(), &mut rng);
        }
        effects.step(SIM_DT, &mut rig.ctx(), &mut rng);

        assert!(rig.player.has_effect(PlayerEffect::HyperdriveController));
        assert!(rig.rig.speedlines);
        assert!(effects.travel_walls().is_playing());
        assert!(rig.player.fuel_bar < 1.0);
        assert!(rig.score.distance_traveled > 0.0);
    }

    #[test]
    fn test_abort_when_player_dies() {
        let mut rig = Rig::new();
        let mut rng = Pcg32::seed_from_u64(9);
        let mut effects = Effects::new(settings());

        effects.hyperdrive_travel(&mut rig.ctx()).unwrap();
        for _ in 0..100 {
            effects.step(SIM_DT, &mut rig.ctx(), &mut rng);
        }
        assert!(matches!(effects.phase(), HyperdrivePhase::Travel { .. }));

        rig.player.alive = false;
        effects.step(SIM_DT, &mut rig.ctx(), &mut rng);

        assert!(!effects.is_running());
        assert!(!rig.player.has_effect(PlayerEffect::Hyperdrive));
        assert!(!rig.player.has_effect(PlayerEffect::HyperdriveController));
        assert!(!rig.rig.speedlines);
        assert!(rig.rig.camera_tracking);
        assert_eq!(effects.travel_walls().active_count(), 0);
        assert_eq!(rig.map.calls, vec!["open true", "open false"]);
    }

    #[test]
    fn test_abort_during_cool_off_keeps_rebuilt_map() {
        let mut rig = Rig::new();
        let mut rng = Pcg32::seed_from_u64(10);
        let mut effects = Effects::new(settings());

        effects.hyperdrive_travel(&mut rig.ctx()).unwrap();
        while !matches!(effects.phase(), HyperdrivePhase::CoolOff { .. }) {
            effects.step(SIM_DT, &mut rig.ctx(), &mut rng);
        }
        rig.player.alive = false;
        effects.step(SIM_DT, &mut rig.ctx(), &mut rng);

        assert!(!effects.is_running());
        assert_eq!(rig.map.calls, vec!["open true", "rebuild 60 hyperdrive_entry"]);
    }

    #[test]
    fn test_zero_length_phases_finish() {
        let mut rig = Rig::new();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut effects = Effects::new(HyperdriveSettings {
            animation_time: 0.0,
            travel_time: 0.0,
            wait_time: 0.0,
            begin_pause: 0.0,
            ..Default::default()
        });

        effects.hyperdrive_travel(&mut rig.ctx()).unwrap();
        let frames = run(&mut effects, &mut rig, &mut rng);

        assert_eq!(frames, 4);
        assert!((rig.score.distance_traveled - effects.travel_distance()).abs() < 1e-3);
    }

    #[test]
    fn test_toggle_invert_effect() {
        let mut rig = Rig::new();
        let mut effects = Effects::new(settings());

        effects.reset_all_effects(&mut rig.ctx());
        assert!(!effects.invert_effect_is_on());
        assert_eq!(rig.map.color, Some(Color::BLACK));
        assert!(!rig.player.invert);

        effects.toggle_invert_effect(&mut rig.ctx());
        assert!(effects.invert_effect_is_on());
        assert_eq!(rig.map.color, Some(Color::WHITE));
        assert!(rig.player.invert);
        assert!(rig.rig.inverted_palette);

        effects.reset_all_effects(&mut rig.ctx());
        assert!(!effects.invert_effect_is_on());
        assert!(!rig.rig.inverted_palette);
    }
}
