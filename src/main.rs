//! FlyBit headless runner
//!
//! Streams sections under a constant-speed player, collects whatever the
//! player flies through and runs the hyperdrive when one is picked up.
//!
//! Usage: `flybit [seed] [settings.json]`

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use flybit::Settings;
use flybit::consts::SIM_DT;
use flybit::sim::{
    Effects, EffectsContext, HeadlessRig, PickupKind, PlayerTracker, ScoreSink, ScoreTracker,
    SectionStream, StatRecordType, activate,
};

/// Player speed in units per second
const PLAYER_SPEED: f32 = 8.0;
/// Pickup reach around the player
const PICKUP_RADIUS: f32 = 0.5;
/// Frames to simulate
const FRAMES: u32 = 60 * 60;
/// Force a hyperdrive at this frame if none was picked up
const FORCED_HYPERDRIVE_FRAME: u32 = 60 * 20;

/// One headless run
struct Run {
    stream: SectionStream,
    effects: Effects,
    score: ScoreTracker,
    player: PlayerTracker,
    rig: HeadlessRig,
    rng: Pcg32,
    player_x: f32,
    hyperdrives: u32,
}

impl Run {
    fn new(settings: Settings, seed: u64) -> Result<Self, flybit::TemplateError> {
        let stream = SectionStream::new(settings.stream.clone(), &settings.templates)?;
        let mut run = Self {
            stream,
            effects: Effects::new(settings.hyperdrive),
            score: ScoreTracker::new(),
            player: PlayerTracker::new(),
            rig: HeadlessRig::default(),
            rng: Pcg32::seed_from_u64(seed),
            player_x: 0.0,
            hyperdrives: 0,
        };
        let mut ctx = EffectsContext {
            map: &mut run.stream,
            score: &mut run.score,
            player: &mut run.player,
            rig: &mut run.rig,
        };
        run.effects.reset_all_effects(&mut ctx);
        Ok(run)
    }

    fn activate(&mut self, kind: PickupKind) {
        let mut ctx = EffectsContext {
            map: &mut self.stream,
            score: &mut self.score,
            player: &mut self.player,
            rig: &mut self.rig,
        };
        match activate(kind, &mut self.effects, &mut ctx) {
            Ok(()) if kind == PickupKind::Hyperdrive => self.hyperdrives += 1,
            Ok(()) => {}
            Err(e) => log::warn!("Pickup {kind:?} ignored: {e}"),
        }
    }

    /// Everything within reach of the player this frame
    fn touched(&self) -> Vec<Touch> {
        let player = Vec2::new(self.player_x, self.rig.position.y);
        let mut touched: Vec<Touch> = self
            .stream
            .score_points()
            .active()
            .filter(|(_, point)| point.position.distance(player) <= PICKUP_RADIUS)
            .map(|(handle, _)| Touch::ScorePoint(handle))
            .collect();

        for slot in self.stream.live_slots() {
            let Some(section) = self.stream.section(slot) else {
                continue;
            };
            for (handle, power_up) in section.power_ups() {
                let position = section.position() + power_up.position;
                if position.distance(player) <= PICKUP_RADIUS {
                    touched.push(Touch::PowerUp(slot, handle));
                }
            }
        }
        touched
    }

    fn frame(&mut self, frame: u32) {
        if self.effects.is_running() {
            let mut ctx = EffectsContext {
                map: &mut self.stream,
                score: &mut self.score,
                player: &mut self.player,
                rig: &mut self.rig,
            };
            self.effects.step(SIM_DT, &mut ctx, &mut self.rng);
            return;
        }

        self.player_x += PLAYER_SPEED * SIM_DT;
        self.score.add_distance_traveled(PLAYER_SPEED * SIM_DT);
        self.player.tick(SIM_DT);
        self.stream.update(self.player_x, &mut self.rng);

        for touch in self.touched() {
            let kind = match touch {
                Touch::ScorePoint(handle) => self
                    .stream
                    .collect_score_point(handle)
                    .then_some(PickupKind::ScorePoint),
                Touch::PowerUp(slot, handle) => self
                    .stream
                    .collect_power_up(slot, handle)
                    .map(PickupKind::from),
            };
            if let Some(kind) = kind {
                self.activate(kind);
            }
        }

        if frame == FORCED_HYPERDRIVE_FRAME && self.hyperdrives == 0 {
            log::info!("No hyperdrive picked up yet, forcing one");
            self.activate(PickupKind::Hyperdrive);
        }
    }
}

enum Touch {
    ScorePoint(flybit::sim::PoolHandle),
    PowerUp(usize, flybit::sim::PowerUpHandle),
}

fn main() {
    env_logger::init();
    log::info!("FlyBit (headless) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0xF1_B1);
    let settings = match args.next() {
        Some(path) => match Settings::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("Failed to load {path}: {e}");
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };

    let mut run = match Run::new(settings, seed) {
        Ok(run) => run,
        Err(e) => {
            log::error!("Invalid templates: {e}");
            std::process::exit(1);
        }
    };

    for frame in 0..FRAMES {
        run.frame(frame);
    }

    log::info!(
        "Seed {seed}: x={:.1} score={} distance={:.1} hyperdrives={} ({:.1} hyperdrive distance), invert={}",
        run.player_x,
        run.score.score,
        run.score.distance_traveled,
        run.hyperdrives,
        run.score.stat(StatRecordType::HyperdriveDistanceTraveled),
        run.effects.invert_effect_is_on(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_completes_with_hyperdrive() {
        let mut run = Run::new(Settings::default(), 7).unwrap();
        let mut frame = 0;
        while frame < FORCED_HYPERDRIVE_FRAME + 60 * 5 || run.effects.is_running() {
            run.frame(frame);
            frame += 1;
            assert!(frame < FRAMES);
        }

        assert!(run.hyperdrives >= 1);
        assert!(!run.effects.is_running());
        assert!(run.player_x > 0.0);
        assert!(run.score.stat(StatRecordType::HyperdrivePowerUpsTaken) >= 1.0);
        assert!(run.score.stat(StatRecordType::HyperdriveDistanceTraveled) >= 250.0);
        assert!(run.score.distance_traveled > run.player_x);
    }

    #[test]
    fn test_touch_uses_full_distance() {
        let mut run = Run::new(Settings::default(), 3).unwrap();
        for frame in 0..120 {
            run.frame(frame);
        }
        let player = Vec2::new(run.player_x, run.rig.position.y);
        for touch in run.touched() {
            if let Touch::ScorePoint(handle) = touch {
                let point = run.stream.score_points().get(handle).unwrap();
                assert!(point.position.distance(player) <= PICKUP_RADIUS);
            }
        }
    }
}
