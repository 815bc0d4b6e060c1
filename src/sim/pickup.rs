//! Pickup activation
//!
//! Collecting a pickup (see `SectionStream::collect_score_point` and
//! `SectionStream::collect_power_up`) already returned it to its pool and
//! yields its kind; [`activate`] applies the effect.

use super::context::EffectsContext;
use super::hyperdrive::Effects;
use super::state::{PowerUpKind, StatRecordType};
use crate::error::EffectsError;

/// Everything the player can pick up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupKind {
    ScorePoint,
    Invert,
    Hyperdrive,
}

impl From<PowerUpKind> for PickupKind {
    fn from(kind: PowerUpKind) -> Self {
        match kind {
            PowerUpKind::Invert => PickupKind::Invert,
            PowerUpKind::Hyperdrive => PickupKind::Hyperdrive,
        }
    }
}

/// Apply a collected pickup.
///
/// A hyperdrive pickup taken while a sequence is running still counts
/// towards the stat record, but the trigger is rejected.
pub fn activate(
    kind: PickupKind,
    effects: &mut Effects,
    ctx: &mut EffectsContext,
) -> Result<(), EffectsError> {
    log::debug!("Pickup: {kind:?}");
    match kind {
        PickupKind::ScorePoint => {
            ctx.score.increase_score();
            Ok(())
        }
        PickupKind::Invert => {
            effects.toggle_invert_effect(ctx);
            Ok(())
        }
        PickupKind::Hyperdrive => {
            ctx.score
                .add_stat_record_value(StatRecordType::HyperdrivePowerUpsTaken, 1.0);
            effects.hyperdrive_travel(ctx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::hyperdrive::{HyperdrivePhase, HyperdriveSettings};
    use crate::sim::map::{SectionStream, StreamSettings};
    use crate::sim::state::PlayerEffect;
    use crate::sim::tracker::{HeadlessRig, PlayerTracker, ScoreTracker};
    use crate::settings::Settings;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct Host {
        stream: SectionStream,
        score: ScoreTracker,
        player: PlayerTracker,
        rig: HeadlessRig,
        effects: Effects,
    }

    impl Host {
        fn new() -> Self {
            let settings = Settings::default();
            Self {
                stream: SectionStream::new(StreamSettings::default(), &settings.templates).unwrap(),
                score: ScoreTracker::new(),
                player: PlayerTracker::new(),
                rig: HeadlessRig::default(),
                effects: Effects::new(HyperdriveSettings::default()),
            }
        }

        fn activate(&mut self, kind: PickupKind) -> Result<(), EffectsError> {
            let mut ctx = EffectsContext {
                map: &mut self.stream,
                score: &mut self.score,
                player: &mut self.player,
                rig: &mut self.rig,
            };
            activate(kind, &mut self.effects, &mut ctx)
        }

        fn step(&mut self, rng: &mut Pcg32) {
            let mut ctx = EffectsContext {
                map: &mut self.stream,
                score: &mut self.score,
                player: &mut self.player,
                rig: &mut self.rig,
            };
            self.effects.step(SIM_DT, &mut ctx, rng);
        }
    }

    #[test]
    fn test_power_up_kind_conversion() {
        assert_eq!(PickupKind::from(PowerUpKind::Invert), PickupKind::Invert);
        assert_eq!(PickupKind::from(PowerUpKind::Hyperdrive), PickupKind::Hyperdrive);
    }

    #[test]
    fn test_score_point_increases_score() {
        let mut host = Host::new();
        host.activate(PickupKind::ScorePoint).unwrap();
        host.activate(PickupKind::ScorePoint).unwrap();
        assert_eq!(host.score.score, 2);
    }

    #[test]
    fn test_invert_toggles_palette() {
        let mut host = Host::new();
        host.activate(PickupKind::Invert).unwrap();
        assert!(host.effects.invert_effect_is_on());
        assert!(host.player.invert);
        assert_eq!(host.stream.color(), crate::sim::state::Color::WHITE);
    }

    #[test]
    fn test_hyperdrive_records_and_triggers() {
        let mut host = Host::new();
        host.activate(PickupKind::Hyperdrive).unwrap();

        assert_eq!(host.score.stat(StatRecordType::HyperdrivePowerUpsTaken), 1.0);
        assert!(matches!(host.effects.phase(), HyperdrivePhase::Turn { .. }));
        assert!(host.player.has_effect(PlayerEffect::Hyperdrive));
        assert!(host.stream.is_open());

        assert_eq!(
            host.activate(PickupKind::Hyperdrive),
            Err(EffectsError::SequenceReentrancy)
        );
        assert_eq!(host.score.stat(StatRecordType::HyperdrivePowerUpsTaken), 2.0);
    }

    #[test]
    fn test_stream_recovers_after_aborted_hyperdrive() {
        let mut host = Host::new();
        let mut rng = Pcg32::seed_from_u64(31);
        host.stream.update(0.0, &mut rng);

        host.activate(PickupKind::Hyperdrive).unwrap();
        for _ in 0..10 {
            host.step(&mut rng);
        }
        assert!(host.stream.is_open());

        host.player.alive = false;
        host.step(&mut rng);
        assert!(!host.effects.is_running());
        assert!(!host.stream.is_open());

        host.player.alive = true;
        let mut saw_score_points = false;
        for x in 1..200 {
            host.stream.update(x as f32, &mut rng);
            assert!(host.stream.sections().all(|s| s.columns().all(|c| !c.open)));
            saw_score_points |= host.stream.score_points().active_count() > 0;
        }
        assert!(saw_score_points);
    }
}
