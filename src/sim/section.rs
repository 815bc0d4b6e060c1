//! Wall section instances
//!
//! A section owns the wall columns and power-ups for one physical slot of
//! the stream. It is built once per slot and then spawned and despawned
//! many times; score points are borrowed from the map's shared supply.

use std::rc::Rc;

use glam::Vec2;
use rand::Rng;

use super::context::ScorePointSource;
use super::formation::{self, Formation, FormationLayout, FormationParams};
use super::pool::{ObjectPool, PoolHandle};
use super::selector::WeightedPoolSelector;
use super::state::{Color, PowerUp, PowerUpKind, WallColumn};
use super::template::SectionTemplate;
use crate::consts::SPAWN_SEAM_OFFSET;
use crate::error::PoolError;

/// Handle to a power-up spawned by a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PowerUpHandle {
    pool: usize,
    item: PoolHandle,
}

/// One reusable section of walls and pickups
#[derive(Debug, Clone)]
pub struct WallSection {
    template: Rc<SectionTemplate>,
    column_width: f32,
    /// World position of the section's local origin
    position: Vec2,
    /// Local chain point for the next section
    end_point: Vec2,
    columns: ObjectPool<WallColumn>,
    power_ups: WeightedPoolSelector<PowerUp>,
    /// Borrowed from the map, returned on despawn
    score_points: Vec<PoolHandle>,
    spawned: bool,
}

impl WallSection {
    /// Size the pools from the template maxima
    pub fn new(template: Rc<SectionTemplate>, column_width: f32) -> Result<Self, PoolError> {
        let columns = ObjectPool::new(template.max_column_count, |_| WallColumn::default());
        let power_ups = WeightedPoolSelector::new(
            &template.power_up_weights(),
            template.max_power_up_count,
            |kind| PowerUp::new(*kind),
        )?;

        Ok(Self {
            template,
            column_width,
            position: Vec2::ZERO,
            end_point: Vec2::ZERO,
            columns,
            power_ups,
            score_points: Vec::new(),
            spawned: false,
        })
    }

    pub fn template(&self) -> &SectionTemplate {
        &self.template
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// World point where the next section starts
    pub fn end_point(&self) -> Vec2 {
        self.position + self.end_point
    }

    pub fn is_spawned(&self) -> bool {
        self.spawned
    }

    pub fn column_width(&self) -> f32 {
        self.column_width
    }

    /// Place the section at `start` and fill it with a fresh formation.
    ///
    /// Returns the formation used, or `None` if the template allows none.
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        start: Vec2,
        score_points: &mut dyn ScorePointSource,
        rng: &mut R,
    ) -> Option<Formation> {
        if self.spawned {
            self.despawn(score_points);
        }
        self.position = start - Vec2::new(SPAWN_SEAM_OFFSET, 0.0);

        let Some(formation) = formation::choose_formation(self.template.formations, rng) else {
            log::warn!("Template `{}` allows no formations", self.template.name);
            return None;
        };
        let column_count = formation::roll_count(
            self.template.min_column_count,
            self.template.max_column_count,
            rng,
        );
        let params = FormationParams::from_template(&self.template, self.column_width);
        let layout = formation::generate(column_count, formation, &params, rng);

        self.place_columns(&layout);
        self.spawn_interactables(&layout, score_points, rng);
        self.end_point = layout.end_point();
        self.spawned = true;

        log::debug!(
            "Spawned `{}` at {:.2}: {:?} x{}, {} score points, {} power-ups",
            self.template.name,
            self.position.x,
            formation,
            column_count,
            self.score_points.len(),
            self.power_ups.active_count()
        );
        Some(formation)
    }

    fn place_columns(&mut self, layout: &FormationLayout) {
        for placement in layout.columns() {
            let handle = match self.columns.get_item() {
                Ok(handle) => handle,
                Err(e) => {
                    log::warn!("Section `{}`: {}", self.template.name, e);
                    break;
                }
            };
            if let Some(column) = self.columns.get_mut(handle) {
                column.spawn(placement.center, placement.top, placement.bottom);
            }
        }
    }

    fn spawn_interactables<R: Rng + ?Sized>(
        &mut self,
        layout: &FormationLayout,
        score_points: &mut dyn ScorePointSource,
        rng: &mut R,
    ) {
        let column_count = layout.len();

        let score_cap =
            (column_count as f32 * self.template.max_score_point_frequency).floor() as usize;
        let rolled = if score_cap > 0 { rng.random_range(0..score_cap) } else { 0 };
        let score_count = rolled
            .min(score_points.score_points_available_to_spawn())
            .min(column_count);

        let power_up_count = formation::roll_count(
            self.template.min_power_up_count,
            self.template.max_power_up_count,
            rng,
        )
        .min(column_count - score_count);

        // Drop random columns until only the ones that get an interactable remain
        let mut indexes: Vec<usize> = (0..column_count).collect();
        let to_remove = column_count - score_count - power_up_count;
        for _ in 0..to_remove {
            indexes.remove(rng.random_range(0..indexes.len()));
        }

        for &index in &indexes[..score_count] {
            let column = layout.columns()[index];
            let (low, high) = (column.bottom.y / 2.0, column.top.y / 2.0);
            let offset = if high > low { rng.random_range(low..high) } else { low };
            let position = self.position + column.center + Vec2::new(0.0, offset);

            match score_points.get_score_point(position) {
                Some(handle) => self.score_points.push(handle),
                None => log::debug!("No score point available for `{}`", self.template.name),
            }
        }

        for &index in &indexes[score_count..] {
            let sample: f32 = rng.random();
            let Some(pool_index) = self.power_ups.pool_index(sample) else {
                log::debug!("Power-up sample {sample} selected no pool");
                continue;
            };
            let Some(pool) = self.power_ups.pool_mut(pool_index) else {
                continue;
            };
            match pool.get_item() {
                Ok(handle) => {
                    if let Some(power_up) = pool.get_mut(handle) {
                        power_up.position = layout.columns()[index].center;
                    }
                }
                Err(e) => log::warn!("Section `{}`: {}", self.template.name, e),
            }
        }
    }

    /// Pool every column and power-up and return borrowed score points.
    /// Safe to call repeatedly.
    pub fn despawn(&mut self, score_points: &mut dyn ScorePointSource) {
        self.columns.pool_all_items();
        self.clear_interactables(score_points);
        self.spawned = false;
    }

    fn clear_interactables(&mut self, score_points: &mut dyn ScorePointSource) {
        self.power_ups.pool_all();
        for handle in self.score_points.drain(..) {
            score_points.return_score_point(handle);
        }
    }

    /// Open or close every active column; opening also clears all
    /// interactables in the section
    pub fn open_close_section(&mut self, open: bool, score_points: &mut dyn ScorePointSource) {
        for column in self.columns.active_items_mut() {
            column.open_close_column(open);
        }
        if open {
            self.clear_interactables(score_points);
        }
    }

    /// Recolor every column and power-up, pooled ones included
    pub fn set_color(&mut self, color: Color) {
        for column in self.columns.all_items_mut() {
            column.color = color;
        }
        for pool in self.power_ups.pools_mut() {
            for power_up in pool.all_items_mut() {
                power_up.color = color;
            }
        }
    }

    /// True when the active columns end left of `threshold_x`
    pub fn can_despawn(&self, threshold_x: f32) -> bool {
        self.position.x + self.columns.active_count() as f32 * self.column_width < threshold_x
    }

    /// Shift the whole section; borrowed score points are moved by their owner
    pub fn translate(&mut self, offset: Vec2) {
        self.position += offset;
    }

    pub fn active_column_count(&self) -> usize {
        self.columns.active_count()
    }

    /// Active columns (section-local space)
    pub fn columns(&self) -> impl Iterator<Item = &WallColumn> {
        self.columns.active_items().map(|(_, column)| column)
    }

    /// Every column, pooled ones included
    pub fn all_columns(&self) -> impl Iterator<Item = &WallColumn> {
        self.columns.all_items()
    }

    pub fn active_power_up_count(&self) -> usize {
        self.power_ups.active_count()
    }

    /// Active power-ups (section-local positions)
    pub fn power_ups(&self) -> impl Iterator<Item = (PowerUpHandle, &PowerUp)> {
        self.power_ups
            .pools()
            .iter()
            .enumerate()
            .flat_map(|(pool, items)| {
                items
                    .active_items()
                    .map(move |(item, power_up)| (PowerUpHandle { pool, item }, power_up))
            })
    }

    /// Every power-up, pooled ones included
    pub fn all_power_ups(&self) -> impl Iterator<Item = &PowerUp> {
        self.power_ups.pools().iter().flat_map(|pool| pool.all_items())
    }

    pub fn score_points(&self) -> &[PoolHandle] {
        &self.score_points
    }

    /// Player touched a power-up: fire it once and send it back to its pool
    pub fn collect_power_up(&mut self, handle: PowerUpHandle) -> Option<PowerUpKind> {
        let pool = self.power_ups.pool_mut(handle.pool)?;
        let kind = pool.get_mut(handle.item)?.try_activate()?;
        if let Err(e) = pool.pool_item(handle.item) {
            log::warn!("Collected power-up could not be pooled: {e}");
        }
        Some(kind)
    }
}
