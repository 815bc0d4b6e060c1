//! Section stream
//!
//! Keeps a chain of wall sections alive around the player: spawns ahead,
//! recycles behind, and serves the shared score point supply. Every
//! section slot is built once up front; the stream only spawns and
//! despawns them.

use std::collections::VecDeque;
use std::rc::Rc;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::context::{MapStream, ScorePointSource};
use super::pool::{ObjectPool, PoolHandle};
use super::section::{PowerUpHandle, WallSection};
use super::state::{Color, PowerUpKind, ScorePoint};
use super::template::SectionTemplate;
use crate::error::TemplateError;

/// Stream sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    /// Horizontal distance between wall columns
    pub column_width: f32,
    /// Sections are kept spawned within this distance of the player
    pub player_see_radius: f32,
    /// Physical section slots built per template
    pub slots_per_template: usize,
    /// Score points shared by all sections
    pub score_point_capacity: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            column_width: 1.0,
            player_see_radius: 20.0,
            slots_per_template: 16,
            score_point_capacity: 48,
        }
    }
}

/// Shared pool of score points lent to sections
#[derive(Debug, Clone)]
pub struct ScorePointPool {
    pool: ObjectPool<ScorePoint>,
}

impl ScorePointPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            pool: ObjectPool::new(capacity, |_| ScorePoint::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn get(&self, handle: PoolHandle) -> Option<&ScorePoint> {
        self.pool.get(handle)
    }

    /// Spawned score points (world positions)
    pub fn active(&self) -> impl Iterator<Item = (PoolHandle, &ScorePoint)> {
        self.pool.active_items()
    }

    /// Player touched a score point: take it once and pool it.
    /// Returns true if it was taken (the caller then activates it).
    pub fn collect(&mut self, handle: PoolHandle) -> bool {
        let Some(point) = self.pool.get_mut(handle) else {
            return false;
        };
        if !point.can_be_taken {
            return false;
        }
        point.can_be_taken = false;
        self.pool.pool_item(handle).is_ok()
    }

    pub fn set_color(&mut self, color: Color) {
        for point in self.pool.all_items_mut() {
            point.color = color;
        }
    }

    pub fn translate(&mut self, offset: Vec2) {
        for point in self.pool.active_items_mut() {
            point.position += offset;
        }
    }
}

impl ScorePointSource for ScorePointPool {
    fn score_points_available_to_spawn(&self) -> usize {
        self.pool.inactive_count()
    }

    fn get_score_point(&mut self, position: Vec2) -> Option<PoolHandle> {
        let handle = self.pool.get_item().ok()?;
        if let Some(point) = self.pool.get_mut(handle) {
            point.position = position;
        }
        Some(handle)
    }

    fn return_score_point(&mut self, handle: PoolHandle) {
        // Already collected (and maybe lent out again): not ours to pool
        if let Err(e) = self.pool.pool_item(handle) {
            log::debug!("Score point not returned: {e}");
        }
    }
}

/// The chain of live wall sections
#[derive(Debug)]
pub struct SectionStream {
    settings: StreamSettings,
    templates: Vec<Rc<SectionTemplate>>,
    /// Physical slots; `slot_templates[i]` is the template of `sections[i]`
    sections: Vec<WallSection>,
    slot_templates: Vec<usize>,
    /// Spawned slots, oldest first
    live: VecDeque<usize>,
    score_points: ScorePointPool,
    /// World point where the next section starts
    next_start: Vec2,
    /// Template forced for the next spawn (after a rebuild)
    pending_template: Option<usize>,
    player_x: f32,
    open: bool,
    color: Color,
}

impl SectionStream {
    /// Validate `templates` and build every section slot
    pub fn new(settings: StreamSettings, templates: &[SectionTemplate]) -> Result<Self, TemplateError> {
        let mut shared: Vec<Rc<SectionTemplate>> = Vec::with_capacity(templates.len());
        for template in templates {
            template.validate()?;
            if shared.iter().any(|t| t.name == template.name) {
                return Err(TemplateError::DuplicateTemplate(template.name.clone()));
            }
            shared.push(Rc::new(template.clone()));
        }

        let mut sections = Vec::new();
        let mut slot_templates = Vec::new();
        for (index, template) in shared.iter().enumerate() {
            for _ in 0..settings.slots_per_template {
                let section = WallSection::new(Rc::clone(template), settings.column_width)
                    .map_err(|source| TemplateError::InvalidWeights {
                        name: template.name.clone(),
                        source,
                    })?;
                sections.push(section);
                slot_templates.push(index);
            }
        }

        log::info!(
            "Section stream: {} templates, {} slots, {} score points",
            shared.len(),
            sections.len(),
            settings.score_point_capacity
        );

        Ok(Self {
            score_points: ScorePointPool::new(settings.score_point_capacity),
            settings,
            templates: shared,
            sections,
            slot_templates,
            live: VecDeque::new(),
            next_start: Vec2::ZERO,
            pending_template: None,
            player_x: 0.0,
            open: false,
            color: Color::BLACK,
        })
    }

    pub fn settings(&self) -> &StreamSettings {
        &self.settings
    }

    pub fn template_index(&self, name: &str) -> Option<usize> {
        self.templates.iter().position(|t| t.name == name)
    }

    /// Recycle sections behind the player and spawn ahead of them
    pub fn update<R: Rng + ?Sized>(&mut self, player_x: f32, rng: &mut R) {
        self.player_x = player_x;
        let radius = self.settings.player_see_radius;

        while let Some(&slot) = self.live.front() {
            if !self.sections[slot].can_despawn(player_x - radius) {
                break;
            }
            self.sections[slot].despawn(&mut self.score_points);
            self.live.pop_front();
        }

        while self.next_start.x < player_x + radius {
            if !self.spawn_next(rng) {
                break;
            }
        }
    }

    fn spawn_next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let free_slot = |stream: &Self, template: usize| {
            (0..stream.sections.len())
                .find(|&i| stream.slot_templates[i] == template && !stream.sections[i].is_spawned())
        };

        let slot = match self.pending_template.take() {
            Some(template) => free_slot(self, template),
            None => {
                let candidates: Vec<usize> = (0..self.templates.len())
                    .filter(|&t| !self.templates[t].rebuild_only && free_slot(self, t).is_some())
                    .collect();
                if candidates.is_empty() {
                    None
                } else {
                    free_slot(self, candidates[rng.random_range(0..candidates.len())])
                }
            }
        };
        let Some(slot) = slot else {
            log::warn!("No free section slot; stream stalls at x={:.1}", self.next_start.x);
            return false;
        };

        let section = &mut self.sections[slot];
        if section.spawn(self.next_start, &mut self.score_points, rng).is_none() {
            return false;
        }
        if self.open {
            section.open_close_section(true, &mut self.score_points);
        }
        self.next_start = section.end_point();
        self.live.push_back(slot);
        true
    }

    /// Live sections, oldest first
    pub fn sections(&self) -> impl Iterator<Item = &WallSection> {
        self.live.iter().map(|&slot| &self.sections[slot])
    }

    /// Live section slot indices, oldest first
    pub fn live_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.live.iter().copied()
    }

    pub fn section(&self, slot: usize) -> Option<&WallSection> {
        self.sections.get(slot)
    }

    /// Every physical slot, spawned or not
    pub fn all_sections(&self) -> &[WallSection] {
        &self.sections
    }

    pub fn score_points(&self) -> &ScorePointPool {
        &self.score_points
    }

    pub fn next_start(&self) -> Vec2 {
        self.next_start
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn collect_score_point(&mut self, handle: PoolHandle) -> bool {
        self.score_points.collect(handle)
    }

    pub fn collect_power_up(&mut self, slot: usize, handle: PowerUpHandle) -> Option<PowerUpKind> {
        self.sections.get_mut(slot)?.collect_power_up(handle)
    }

    fn despawn_all(&mut self) {
        for slot in self.live.drain(..) {
            self.sections[slot].despawn(&mut self.score_points);
        }
    }
}

impl MapStream for SectionStream {
    fn player_see_radius(&self) -> f32 {
        self.settings.player_see_radius
    }

    fn rebuild_map(&mut self, radius: f32, template: &str) {
        self.despawn_all();
        self.open = false;
        self.pending_template = self.template_index(template);
        if self.pending_template.is_none() {
            log::warn!("Rebuild with unknown template `{template}`");
        }
        self.next_start = Vec2::new(self.player_x + radius, 0.0);
        log::info!("Map rebuilt from x={:.1} with `{template}`", self.next_start.x);
    }

    fn move_map(&mut self, offset: Vec2) {
        for &slot in &self.live {
            self.sections[slot].translate(offset);
        }
        self.score_points.translate(offset);
        self.next_start += offset;
    }

    fn open_close_map(&mut self, open: bool) {
        self.open = open;
        for &slot in &self.live {
            self.sections[slot].open_close_section(open, &mut self.score_points);
        }
    }

    fn set_map_color(&mut self, color: Color) {
        self.color = color;
        for section in &mut self.sections {
            section.set_color(color);
        }
        self.score_points.set_color(color);
    }
}
