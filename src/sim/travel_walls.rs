//! Wall columns streaming past during hyperdrive travel
//!
//! Purely visual: a fixed pool of columns scrolls left by the distance
//! traveled each frame, new columns enter on the right while playing and
//! columns leaving on the left go back to the pool.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pool::ObjectPool;
use super::state::{Color, WallColumn};

/// Travel wall sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelWallSettings {
    pub capacity: usize,
    /// Distance between consecutive columns
    pub spacing: f32,
    /// Half the gap between top and bottom wall
    pub half_gap: f32,
}

impl Default for TravelWallSettings {
    fn default() -> Self {
        Self {
            capacity: 24,
            spacing: 2.0,
            half_gap: 3.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TravelWalls {
    columns: ObjectPool<WallColumn>,
    spacing: f32,
    half_gap: f32,
    /// Columns live in [0, view_width)
    view_width: f32,
    /// Local x of the next column to enter
    next_x: f32,
    playing: bool,
}

impl TravelWalls {
    pub fn new(settings: &TravelWallSettings) -> Self {
        let spacing = settings.spacing.max(f32::EPSILON);
        Self {
            columns: ObjectPool::new(settings.capacity, |_| WallColumn::default()),
            spacing,
            half_gap: settings.half_gap,
            view_width: settings.capacity as f32 * spacing,
            next_x: 0.0,
            playing: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn active_count(&self) -> usize {
        self.columns.active_count()
    }

    pub fn columns(&self) -> impl Iterator<Item = &WallColumn> {
        self.columns.active_items().map(|(_, column)| column)
    }

    /// Start spawning columns from the right edge
    pub fn play(&mut self) {
        self.playing = true;
        self.next_x = self.view_width - self.spacing;
        self.fill();
    }

    /// Stop spawning; columns already out keep scrolling until reset
    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Scroll everything left by `distance`
    pub fn advance(&mut self, distance: f32) {
        for column in self.columns.active_items_mut() {
            column.center.x -= distance;
        }
        self.next_x -= distance;

        let gone: Vec<_> = self
            .columns
            .active_items()
            .filter(|(_, column)| column.center.x < 0.0)
            .map(|(handle, _)| handle)
            .collect();
        for handle in gone {
            if let Err(e) = self.columns.pool_item(handle) {
                log::warn!("Travel wall column could not be pooled: {e}");
            }
        }

        if self.playing {
            self.fill();
        }
    }

    fn fill(&mut self) {
        // Skip spawn points that already scrolled out
        if self.next_x < 0.0 {
            self.next_x += ((-self.next_x) / self.spacing).ceil() * self.spacing;
        }
        while self.next_x < self.view_width {
            let Ok(handle) = self.columns.get_item() else {
                break;
            };
            if let Some(column) = self.columns.get_mut(handle) {
                column.spawn(
                    Vec2::new(self.next_x, 0.0),
                    Vec2::new(0.0, self.half_gap),
                    Vec2::new(0.0, -self.half_gap),
                );
            }
            self.next_x += self.spacing;
        }
    }

    /// Pool every column
    pub fn reset(&mut self) {
        self.playing = false;
        self.columns.pool_all_items();
    }

    pub fn set_color(&mut self, color: Color) {
        for column in self.columns.all_items_mut() {
            column.color = color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walls() -> TravelWalls {
        TravelWalls::new(&TravelWallSettings {
            capacity: 8,
            spacing: 2.0,
            half_gap: 3.0,
        })
    }

    #[test]
    fn test_play_spawns_at_right_edge() {
        let mut walls = walls();
        walls.play();
        assert_eq!(walls.active_count(), 1);
        assert_eq!(walls.columns().next().unwrap().center.x, 14.0);
    }

    #[test]
    fn test_advance_recycles_and_refills() {
        let mut walls = walls();
        walls.play();
        for _ in 0..100 {
            walls.advance(1.3);
            assert!(walls.active_count() <= 8);
            assert!(walls.columns().all(|c| (0.0..16.0).contains(&c.center.x)));
        }
        assert!(walls.active_count() >= 6);
    }

    #[test]
    fn test_stop_then_reset() {
        let mut walls = walls();
        walls.play();
        walls.advance(5.0);
        walls.stop();
        assert!(walls.active_count() > 0);
        walls.advance(100.0);
        assert_eq!(walls.active_count(), 0);

        walls.play();
        walls.reset();
        assert!(!walls.is_playing());
        assert_eq!(walls.active_count(), 0);
    }

    #[test]
    fn test_columns_leaving_view_return_to_pool() {
        let mut walls = walls();
        walls.play();
        for _ in 0..20 {
            walls.advance(2.0);
        }
        assert_eq!(walls.active_count(), 8);

        walls.stop();
        walls.advance(13.0);
        assert_eq!(walls.active_count(), 1);

        // Every pooled column is available again
        walls.play();
        for _ in 0..8 {
            walls.advance(2.0);
        }
        assert_eq!(walls.active_count(), 8);
    }

    #[test]
    fn test_set_color_reaches_pooled_columns() {
        let mut walls = walls();
        walls.set_color(Color::WHITE);
        walls.play();
        assert!(walls.columns().all(|c| c.color == Color::WHITE));
    }
}
