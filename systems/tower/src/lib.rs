#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Static defenders with a health pool that enemies wear down.

use std::time::Duration;

use glam::Vec2;
use grid_siege_core::{GridLayout, GridPoint};
use tracing::debug;

/// Window after a hit during which a tower reports itself as recently damaged.
pub const RECENT_DAMAGE_WINDOW: Duration = Duration::from_millis(500);

/// Horizontal offset applied to the health bar beyond centring it.
const HEALTH_BAR_OFFSET_X: f32 = 20.0;
/// Vertical distance from the tower anchor to the health bar's top edge.
const HEALTH_BAR_OFFSET_Y: f32 = 170.0;
const DEFAULT_HEALTH_BAR_WIDTH: f32 = 100.0;
const DEFAULT_HEALTH_BAR_HEIGHT: f32 = 10.0;

/// Geometry of the bar drawn above a tower.
///
/// Only the background size and placement are stored; the fill width is
/// derived from the tower's health whenever it is read.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealthBar {
    size: Vec2,
    position: Vec2,
}

impl HealthBar {
    /// Full size of the bar background.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Pixel position of the bar's top-left corner.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    fn anchor_to(&mut self, pixel: Vec2) {
        self.position = Vec2::new(
            pixel.x - self.size.x / 2.0 - HEALTH_BAR_OFFSET_X,
            pixel.y - HEALTH_BAR_OFFSET_Y,
        );
    }
}

impl Default for HealthBar {
    fn default() -> Self {
        Self {
            size: Vec2::new(DEFAULT_HEALTH_BAR_WIDTH, DEFAULT_HEALTH_BAR_HEIGHT),
            position: Vec2::ZERO,
        }
    }
}

/// Defensive structure anchored to a grid cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Tower {
    cell: GridPoint,
    pixel: Vec2,
    max_health: u32,
    current_health: u32,
    since_last_hit: Option<Duration>,
    health_bar: HealthBar,
}

impl Tower {
    /// Health assigned to a freshly constructed tower.
    pub const DEFAULT_MAX_HEALTH: u32 = 20;

    /// Creates a tower at the origin cell with full default health.
    #[must_use]
    pub fn new(layout: &GridLayout) -> Self {
        Self::with_max_health(Self::DEFAULT_MAX_HEALTH, layout)
    }

    /// Creates a tower at the origin cell with the provided maximum health.
    #[must_use]
    pub fn with_max_health(max_health: u32, layout: &GridLayout) -> Self {
        let mut tower = Self {
            cell: GridPoint::default(),
            pixel: Vec2::ZERO,
            max_health,
            current_health: max_health,
            since_last_hit: None,
            health_bar: HealthBar::default(),
        };
        tower.update_placement(layout);
        tower
    }

    /// Removes health, flooring at zero, and restarts the hit window.
    pub fn take_damage(&mut self, amount: u32) {
        let was_standing = !self.is_destroyed();
        self.current_health = self.current_health.saturating_sub(amount);
        self.since_last_hit = Some(Duration::ZERO);

        if was_standing && self.is_destroyed() {
            debug!(
                row = self.cell.row(),
                column = self.cell.column(),
                "tower destroyed"
            );
        }
    }

    /// Restores health, capped at the maximum.
    pub fn heal(&mut self, amount: u32) {
        self.current_health = self
            .current_health
            .saturating_add(amount)
            .min(self.max_health);
    }

    /// Advances the simulated clock used by [`Tower::recently_damaged`].
    pub fn advance(&mut self, dt: Duration) {
        if let Some(elapsed) = self.since_last_hit.as_mut() {
            *elapsed = elapsed.saturating_add(dt);
        }
    }

    /// Reports whether the last hit happened less than
    /// [`RECENT_DAMAGE_WINDOW`] of simulated time ago.
    #[must_use]
    pub fn recently_damaged(&self) -> bool {
        self.since_last_hit
            .map_or(false, |elapsed| elapsed < RECENT_DAMAGE_WINDOW)
    }

    /// Reports whether the tower has no health left.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.current_health == 0
    }

    /// Anchors the tower to a grid cell.
    pub fn set_position(&mut self, row: i32, column: i32, layout: &GridLayout) {
        self.cell = GridPoint::at(row, column);
        self.update_placement(layout);
    }

    /// Anchors the tower to the cell containing the provided pixel.
    pub fn set_pixel_position(&mut self, x: f32, y: f32, layout: &GridLayout) {
        self.cell = GridPoint::from_pixel(x, y, layout);
        self.update_placement(layout);
    }

    /// Sets the current health, clamped to the maximum.
    pub fn set_health(&mut self, health: u32) {
        self.current_health = health.min(self.max_health);
    }

    /// Alias of [`Tower::set_health`].
    pub fn set_current_health(&mut self, health: u32) {
        self.set_health(health);
    }

    /// Changes the maximum health, clamping the current health if needed.
    pub fn set_max_health(&mut self, max_health: u32) {
        self.max_health = max_health;
        self.current_health = self.current_health.min(max_health);
    }

    /// Resizes the health bar background and re-anchors it.
    pub fn set_health_bar_size(&mut self, width: f32, height: f32) {
        self.health_bar.size = Vec2::new(width, height);
        self.health_bar.anchor_to(self.pixel);
    }

    /// Grid cell the tower occupies.
    #[must_use]
    pub fn cell(&self) -> GridPoint {
        self.cell
    }

    /// Pixel centre of the tower's cell.
    #[must_use]
    pub fn pixel_position(&self) -> Vec2 {
        self.pixel
    }

    /// Remaining health.
    #[must_use]
    pub fn current_health(&self) -> u32 {
        self.current_health
    }

    /// Maximum health.
    #[must_use]
    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Remaining health as a fraction of the maximum.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.current_health as f32 / self.max_health as f32
    }

    /// Health bar background geometry.
    #[must_use]
    pub fn health_bar(&self) -> HealthBar {
        self.health_bar
    }

    /// Width of the filled portion of the health bar.
    #[must_use]
    pub fn health_bar_fill_width(&self) -> f32 {
        self.health_bar.size.x * self.health_fraction()
    }

    fn update_placement(&mut self, layout: &GridLayout) {
        self.pixel = layout.to_pixel(self.cell);
        self.health_bar.anchor_to(self.pixel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tower_starts_at_full_default_health() {
        let tower = Tower::new(&GridLayout::default());
        assert_eq!(tower.max_health(), 20);
        assert_eq!(tower.current_health(), 20);
        assert!(!tower.is_destroyed());
        assert!(!tower.recently_damaged());
    }

    #[test]
    fn health_bar_sits_above_and_left_of_anchor() {
        let layout = GridLayout::new(10, 10, 64.0, Vec2::ZERO);
        let mut tower = Tower::new(&layout);
        tower.set_position(3, 2, &layout);

        assert_eq!(tower.pixel_position(), Vec2::new(160.0, 224.0));
        assert_eq!(tower.health_bar().position(), Vec2::new(90.0, 54.0));

        tower.set_health_bar_size(40.0, 6.0);
        assert_eq!(tower.health_bar().position(), Vec2::new(120.0, 54.0));
    }

    #[test]
    fn fill_width_follows_health() {
        let mut tower = Tower::new(&GridLayout::default());
        tower.take_damage(5);
        assert_eq!(tower.health_bar_fill_width(), 75.0);
        tower.heal(2);
        assert_eq!(tower.health_bar_fill_width(), 85.0);
    }

    #[test]
    fn setters_respect_maximum() {
        let mut tower = Tower::new(&GridLayout::default());
        tower.set_health(50);
        assert_eq!(tower.current_health(), 20);
        tower.set_max_health(8);
        assert_eq!(tower.current_health(), 8);
        tower.set_current_health(3);
        assert_eq!(tower.current_health(), 3);
    }
}
