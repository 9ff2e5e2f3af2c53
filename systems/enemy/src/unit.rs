//! Per-enemy simulation state and its Walk, Attack, Death lifecycle.

use std::time::Duration;

use glam::Vec2;
use grid_siege_core::{
    AnimationSet, EnemyKind, Facing, GridLayout, GridPoint, PathRoute, StatTable,
    WalkabilityGrid,
};
use grid_siege_system_pathfinding::compute_path;
use tracing::{debug, trace};

use crate::animation::{Animation, FrameRect};

/// Speed assigned to a unit that has been constructed but not initialised.
const UNINITIALISED_SPEED: f32 = 3.0;
/// Divisor applied to the frame height to place the sprite origin near the feet.
const ORIGIN_HEIGHT_DIVISOR: f32 = 1.25;

/// Animation state driving an enemy sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyState {
    /// Advancing along the route with a looping animation.
    Walk,
    /// Playing a single attack against a target.
    Attack,
    /// Playing the terminal death animation.
    Death,
}

/// Presentation data a renderer needs to draw the enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteState {
    /// Pixel position of the sprite anchor.
    pub position: Vec2,
    /// Scale applied to the sprite; a negative x mirrors it.
    pub scale: Vec2,
    /// Pixel offset of the anchor inside the current frame.
    pub origin: Vec2,
}

impl Default for SpriteState {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            origin: Vec2::ZERO,
        }
    }
}

/// A single enemy travelling toward the goal.
#[derive(Clone, Debug)]
pub struct EnemyUnit {
    kind: EnemyKind,
    start: GridPoint,
    end: GridPoint,
    current: GridPoint,
    position: Vec2,
    health: u32,
    max_health: u32,
    speed: f32,
    reward: u32,
    touch_damage: u32,
    facing_scale: f32,
    facing: Facing,
    route: PathRoute,
    current_target: usize,
    state: EnemyState,
    animation: Animation,
    animations: AnimationSet,
    sprite: SpriteState,
    reached_end: bool,
    is_dead: bool,
    is_attack: bool,
    has_damaged_tower: bool,
    reward_given: bool,
}

impl EnemyUnit {
    /// Creates an enemy bound to the provided route endpoints.
    ///
    /// The unit carries placeholder stats until [`EnemyUnit::init`] is called.
    #[must_use]
    pub fn new(start: GridPoint, end: GridPoint, current: GridPoint) -> Self {
        let animations = AnimationSet::default();
        let defaults = StatTable::default().get(EnemyKind::FastScout);

        let mut unit = Self {
            kind: EnemyKind::FastScout,
            start,
            end,
            current,
            position: Vec2::ZERO,
            health: defaults.health,
            max_health: defaults.health,
            speed: UNINITIALISED_SPEED,
            reward: 0,
            touch_damage: defaults.touch_damage,
            facing_scale: defaults.facing_scale,
            facing: Facing::Right,
            route: PathRoute::empty(),
            current_target: 1,
            state: EnemyState::Walk,
            animation: Animation::new(animations.walk, true),
            animations,
            sprite: SpriteState::default(),
            reached_end: false,
            is_dead: false,
            is_attack: false,
            has_damaged_tower: false,
            reward_given: false,
        };
        unit.start_walk();
        unit
    }

    /// Constructs an enemy at `start` heading to `end`, initialised from the
    /// kind's stats and placed at the pixel centre of `start`.
    #[must_use]
    pub fn spawn(
        kind: EnemyKind,
        start: GridPoint,
        end: GridPoint,
        layout: &GridLayout,
        animations: &AnimationSet,
        stats: &StatTable,
    ) -> Self {
        let mut unit = Self::new(start, end, start);
        let pixel = layout.to_pixel(start);
        unit.init(kind, pixel.x, pixel.y, stats.get(kind).health, animations, stats);
        unit
    }

    /// Initialises the enemy for a fresh spawn.
    pub fn init(
        &mut self,
        kind: EnemyKind,
        x: f32,
        y: f32,
        hit_points: u32,
        animations: &AnimationSet,
        stats: &StatTable,
    ) {
        let stats = stats.get(kind);

        self.kind = kind;
        self.position = Vec2::new(x, y);
        self.health = hit_points;
        self.max_health = hit_points;
        self.speed = stats.speed;
        self.reward = stats.reward;
        self.touch_damage = stats.touch_damage;
        self.facing_scale = stats.facing_scale;
        self.facing = Facing::Right;
        self.animations = animations.clone();
        self.sprite.scale = animations.scale;
        self.sprite.position = self.position;
        self.reached_end = false;
        self.is_dead = false;
        self.is_attack = false;
        self.has_damaged_tower = false;
        self.reward_given = false;

        self.start_walk();
    }

    /// Computes and stores a fresh route from the unit's start to its end.
    ///
    /// Any previous route is replaced and the target waypoint index is reset
    /// to the first cell after the start.
    pub fn find_path(&mut self, grid: &WalkabilityGrid) -> &PathRoute {
        let route = compute_path(grid, self.start, self.end);
        self.set_route(route);
        &self.route
    }

    /// Replaces the unit's route with one computed elsewhere.
    pub fn set_route(&mut self, route: PathRoute) {
        self.route = route;
        self.current_target = 1;
    }

    /// Places the unit at an absolute pixel position.
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
        self.sync_sprite();
    }

    /// Offsets the unit's pixel position.
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.position += Vec2::new(dx, dy);
        self.sync_sprite();
    }

    /// Applies damage, entering [`EnemyState::Death`] when health runs out.
    ///
    /// Damage received while dying is ignored.
    pub fn take_damage(&mut self, amount: u32) {
        if self.state == EnemyState::Death {
            return;
        }

        self.health = self.health.saturating_sub(amount);
        trace!(kind = %self.kind, amount, health = self.health, "enemy damaged");
        if self.health == 0 {
            self.start_death();
        }
    }

    /// Starts an attack. Only a walking unit can attack.
    pub fn trigger_attack(&mut self) {
        if self.state != EnemyState::Walk {
            return;
        }

        self.start_attack();
    }

    /// Returns an attacking unit to its walk cycle.
    pub fn resume_walk(&mut self) {
        if self.state == EnemyState::Death {
            return;
        }

        self.start_walk();
    }

    /// Advances the active animation, raising completion flags when a one-shot
    /// animation finishes.
    pub fn update_animation(&mut self, dt: Duration) {
        if self.state == EnemyState::Death && self.is_dead {
            return;
        }

        self.animation.update(dt);

        if !self.animation.is_finished() {
            return;
        }

        match self.state {
            EnemyState::Death => {
                self.is_dead = true;
                debug!(kind = %self.kind, "enemy death animation finished");
            }
            EnemyState::Attack => self.is_attack = true,
            EnemyState::Walk => {}
        }
    }

    /// Turns the sprite to face left.
    pub fn face_left(&mut self) {
        self.facing = Facing::Left;
        self.sprite.scale = Vec2::new(-self.facing_scale, self.facing_scale);
    }

    /// Turns the sprite to face right.
    pub fn face_right(&mut self) {
        self.facing = Facing::Right;
        self.sprite.scale = Vec2::new(self.facing_scale, self.facing_scale);
    }

    /// Grants the reward once the death animation has completed.
    ///
    /// Returns `None` while the unit is alive or when the reward was already
    /// claimed.
    pub fn claim_reward(&mut self) -> Option<u32> {
        if !self.is_dead || self.reward_given {
            return None;
        }

        self.reward_given = true;
        Some(self.reward)
    }

    /// Records that the current attack already damaged a tower.
    pub fn mark_tower_damaged(&mut self) {
        self.has_damaged_tower = true;
    }

    /// Moves the waypoint index used by steering.
    pub fn set_current_target(&mut self, index: usize) {
        self.current_target = index;
    }

    /// Records the grid cell the unit currently occupies.
    pub fn set_current_cell(&mut self, cell: GridPoint) {
        self.current = cell;
    }

    /// Flags whether the unit reached the end of its route.
    pub fn set_reached_end(&mut self, reached: bool) {
        self.reached_end = reached;
    }

    /// Archetype of the enemy.
    #[must_use]
    pub fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Cell the route starts from.
    #[must_use]
    pub fn start(&self) -> GridPoint {
        self.start
    }

    /// Cell the route leads to.
    #[must_use]
    pub fn end(&self) -> GridPoint {
        self.end
    }

    /// Cell most recently reached by the unit.
    #[must_use]
    pub fn current_cell(&self) -> GridPoint {
        self.current
    }

    /// Pixel position of the unit.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Remaining hit points.
    #[must_use]
    pub fn health(&self) -> u32 {
        self.health
    }

    /// Hit points granted at initialisation.
    #[must_use]
    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Remaining health as a fraction of the maximum, for bar rendering.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.health as f32 / self.max_health as f32
    }

    /// Travel speed in pixels per second.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Reward granted on death.
    #[must_use]
    pub fn reward(&self) -> u32 {
        self.reward
    }

    /// Whether the reward has been claimed.
    #[must_use]
    pub fn reward_given(&self) -> bool {
        self.reward_given
    }

    /// Damage inflicted on a tower by one completed attack.
    #[must_use]
    pub fn touch_damage(&self) -> u32 {
        self.touch_damage
    }

    /// Direction the sprite faces.
    #[must_use]
    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Route the unit follows.
    #[must_use]
    pub fn route(&self) -> &PathRoute {
        &self.route
    }

    /// Index of the waypoint the unit is heading to.
    #[must_use]
    pub fn current_target(&self) -> usize {
        self.current_target
    }

    /// Active animation state.
    #[must_use]
    pub fn state(&self) -> EnemyState {
        self.state
    }

    /// Active animation playback.
    #[must_use]
    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    /// Source rectangle of the frame currently on screen.
    #[must_use]
    pub fn frame_rect(&self) -> FrameRect {
        self.animation.frame_rect()
    }

    /// Renderer-facing sprite placement.
    #[must_use]
    pub fn sprite(&self) -> &SpriteState {
        &self.sprite
    }

    /// Key of the frame sheet supplied at initialisation.
    #[must_use]
    pub fn sheet(&self) -> &str {
        &self.animations.sheet
    }

    /// Whether the unit reached the end of its route.
    #[must_use]
    pub fn reached_end(&self) -> bool {
        self.reached_end
    }

    /// Whether the death animation has completed.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    /// Whether the current attack animation has completed.
    #[must_use]
    pub fn is_attack(&self) -> bool {
        self.is_attack
    }

    /// Whether the current attack already damaged a tower.
    #[must_use]
    pub fn has_damaged_tower(&self) -> bool {
        self.has_damaged_tower
    }

    fn start_walk(&mut self) {
        self.state = EnemyState::Walk;
        self.animation = Animation::new(self.animations.walk, true);
        self.refresh_origin();
    }

    fn start_attack(&mut self) {
        self.state = EnemyState::Attack;
        self.is_attack = false;
        self.has_damaged_tower = false;
        self.animation = Animation::new(self.animations.attack, false);
        self.refresh_origin();
        debug!(kind = %self.kind, "enemy attack started");
    }

    fn start_death(&mut self) {
        self.state = EnemyState::Death;
        self.is_dead = false;
        self.animation = Animation::new(self.animations.death, false);
        self.refresh_origin();
        debug!(kind = %self.kind, "enemy entered death");
    }

    fn refresh_origin(&mut self) {
        let clip = self.animation.clip();
        self.sprite.origin = Vec2::new(
            clip.frame_width as f32 / 2.0,
            clip.frame_height as f32 / ORIGIN_HEIGHT_DIVISOR,
        );
    }

    fn sync_sprite(&mut self) {
        self.sprite.position = self.position;
    }
}
