#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core value types shared across the Grid Siege simulation.
//!
//! This crate defines the vocabulary that connects the pathfinding, enemy and
//! tower systems with whatever driver advances them. Grid cells are expressed
//! as [`GridPoint`] values, translated to pixel space exclusively through a
//! single [`GridLayout`] so every system agrees on where a cell lives on
//! screen. Enemy archetypes resolve their numbers through an immutable
//! [`StatTable`] built once at startup and passed around by reference.

use std::{
    collections::BTreeMap,
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
    time::Duration,
};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Cell code that marks a walkable grid cell.
pub const WALKABLE: i32 = 0;

/// Errors raised while constructing core data structures.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// The walkability table contained no rows or no columns.
    #[error("walkability grid must contain at least one row and one column")]
    EmptyGrid,
    /// A row of the walkability table had a different width than the first.
    #[error("grid row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width established by the first row.
        expected: usize,
        /// Width observed on the offending row.
        found: usize,
    },
    /// A grid dimension does not fit in the coordinate range.
    #[error("grid dimension {0} exceeds the supported maximum")]
    DimensionOverflow(usize),
    /// The provided name does not correspond to any enemy kind.
    #[error("unknown enemy kind `{0}`")]
    UnknownEnemyKind(String),
}

/// Coordinate of a single grid cell together with its content code.
///
/// Two points compare equal when they address the same row and column; the
/// content code is carried as metadata and never participates in identity.
/// Coordinates are signed so that conversions from out-of-range pixel input
/// extrapolate instead of wrapping.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct GridPoint {
    row: i32,
    column: i32,
    code: i32,
}

impl GridPoint {
    /// Creates a point at the provided row and column carrying `code`.
    #[must_use]
    pub const fn new(row: i32, column: i32, code: i32) -> Self {
        Self { row, column, code }
    }

    /// Creates a walkable point at the provided row and column.
    #[must_use]
    pub const fn at(row: i32, column: i32) -> Self {
        Self::new(row, column, WALKABLE)
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Content code recorded for the cell.
    #[must_use]
    pub const fn code(&self) -> i32 {
        self.code
    }

    /// Pixel-space centre of the cell according to `layout`.
    #[must_use]
    pub fn to_pixel(self, layout: &GridLayout) -> Vec2 {
        layout.to_pixel(self)
    }

    /// Cell that contains the provided pixel coordinate.
    ///
    /// No bounds check is performed; callers must validate the result with
    /// [`GridLayout::contains`] before using it to index a grid.
    #[must_use]
    pub fn from_pixel(x: f32, y: f32, layout: &GridLayout) -> Self {
        layout.cell_at(x, y)
    }

    /// Reports whether `other` is one of the four orthogonal neighbours.
    #[must_use]
    pub fn is_adjacent(self, other: GridPoint) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Computes the Manhattan distance between two points.
    #[must_use]
    pub fn manhattan_distance(self, other: GridPoint) -> u32 {
        self.row.abs_diff(other.row) + self.column.abs_diff(other.column)
    }
}

impl PartialEq for GridPoint {
    fn eq(&self, other: &Self) -> bool {
        self.row == other.row && self.column == other.column
    }
}

impl Eq for GridPoint {}

impl Hash for GridPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.row.hash(state);
        self.column.hash(state);
    }
}

/// Shared geometry that maps grid cells onto pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    rows: u32,
    columns: u32,
    cell_size: f32,
    origin: Vec2,
}

impl GridLayout {
    /// Number of rows used when no explicit layout is configured.
    pub const DEFAULT_ROWS: u32 = 12;
    /// Number of columns used when no explicit layout is configured.
    pub const DEFAULT_COLUMNS: u32 = 20;
    /// Edge length of a cell in pixels used when no layout is configured.
    pub const DEFAULT_CELL_SIZE: f32 = 64.0;

    /// Creates a layout with explicit dimensions, cell size and origin.
    #[must_use]
    pub const fn new(rows: u32, columns: u32, cell_size: f32, origin: Vec2) -> Self {
        Self {
            rows,
            columns,
            cell_size,
            origin,
        }
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Edge length of one square cell in pixels.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Pixel position of the top-left corner of cell (0, 0).
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Pixel-space centre of the provided cell.
    #[must_use]
    pub fn to_pixel(&self, point: GridPoint) -> Vec2 {
        let offset = Vec2::new(point.column() as f32 + 0.5, point.row() as f32 + 0.5);
        self.origin + offset * self.cell_size
    }

    /// Cell containing the provided pixel coordinate, floored toward it.
    #[must_use]
    pub fn cell_at(&self, x: f32, y: f32) -> GridPoint {
        if self.cell_size <= 0.0 {
            return GridPoint::default();
        }

        let local = (Vec2::new(x, y) - self.origin) / self.cell_size;
        GridPoint::at(local.y.floor() as i32, local.x.floor() as i32)
    }

    /// Reports whether the point lies inside the grid bounds.
    #[must_use]
    pub fn contains(&self, point: GridPoint) -> bool {
        u32::try_from(point.row()).map_or(false, |row| row < self.rows)
            && u32::try_from(point.column()).map_or(false, |column| column < self.columns)
    }
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_ROWS,
            Self::DEFAULT_COLUMNS,
            Self::DEFAULT_CELL_SIZE,
            Vec2::ZERO,
        )
    }
}

fn dimension(len: usize) -> Result<u32, CoreError> {
    u32::try_from(len)
        .ok()
        .filter(|value| i32::try_from(*value).is_ok())
        .ok_or(CoreError::DimensionOverflow(len))
}

/// Dense table of cell codes describing which cells enemies may enter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkabilityGrid {
    rows: u32,
    columns: u32,
    codes: Vec<i32>,
}

impl WalkabilityGrid {
    /// Creates a grid of the provided size where every cell is walkable.
    #[must_use]
    pub fn open(rows: u32, columns: u32) -> Self {
        let count = usize::try_from(rows)
            .ok()
            .zip(usize::try_from(columns).ok())
            .and_then(|(rows, columns)| rows.checked_mul(columns))
            .unwrap_or(0);

        Self {
            rows,
            columns,
            codes: vec![WALKABLE; count],
        }
    }

    /// Builds a grid from nested rows of cell codes.
    pub fn from_rows<R>(rows: &[R]) -> Result<Self, CoreError>
    where
        R: AsRef<[i32]>,
    {
        let expected = rows.first().map_or(0, |row| row.as_ref().len());
        if expected == 0 {
            return Err(CoreError::EmptyGrid);
        }
        let row_count = dimension(rows.len())?;
        let column_count = dimension(expected)?;

        let mut codes = Vec::with_capacity(expected * rows.len());
        for (index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != expected {
                return Err(CoreError::RaggedRow {
                    row: index,
                    expected,
                    found: row.len(),
                });
            }
            codes.extend_from_slice(row);
        }

        Ok(Self {
            rows: row_count,
            columns: column_count,
            codes,
        })
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Total number of cells stored in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.codes.len()
    }

    /// Row-major offset of the provided point, if it lies within the grid.
    #[must_use]
    pub fn index(&self, point: GridPoint) -> Option<usize> {
        let row = u32::try_from(point.row()).ok()?;
        let column = u32::try_from(point.column()).ok()?;
        if row >= self.rows || column >= self.columns {
            return None;
        }

        let width = usize::try_from(self.columns).ok()?;
        usize::try_from(row)
            .ok()?
            .checked_mul(width)?
            .checked_add(usize::try_from(column).ok()?)
    }

    /// Content code of the provided cell, if it lies within the grid.
    #[must_use]
    pub fn code(&self, point: GridPoint) -> Option<i32> {
        self.index(point).map(|index| self.codes[index])
    }

    /// Reports whether the cell lies within the grid and carries code 0.
    #[must_use]
    pub fn is_walkable(&self, point: GridPoint) -> bool {
        self.code(point) == Some(WALKABLE)
    }

    /// Overwrites the code of the provided cell. Out-of-range points are ignored.
    pub fn set_code(&mut self, point: GridPoint, code: i32) {
        if let Some(index) = self.index(point) {
            self.codes[index] = code;
        }
    }

    /// Returns the point stored at the provided row-major offset.
    #[must_use]
    pub fn point_at(&self, index: usize) -> Option<GridPoint> {
        let code = *self.codes.get(index)?;
        let width = usize::try_from(self.columns).ok()?;
        let row = i32::try_from(index / width).ok()?;
        let column = i32::try_from(index % width).ok()?;
        Some(GridPoint::new(row, column, code))
    }
}

/// Ordered sequence of 4-adjacent cells from a start cell to a goal cell.
///
/// An empty route signals that no path exists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathRoute {
    points: Vec<GridPoint>,
}

impl PathRoute {
    /// Route that represents "no path found".
    #[must_use]
    pub const fn empty() -> Self {
        Self { points: Vec::new() }
    }

    /// Wraps an already ordered start-first list of points.
    #[must_use]
    pub fn from_points(points: Vec<GridPoint>) -> Self {
        Self { points }
    }

    /// Number of cells in the route, including both endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Reports whether the route is empty, meaning no path was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Waypoint stored at the provided index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<GridPoint> {
        self.points.get(index).copied()
    }

    /// First cell of the route.
    #[must_use]
    pub fn first(&self) -> Option<GridPoint> {
        self.points.first().copied()
    }

    /// Final cell of the route.
    #[must_use]
    pub fn last(&self) -> Option<GridPoint> {
        self.points.last().copied()
    }

    /// Iterator over the waypoints in travel order.
    pub fn iter(&self) -> impl Iterator<Item = GridPoint> + '_ {
        self.points.iter().copied()
    }

    /// Borrowed slice of the waypoints in travel order.
    #[must_use]
    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }
}

/// Enemy archetypes that can appear in a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Fragile and quick.
    FastScout,
    /// Balanced ranged unit.
    RangedMech,
    /// Slow, durable and hits hard.
    HeavyWalker,
}

impl EnemyKind {
    /// Every enemy kind in declaration order.
    pub const ALL: [EnemyKind; 3] = [
        EnemyKind::FastScout,
        EnemyKind::RangedMech,
        EnemyKind::HeavyWalker,
    ];

    /// Canonical name of the kind as used in configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FastScout => "FastScout",
            Self::RangedMech => "RangedMech",
            Self::HeavyWalker => "HeavyWalker",
        }
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EnemyKind {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == value)
            .ok_or_else(|| CoreError::UnknownEnemyKind(value.to_owned()))
    }
}

/// Numbers that define how an enemy kind behaves in the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    /// Hit points granted at spawn.
    pub health: u32,
    /// Travel speed in pixels per second.
    pub speed: f32,
    /// Resources granted to the player when the enemy dies.
    pub reward: u32,
    /// Damage dealt to a tower by one completed attack.
    pub touch_damage: u32,
    /// Magnitude of the sprite scale applied when the enemy turns.
    pub facing_scale: f32,
}

/// Immutable mapping from enemy kind to its stats.
#[derive(Clone, Debug, PartialEq)]
pub struct StatTable {
    entries: BTreeMap<EnemyKind, EnemyStats>,
}

impl StatTable {
    /// Builds a table from the defaults with the provided overrides applied.
    #[must_use]
    pub fn with_overrides(overrides: impl IntoIterator<Item = (EnemyKind, EnemyStats)>) -> Self {
        let mut table = Self::default();
        for (kind, stats) in overrides {
            let _ = table.entries.insert(kind, stats);
        }
        table
    }

    /// Stats recorded for the provided kind.
    #[must_use]
    pub fn get(&self, kind: EnemyKind) -> EnemyStats {
        self.entries
            .get(&kind)
            .copied()
            .unwrap_or_else(|| default_stats(kind))
    }
}

impl Default for StatTable {
    fn default() -> Self {
        Self {
            entries: EnemyKind::ALL
                .into_iter()
                .map(|kind| (kind, default_stats(kind)))
                .collect(),
        }
    }
}

const fn default_stats(kind: EnemyKind) -> EnemyStats {
    match kind {
        EnemyKind::FastScout => EnemyStats {
            health: 3,
            speed: 120.0,
            reward: 20,
            touch_damage: 1,
            facing_scale: 0.5,
        },
        EnemyKind::RangedMech => EnemyStats {
            health: 5,
            speed: 100.0,
            reward: 30,
            touch_damage: 2,
            facing_scale: 1.0,
        },
        EnemyKind::HeavyWalker => EnemyStats {
            health: 10,
            speed: 70.0,
            reward: 40,
            touch_damage: 3,
            facing_scale: 0.5,
        },
    }
}

/// Horizontal direction an enemy sprite faces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Sprite mirrored horizontally.
    Left,
    /// Sprite drawn as authored.
    #[default]
    Right,
}

/// Timing and geometry of one frame-sheet animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationClip {
    /// Number of frames laid out horizontally in the sheet.
    pub frame_count: u32,
    /// Time each frame stays on screen.
    pub frame_duration: Duration,
    /// Width of one frame in pixels.
    pub frame_width: u32,
    /// Height of one frame in pixels.
    pub frame_height: u32,
}

impl AnimationClip {
    /// Creates a clip description.
    #[must_use]
    pub const fn new(
        frame_count: u32,
        frame_duration: Duration,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        Self {
            frame_count,
            frame_duration,
            frame_width,
            frame_height,
        }
    }

    /// Time required to play every frame once.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.frame_duration.saturating_mul(self.frame_count)
    }
}

impl Default for AnimationClip {
    fn default() -> Self {
        Self::new(1, Duration::from_millis(100), 1, 1)
    }
}

/// Animation bundle supplied for one enemy kind.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationSet {
    /// Renderer-resolved key of the frame sheet.
    pub sheet: String,
    /// Looping clip played while walking.
    pub walk: AnimationClip,
    /// Clip played once per attack.
    pub attack: AnimationClip,
    /// Clip played once when the enemy dies.
    pub death: AnimationClip,
    /// Sprite scale applied at initialisation.
    pub scale: Vec2,
}

impl Default for AnimationSet {
    fn default() -> Self {
        Self {
            sheet: String::new(),
            walk: AnimationClip::default(),
            attack: AnimationClip::default(),
            death: AnimationClip::default(),
            scale: Vec2::ONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_point_equality_ignores_code() {
        assert_eq!(GridPoint::new(2, 3, 0), GridPoint::new(2, 3, 7));
        assert_ne!(GridPoint::new(2, 3, 0), GridPoint::new(3, 2, 0));
    }

    #[test]
    fn grid_point_round_trips_through_bincode() {
        let point = GridPoint::new(4, 9, 2);
        let bytes = bincode::serialize(&point).expect("serialize");
        let restored: GridPoint = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, point);
        assert_eq!(restored.code(), 2);
    }

    #[test]
    fn pixel_conversion_uses_cell_centres() {
        let layout = GridLayout::new(4, 4, 10.0, Vec2::new(5.0, 20.0));
        let pixel = GridPoint::at(1, 2).to_pixel(&layout);
        assert_eq!(pixel, Vec2::new(30.0, 35.0));
        assert_eq!(GridPoint::from_pixel(pixel.x, pixel.y, &layout), GridPoint::at(1, 2));
    }

    #[test]
    fn from_pixel_floors_toward_containing_cell() {
        let layout = GridLayout::new(4, 4, 10.0, Vec2::ZERO);
        assert_eq!(layout.cell_at(19.9, 0.0), GridPoint::at(0, 1));
        assert_eq!(layout.cell_at(-0.5, -10.5), GridPoint::at(-2, -1));
        assert!(!layout.contains(layout.cell_at(-0.5, 0.0)));
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        assert_eq!(dimension(12), Ok(12));
        assert_eq!(
            dimension(usize::MAX),
            Err(CoreError::DimensionOverflow(usize::MAX))
        );
        let past_coordinates = i32::MAX as usize + 1;
        assert_eq!(
            dimension(past_coordinates),
            Err(CoreError::DimensionOverflow(past_coordinates))
        );
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let error = WalkabilityGrid::from_rows(&[vec![0, 0], vec![0]]).unwrap_err();
        assert_eq!(
            error,
            CoreError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1,
            }
        );
        let empty: [Vec<i32>; 0] = [];
        assert_eq!(WalkabilityGrid::from_rows(&empty), Err(CoreError::EmptyGrid));
    }

    #[test]
    fn walkability_follows_cell_codes() {
        let grid = WalkabilityGrid::from_rows(&[[0, 3], [0, 0]]).expect("grid");
        assert!(grid.is_walkable(GridPoint::at(0, 0)));
        assert!(!grid.is_walkable(GridPoint::at(0, 1)));
        assert!(!grid.is_walkable(GridPoint::at(2, 0)));
        assert_eq!(grid.point_at(1).map(|point| point.code()), Some(3));
    }

    #[test]
    fn heavy_walker_defaults_match_lookup_table() {
        let stats = StatTable::default().get(EnemyKind::HeavyWalker);
        assert_eq!(stats.health, 10);
        assert_eq!(stats.speed, 70.0);
        assert_eq!(stats.reward, 40);
        assert_eq!(stats.touch_damage, 3);
    }

    #[test]
    fn overrides_replace_only_named_kinds() {
        let custom = EnemyStats {
            health: 1,
            speed: 1.0,
            reward: 1,
            touch_damage: 1,
            facing_scale: 1.0,
        };
        let table = StatTable::with_overrides([(EnemyKind::FastScout, custom)]);
        assert_eq!(table.get(EnemyKind::FastScout), custom);
        assert_eq!(table.get(EnemyKind::RangedMech).health, 5);
    }

    #[test]
    fn enemy_kind_parses_canonical_names() {
        assert_eq!("RangedMech".parse::<EnemyKind>(), Ok(EnemyKind::RangedMech));
        assert!("Dragon".parse::<EnemyKind>().is_err());
    }
}
