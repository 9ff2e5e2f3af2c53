//! Scenario files describing the map, defenders and enemy waves of an encounter.

use std::{collections::BTreeMap, fs, path::Path, time::Duration};

use anyhow::{bail, ensure, Context, Result};
use glam::Vec2;
use grid_siege_core::{
    AnimationClip, AnimationSet, EnemyKind, EnemyStats, GridLayout, GridPoint, StatTable,
    WalkabilityGrid,
};
use serde::Deserialize;

/// Scenario shipped with the binary and used when no file is supplied.
const BUILTIN_SCENARIO: &str = include_str!("../scenarios/default.toml");

/// Shortest frame a clip may declare, in seconds.
const MIN_FRAME_SECONDS: f32 = 0.001;

/// Fully validated encounter description.
#[derive(Clone, Debug)]
pub(crate) struct Scenario {
    pub(crate) layout: GridLayout,
    pub(crate) grid: WalkabilityGrid,
    pub(crate) spawn: GridPoint,
    pub(crate) goal: GridPoint,
    pub(crate) stats: StatTable,
    pub(crate) animations: BTreeMap<EnemyKind, AnimationSet>,
    pub(crate) towers: Vec<TowerPlan>,
    pub(crate) waves: Vec<WavePlan>,
}

/// Placement and firing parameters for one tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TowerPlan {
    pub(crate) cell: GridPoint,
    pub(crate) max_health: u32,
    pub(crate) damage: u32,
    /// Firing radius measured in cells.
    pub(crate) range: f32,
    pub(crate) cooldown: Duration,
}

/// Batch of identical enemies released at a fixed interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct WavePlan {
    pub(crate) kind: EnemyKind,
    pub(crate) start: Duration,
    pub(crate) count: u32,
    pub(crate) interval: Duration,
}

impl Scenario {
    /// Parses the scenario bundled with the binary.
    pub(crate) fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_SCENARIO).context("failed to load built-in scenario")
    }

    /// Reads and validates the scenario stored at `path`.
    pub(crate) fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("invalid scenario at {}", path.display()))
    }

    /// Parses and validates a scenario from TOML text.
    pub(crate) fn from_toml(contents: &str) -> Result<Self> {
        let file: ScenarioFile =
            toml::from_str(contents).context("failed to parse scenario toml contents")?;
        file.validate()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    spawn: [i32; 2],
    goal: [i32; 2],
    map: Vec<Vec<i32>>,
    #[serde(default)]
    layout: LayoutEntry,
    #[serde(default)]
    towers: Vec<TowerEntry>,
    #[serde(default)]
    waves: Vec<WaveEntry>,
    #[serde(default)]
    stats: BTreeMap<String, StatsEntry>,
    #[serde(default)]
    animations: BTreeMap<String, AnimationEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutEntry {
    #[serde(default = "default_cell_size")]
    cell_size: f32,
    #[serde(default)]
    origin: [f32; 2],
}

impl Default for LayoutEntry {
    fn default() -> Self {
        Self {
            cell_size: default_cell_size(),
            origin: [0.0, 0.0],
        }
    }
}

fn default_cell_size() -> f32 {
    GridLayout::DEFAULT_CELL_SIZE
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TowerEntry {
    cell: [i32; 2],
    max_health: Option<u32>,
    damage: u32,
    range: f32,
    cooldown: f32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WaveEntry {
    kind: EnemyKind,
    #[serde(default)]
    start: f32,
    count: u32,
    interval: f32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StatsEntry {
    health: Option<u32>,
    speed: Option<f32>,
    reward: Option<u32>,
    touch_damage: Option<u32>,
    facing_scale: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnimationEntry {
    #[serde(default)]
    sheet: String,
    #[serde(default = "unit_scale")]
    scale: [f32; 2],
    walk: ClipEntry,
    attack: ClipEntry,
    death: ClipEntry,
}

fn unit_scale() -> [f32; 2] {
    [1.0, 1.0]
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClipEntry {
    frames: u32,
    frame_seconds: f32,
    width: u32,
    height: u32,
}

impl ScenarioFile {
    fn validate(self) -> Result<Scenario> {
        let grid = WalkabilityGrid::from_rows(&self.map).context("invalid map")?;
        ensure!(
            self.layout.cell_size > 0.0,
            "cell_size must be positive, got {}",
            self.layout.cell_size
        );
        let layout = GridLayout::new(
            grid.rows(),
            grid.columns(),
            self.layout.cell_size,
            Vec2::from(self.layout.origin),
        );

        let spawn = cell_in(&grid, self.spawn, "spawn")?;
        let goal = cell_in(&grid, self.goal, "goal")?;
        ensure!(grid.is_walkable(spawn), "spawn cell {:?} is blocked", self.spawn);
        ensure!(grid.is_walkable(goal), "goal cell {:?} is blocked", self.goal);

        let mut towers = Vec::with_capacity(self.towers.len());
        for (index, entry) in self.towers.into_iter().enumerate() {
            let cell = cell_in(&grid, entry.cell, "tower")
                .with_context(|| format!("tower #{index}"))?;
            ensure!(
                cell != spawn && cell != goal,
                "tower #{index} may not occupy the spawn or goal cell"
            );
            ensure!(entry.range >= 0.0, "tower #{index} has a negative range");
            towers.push(TowerPlan {
                cell,
                max_health: entry.max_health.unwrap_or(20),
                damage: entry.damage,
                range: entry.range,
                cooldown: seconds(entry.cooldown)
                    .with_context(|| format!("tower #{index} cooldown"))?,
            });
        }

        let mut waves = Vec::with_capacity(self.waves.len());
        for (index, entry) in self.waves.into_iter().enumerate() {
            waves.push(WavePlan {
                kind: entry.kind,
                start: seconds(entry.start).with_context(|| format!("wave #{index} start"))?,
                count: entry.count,
                interval: seconds(entry.interval)
                    .with_context(|| format!("wave #{index} interval"))?,
            });
        }

        let defaults = StatTable::default();
        let mut overrides = Vec::with_capacity(self.stats.len());
        for (name, entry) in self.stats {
            let kind = parse_kind(&name)?;
            let base = defaults.get(kind);
            let stats = EnemyStats {
                health: entry.health.unwrap_or(base.health),
                speed: entry.speed.unwrap_or(base.speed),
                reward: entry.reward.unwrap_or(base.reward),
                touch_damage: entry.touch_damage.unwrap_or(base.touch_damage),
                facing_scale: entry.facing_scale.unwrap_or(base.facing_scale),
            };
            ensure!(stats.health > 0, "{kind} health must be positive");
            ensure!(
                stats.speed.is_finite() && stats.speed > 0.0,
                "{kind} speed must be positive, got {}",
                stats.speed
            );
            ensure!(
                stats.facing_scale.is_finite() && stats.facing_scale > 0.0,
                "{kind} facing_scale must be positive, got {}",
                stats.facing_scale
            );
            overrides.push((kind, stats));
        }

        let mut animations = BTreeMap::new();
        for (name, entry) in self.animations {
            let kind = parse_kind(&name)?;
            let set = AnimationSet {
                sheet: entry.sheet,
                walk: entry.walk.clip().with_context(|| format!("{name} walk clip"))?,
                attack: entry.attack.clip().with_context(|| format!("{name} attack clip"))?,
                death: entry.death.clip().with_context(|| format!("{name} death clip"))?,
                scale: Vec2::from(entry.scale),
            };
            if animations.insert(kind, set).is_some() {
                bail!("duplicate animation entry for {kind}");
            }
        }

        Ok(Scenario {
            layout,
            grid,
            spawn,
            goal,
            stats: StatTable::with_overrides(overrides),
            animations,
            towers,
            waves,
        })
    }
}

impl ClipEntry {
    fn clip(&self) -> Result<AnimationClip> {
        ensure!(
            self.frame_seconds >= MIN_FRAME_SECONDS,
            "frame_seconds must be at least {MIN_FRAME_SECONDS}, got {}",
            self.frame_seconds
        );
        Ok(AnimationClip::new(
            self.frames,
            seconds(self.frame_seconds)?,
            self.width,
            self.height,
        ))
    }
}

fn parse_kind(name: &str) -> Result<EnemyKind> {
    name.parse::<EnemyKind>()
        .with_context(|| format!("unknown enemy kind `{name}` in scenario"))
}

fn cell_in(grid: &WalkabilityGrid, [row, column]: [i32; 2], label: &str) -> Result<GridPoint> {
    let Some(code) = grid.code(GridPoint::at(row, column)) else {
        bail!(
            "{label} cell [{row}, {column}] lies outside the {}x{} map",
            grid.rows(),
            grid.columns()
        );
    };
    Ok(GridPoint::new(row, column, code))
}

fn seconds(value: f32) -> Result<Duration> {
    Duration::try_from_secs_f32(value).with_context(|| format!("invalid duration {value}s"))
}
