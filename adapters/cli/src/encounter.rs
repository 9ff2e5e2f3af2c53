//! Headless driver that advances one encounter tick by tick.

use std::{collections::BTreeMap, time::Duration};

use grid_siege_core::{AnimationSet, EnemyKind, GridLayout, GridPoint, PathRoute, StatTable};
use grid_siege_system_enemy::{follow_route, EnemyState, EnemyUnit, Steering};
use grid_siege_system_pathfinding::EnemyPathfinder;
use grid_siege_system_tower::Tower;
use tracing::{debug, info, warn};

use crate::config::{Scenario, TowerPlan, WavePlan};

/// Cell code written into the map for cells occupied by a tower.
const TOWER_CODE: i32 = 2;

/// Tallies accumulated while an encounter runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct EncounterReport {
    pub(crate) ticks: u32,
    pub(crate) spawned: u32,
    pub(crate) kills: u32,
    pub(crate) leaks: u32,
    pub(crate) stranded: u32,
    pub(crate) gold: u32,
    pub(crate) towers_standing: usize,
}

#[derive(Debug)]
struct Defender {
    tower: Tower,
    damage: u32,
    range: f32,
    cooldown: Duration,
    ready_in: Duration,
}

#[derive(Debug)]
struct WaveState {
    plan: WavePlan,
    released: u32,
}

impl WaveState {
    fn is_exhausted(&self) -> bool {
        self.released >= self.plan.count
    }

    fn next_release(&self) -> Duration {
        self.plan.start + self.plan.interval.saturating_mul(self.released)
    }
}

/// Simulation driver owning every tower and enemy of an encounter.
#[derive(Debug)]
pub(crate) struct Encounter {
    layout: GridLayout,
    route: PathRoute,
    spawn: GridPoint,
    goal: GridPoint,
    stats: StatTable,
    animations: BTreeMap<EnemyKind, AnimationSet>,
    default_animations: AnimationSet,
    defenders: Vec<Defender>,
    waves: Vec<WaveState>,
    enemies: Vec<EnemyUnit>,
    clock: Duration,
    report: EncounterReport,
}

impl Encounter {
    /// Builds an encounter, marking tower cells as blocked on the map.
    ///
    /// Towers never move, so the spawn-to-goal route is planned once and
    /// shared by every enemy released afterwards.
    pub(crate) fn new(scenario: Scenario) -> Self {
        let Scenario {
            layout,
            mut grid,
            spawn,
            goal,
            stats,
            animations,
            towers,
            waves,
        } = scenario;

        let defenders = towers
            .into_iter()
            .map(|plan| {
                grid.set_code(plan.cell, TOWER_CODE);
                defender(plan, &layout)
            })
            .collect::<Vec<_>>();

        let route = EnemyPathfinder::new().compute_path(&grid, spawn, goal);
        if route.is_empty() {
            warn!(
                spawn_row = spawn.row(),
                spawn_column = spawn.column(),
                goal_row = goal.row(),
                goal_column = goal.column(),
                "goal is unreachable from the spawn cell"
            );
        }

        let report = EncounterReport {
            towers_standing: defenders.len(),
            ..EncounterReport::default()
        };

        Self {
            layout,
            route,
            spawn,
            goal,
            stats,
            animations,
            default_animations: AnimationSet::default(),
            defenders,
            waves: waves
                .into_iter()
                .map(|plan| WaveState { plan, released: 0 })
                .collect(),
            enemies: Vec::new(),
            clock: Duration::ZERO,
            report,
        }
    }

    /// Runs until every wave is released and cleared, or `max_ticks` elapse.
    pub(crate) fn run(&mut self, max_ticks: u32, dt: Duration) -> EncounterReport {
        for _ in 0..max_ticks {
            self.tick(dt);
            if self.is_finished() {
                break;
            }
        }
        self.report
    }

    /// Reports whether no enemy remains and none is left to release.
    pub(crate) fn is_finished(&self) -> bool {
        self.enemies.is_empty() && self.waves.iter().all(WaveState::is_exhausted)
    }

    /// Enemies currently on the field.
    pub(crate) fn enemies(&self) -> &[EnemyUnit] {
        &self.enemies
    }

    /// Advances the encounter by one tick of `dt`.
    pub(crate) fn tick(&mut self, dt: Duration) {
        self.clock += dt;
        self.report.ticks += 1;

        self.release_waves();
        self.move_and_attack(dt);
        self.fire_towers(dt);

        for enemy in &mut self.enemies {
            enemy.update_animation(dt);
        }
        for defender in &mut self.defenders {
            defender.tower.advance(dt);
        }

        self.resolve_attacks();
        self.retire_enemies();
        self.report.towers_standing = self
            .defenders
            .iter()
            .filter(|defender| !defender.tower.is_destroyed())
            .count();
    }

    fn release_waves(&mut self) {
        for wave in &mut self.waves {
            while !wave.is_exhausted() && wave.next_release() <= self.clock {
                wave.released += 1;
                let kind = wave.plan.kind;
                let animations = self.animations.get(&kind).unwrap_or(&self.default_animations);
                let mut enemy = EnemyUnit::spawn(
                    kind,
                    self.spawn,
                    self.goal,
                    &self.layout,
                    animations,
                    &self.stats,
                );
                enemy.set_route(self.route.clone());
                debug!(%kind, route_len = self.route.len(), "enemy released");
                self.enemies.push(enemy);
                self.report.spawned += 1;
            }
        }
    }

    fn move_and_attack(&mut self, dt: Duration) {
        for enemy in &mut self.enemies {
            if enemy.state() != EnemyState::Walk {
                continue;
            }

            let adjacent_tower = self.defenders.iter().any(|defender| {
                !defender.tower.is_destroyed()
                    && defender.tower.cell().manhattan_distance(enemy.current_cell()) <= 1
            });
            if adjacent_tower {
                enemy.trigger_attack();
                continue;
            }

            match follow_route(enemy, &self.layout, dt) {
                Steering::NoRoute => {
                    warn!(kind = %enemy.kind(), "enemy has no route to the goal");
                }
                Steering::WaypointReached(cell) => {
                    debug!(
                        kind = %enemy.kind(),
                        row = cell.row(),
                        column = cell.column(),
                        "waypoint reached"
                    );
                }
                Steering::Holding | Steering::Moving | Steering::ReachedEnd => {}
            }
        }
    }

    fn fire_towers(&mut self, dt: Duration) {
        let cell_size = self.layout.cell_size();
        for defender in &mut self.defenders {
            if defender.tower.is_destroyed() {
                continue;
            }

            defender.ready_in = defender.ready_in.saturating_sub(dt);
            if !defender.ready_in.is_zero() {
                continue;
            }

            let origin = defender.tower.pixel_position();
            let reach = defender.range * cell_size;
            let target = self.enemies.iter_mut().find(|enemy| {
                enemy.state() != EnemyState::Death && enemy.position().distance(origin) <= reach
            });

            if let Some(enemy) = target {
                enemy.take_damage(defender.damage);
                defender.ready_in = defender.cooldown;
            }
        }
    }

    fn resolve_attacks(&mut self) {
        for enemy in &mut self.enemies {
            if enemy.state() != EnemyState::Attack || !enemy.is_attack() {
                continue;
            }

            if !enemy.has_damaged_tower() {
                let cell = enemy.current_cell();
                if let Some(defender) = self.defenders.iter_mut().find(|defender| {
                    !defender.tower.is_destroyed()
                        && defender.tower.cell().manhattan_distance(cell) <= 1
                }) {
                    defender.tower.take_damage(enemy.touch_damage());
                    if defender.tower.is_destroyed() {
                        info!(
                            row = defender.tower.cell().row(),
                            column = defender.tower.cell().column(),
                            "tower destroyed"
                        );
                    }
                }
                enemy.mark_tower_damaged();
            }

            enemy.resume_walk();
        }
    }

    fn retire_enemies(&mut self) {
        let report = &mut self.report;
        self.enemies.retain_mut(|enemy| {
            if let Some(reward) = enemy.claim_reward() {
                report.kills += 1;
                report.gold += reward;
                info!(kind = %enemy.kind(), reward, gold = report.gold, "enemy defeated");
                return false;
            }

            if enemy.is_dead() {
                return false;
            }

            if enemy.reached_end() {
                report.leaks += 1;
                info!(kind = %enemy.kind(), leaks = report.leaks, "enemy reached the goal");
                return false;
            }

            if enemy.route().is_empty() {
                report.stranded += 1;
                return false;
            }

            true
        });
    }
}

fn defender(plan: TowerPlan, layout: &GridLayout) -> Defender {
    let mut tower = Tower::with_max_health(plan.max_health, layout);
    tower.set_position(plan.cell.row(), plan.cell.column(), layout);
    Defender {
        tower,
        damage: plan.damage,
        range: plan.range,
        cooldown: plan.cooldown,
        ready_in: Duration::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(20);

    fn scenario(extra: &str) -> Scenario {
        let contents = format!(
            r#"
            spawn = [0, 0]
            goal = [0, 5]
            map = [
                [0, 0, 0, 0, 0, 0],
                [0, 1, 1, 1, 1, 0],
            ]

            [layout]
            cell_size = 10.0
            {extra}
            "#
        );
        Scenario::from_toml(&contents).expect("test scenario should load")
    }

    #[test]
    fn undefended_enemies_leak() {
        let mut encounter = Encounter::new(scenario(
            "[[waves]]\nkind = \"FastScout\"\ncount = 3\ninterval = 0.1\n",
        ));
        let report = encounter.run(1_000, TICK);

        assert!(encounter.is_finished());
        assert_eq!(report.spawned, 3);
        assert_eq!(report.leaks, 3);
        assert_eq!(report.kills, 0);
        assert_eq!(report.gold, 0);
    }

    #[test]
    fn towers_kill_enemies_and_grant_rewards_once() {
        let mut encounter = Encounter::new(scenario(
            "[[towers]]\ncell = [1, 2]\ndamage = 5\nrange = 10.0\ncooldown = 0.05\n\
             [[waves]]\nkind = \"FastScout\"\ncount = 2\ninterval = 0.5\n",
        ));
        let report = encounter.run(1_000, TICK);

        assert!(encounter.is_finished());
        assert_eq!(report.kills, 2);
        assert_eq!(report.gold, 40);
        assert_eq!(report.leaks, 0);
    }

    #[test]
    fn adjacent_enemies_wear_down_towers() {
        let mut encounter = Encounter::new(scenario(
            "[[towers]]\ncell = [1, 1]\nmax_health = 3\ndamage = 0\nrange = 0.0\ncooldown = 1.0\n\
             [[waves]]\nkind = \"HeavyWalker\"\ncount = 1\ninterval = 1.0\n",
        ));
        let report = encounter.run(2_000, TICK);

        assert_eq!(report.towers_standing, 0);
        assert_eq!(report.leaks, 1);
    }

    #[test]
    fn enemies_without_route_are_stranded() {
        let mut contents =
            scenario("[[waves]]\nkind = \"RangedMech\"\ncount = 1\ninterval = 1.0\n");
        contents.grid.set_code(GridPoint::at(0, 1), 1);
        contents.grid.set_code(GridPoint::at(1, 0), 1);
        let mut encounter = Encounter::new(contents);

        encounter.tick(TICK);
        assert!(encounter.enemies().is_empty());
        assert_eq!(encounter.run(10, TICK).stranded, 1);
    }
}
