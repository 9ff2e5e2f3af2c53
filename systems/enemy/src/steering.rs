//! Per-tick movement of walking enemies along their routes.

use std::time::Duration;

use grid_siege_core::{GridLayout, GridPoint};

use crate::unit::{EnemyState, EnemyUnit};

/// Outcome of a single steering step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Steering {
    /// The unit is attacking or dying and did not move.
    Holding,
    /// The unit has no route to follow.
    NoRoute,
    /// The unit moved toward its current waypoint.
    Moving,
    /// The unit arrived at an intermediate waypoint.
    WaypointReached(GridPoint),
    /// The unit stands on the final cell of its route.
    ReachedEnd,
}

/// Moves a walking unit toward its current waypoint for `dt`.
///
/// The step length is the unit's speed scaled by `dt` and never overshoots the
/// waypoint's pixel centre. Arriving at a waypoint advances the target index;
/// arriving at the final one sets the unit's `reached_end` flag.
pub fn follow_route(unit: &mut EnemyUnit, layout: &GridLayout, dt: Duration) -> Steering {
    if unit.reached_end() {
        return Steering::ReachedEnd;
    }

    if unit.state() != EnemyState::Walk {
        return Steering::Holding;
    }

    if unit.route().is_empty() {
        return Steering::NoRoute;
    }

    let last = unit.route().len() - 1;
    let target = unit.current_target();
    let Some(waypoint) = unit.route().get(target) else {
        unit.set_reached_end(true);
        return Steering::ReachedEnd;
    };

    let goal = layout.to_pixel(waypoint);
    let delta = goal - unit.position();
    if delta.x < 0.0 {
        unit.face_left();
    } else if delta.x > 0.0 {
        unit.face_right();
    }

    let distance = delta.length();
    let step = unit.speed() * dt.as_secs_f32();
    if distance > step {
        let offset = delta / distance * step;
        unit.move_by(offset.x, offset.y);
        return Steering::Moving;
    }

    unit.set_position(goal.x, goal.y);
    unit.set_current_cell(waypoint);

    if target >= last {
        unit.set_reached_end(true);
        return Steering::ReachedEnd;
    }

    unit.set_current_target(target + 1);
    Steering::WaypointReached(waypoint)
}
