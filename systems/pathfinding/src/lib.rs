#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Breadth-first route planner that guides enemies across the walkability grid.

use std::collections::VecDeque;

use grid_siege_core::{GridPoint, PathRoute, WalkabilityGrid};

/// Neighbour offsets as `(row, column)` deltas, expanded up, left, down, right.
const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(-1, 0), (0, -1), (1, 0), (0, 1)];

/// Stateless planner that computes shortest routes between two cells.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnemyPathfinder;

impl EnemyPathfinder {
    /// Creates a new pathfinder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Computes a shortest 4-connected route from `start` to `end`.
    ///
    /// See [`compute_path`].
    #[must_use]
    pub fn compute_path(
        &self,
        grid: &WalkabilityGrid,
        start: GridPoint,
        end: GridPoint,
    ) -> PathRoute {
        compute_path(grid, start, end)
    }
}

/// Computes a shortest 4-connected route from `start` to `end`.
///
/// Cells are walkable when their code is zero. The search expands neighbours
/// in up, left, down, right order and stops as soon as `end` leaves the
/// queue, so ties between equal-length routes are broken deterministically.
/// The start cell itself is never tested for walkability. An empty route is
/// returned when `end` is blocked, either endpoint lies outside the grid, or
/// no route exists.
#[must_use]
pub fn compute_path(grid: &WalkabilityGrid, start: GridPoint, end: GridPoint) -> PathRoute {
    let (Some(start_index), Some(end_index)) = (grid.index(start), grid.index(end)) else {
        return PathRoute::empty();
    };

    if !grid.is_walkable(end) {
        return PathRoute::empty();
    }

    let mut visited = vec![false; grid.cell_count()];
    let mut parents: Vec<Option<usize>> = vec![None; grid.cell_count()];
    let mut queue = VecDeque::new();

    visited[start_index] = true;
    queue.push_back(start_index);

    let mut found = false;
    while let Some(current) = queue.pop_front() {
        if current == end_index {
            found = true;
            break;
        }

        let Some(cell) = grid.point_at(current) else {
            continue;
        };

        for (row_delta, column_delta) in NEIGHBOR_OFFSETS {
            let neighbor = GridPoint::at(cell.row() + row_delta, cell.column() + column_delta);
            let Some(neighbor_index) = grid.index(neighbor) else {
                continue;
            };

            if visited[neighbor_index] || !grid.is_walkable(neighbor) {
                continue;
            }

            visited[neighbor_index] = true;
            parents[neighbor_index] = Some(current);
            queue.push_back(neighbor_index);
        }
    }

    if !found {
        return PathRoute::empty();
    }

    reconstruct(grid, &parents, start_index, end_index)
}

fn reconstruct(
    grid: &WalkabilityGrid,
    parents: &[Option<usize>],
    start_index: usize,
    end_index: usize,
) -> PathRoute {
    let mut points = Vec::new();
    let mut cursor = end_index;

    while cursor != start_index {
        let Some(point) = grid.point_at(cursor) else {
            return PathRoute::empty();
        };
        points.push(point);

        match parents[cursor] {
            Some(parent) => cursor = parent,
            None => return PathRoute::empty(),
        }
    }

    if let Some(start) = grid.point_at(start_index) {
        points.push(start);
    }

    points.reverse();
    PathRoute::from_points(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[i32]]) -> WalkabilityGrid {
        WalkabilityGrid::from_rows(rows).expect("valid grid")
    }

    #[test]
    fn open_three_by_three_yields_five_cell_staircase() {
        let grid = WalkabilityGrid::open(3, 3);
        let route = compute_path(&grid, GridPoint::at(0, 0), GridPoint::at(2, 2));

        assert_eq!(route.len(), 5);
        assert_eq!(route.first(), Some(GridPoint::at(0, 0)));
        assert_eq!(route.last(), Some(GridPoint::at(2, 2)));
        for pair in route.points().windows(2) {
            let (from, to) = (pair[0], pair[1]);
            assert!(to.row() >= from.row() && to.column() >= from.column());
            assert!(from.is_adjacent(to));
        }
    }

    #[test]
    fn tie_break_prefers_earlier_neighbor_order() {
        let grid = WalkabilityGrid::open(3, 3);
        let route = compute_path(&grid, GridPoint::at(0, 0), GridPoint::at(2, 2));

        // Down is expanded before right from the origin, so the route descends first.
        assert_eq!(
            route.points(),
            &[
                GridPoint::at(0, 0),
                GridPoint::at(1, 0),
                GridPoint::at(2, 0),
                GridPoint::at(2, 1),
                GridPoint::at(2, 2),
            ]
        );
    }

    #[test]
    fn start_equal_to_end_yields_single_cell() {
        let grid = WalkabilityGrid::open(2, 2);
        let route = compute_path(&grid, GridPoint::at(1, 1), GridPoint::at(1, 1));
        assert_eq!(route.points(), &[GridPoint::at(1, 1)]);
    }

    #[test]
    fn blocked_end_yields_empty_route() {
        let grid = grid(&[&[0, 0], &[0, 5]]);
        assert!(compute_path(&grid, GridPoint::at(0, 0), GridPoint::at(1, 1)).is_empty());
        assert!(compute_path(&grid, GridPoint::at(1, 1), GridPoint::at(1, 1)).is_empty());
    }

    #[test]
    fn walled_off_end_yields_empty_route() {
        let grid = grid(&[&[0, 1, 0], &[0, 1, 0], &[0, 1, 0]]);
        assert!(compute_path(&grid, GridPoint::at(0, 0), GridPoint::at(2, 2)).is_empty());
    }

    #[test]
    fn out_of_bounds_endpoints_yield_empty_route() {
        let grid = WalkabilityGrid::open(2, 2);
        assert!(compute_path(&grid, GridPoint::at(-1, 0), GridPoint::at(1, 1)).is_empty());
        assert!(compute_path(&grid, GridPoint::at(0, 0), GridPoint::at(0, 2)).is_empty());
    }

    #[test]
    fn route_detours_around_walls() {
        let grid = grid(&[&[0, 0, 0], &[1, 1, 0], &[0, 0, 0]]);
        let route =
            EnemyPathfinder::new().compute_path(&grid, GridPoint::at(0, 0), GridPoint::at(2, 0));
        assert_eq!(route.len(), 7);
        assert!(route.iter().all(|point| grid.is_walkable(point)));
    }
}
