//! Property tests for the tracer, the pathfinder and AP bookkeeping

use proptest::prelude::*;

use skirmish::battle::pathfinding::{self, Cost};
use skirmish::battle::{line, Battlefield, Grid, Soldier, SoldierAttributes};
use skirmish::core::{Position, SoldierId, TeamId};

fn position() -> impl Strategy<Value = Position> {
    (-40i32..40, -40i32..40).prop_map(|(x, y)| Position::new(x, y))
}

/// Square cost grid; `None` marks a blocked cell
fn cost_grid(size: usize) -> impl Strategy<Value = Vec<Option<Cost>>> {
    prop::collection::vec(prop::option::weighted(0.8, 1 as Cost..6), size * size)
}

fn grid_neighbors(size: i32, blocked: &[Option<Cost>], p: Position) -> Vec<Position> {
    p.neighbors4()
        .into_iter()
        .filter(|q| q.x >= 0 && q.y >= 0 && q.x < size && q.y < size)
        .filter(|q| blocked[(q.y * size + q.x) as usize].is_some())
        .collect()
}

/// Cheapest cost from `start` to every cell by repeated relaxation
fn brute_force_costs(size: i32, costs: &[Option<Cost>], start: Position) -> Vec<Option<Cost>> {
    let mut best: Vec<Option<Cost>> = vec![None; costs.len()];
    best[(start.y * size + start.x) as usize] = Some(0);
    for _ in 0..costs.len() {
        for y in 0..size {
            for x in 0..size {
                let p = Position::new(x, y);
                let Some(here) = best[(y * size + x) as usize] else {
                    continue;
                };
                for q in grid_neighbors(size, costs, p) {
                    let index = (q.y * size + q.x) as usize;
                    let step = costs[index].unwrap_or(Cost::MAX / 4);
                    if best[index].map_or(true, |known| here + step < known) {
                        best[index] = Some(here + step);
                    }
                }
            }
        }
    }
    best
}

proptest! {
    #[test]
    fn trace_is_symmetric(a in position(), b in position()) {
        let forward: Vec<Position> = line::trace(a, b).into_iter().map(|p| p.pos).collect();
        let mut backward: Vec<Position> = line::trace(b, a).into_iter().map(|p| p.pos).collect();
        backward.reverse();
        prop_assert_eq!(&forward, &backward);
        prop_assert_eq!(forward.first().copied(), Some(a));
        prop_assert_eq!(forward.last().copied(), Some(b));
    }

    #[test]
    fn trace_steps_are_adjacent_and_progress_falls(a in position(), b in position()) {
        let points = line::trace(a, b);
        prop_assert_eq!(points.len() as i32, a.chebyshev(&b) + 1);
        for pair in points.windows(2) {
            prop_assert_eq!(pair[0].pos.chebyshev(&pair[1].pos), 1);
            prop_assert!(pair[0].progress > pair[1].progress);
        }
        if let Some(last) = points.last() {
            prop_assert_eq!(last.progress, 0.0);
        }
    }

    #[test]
    fn pathfinder_matches_brute_force(
        costs in cost_grid(5),
        sx in 0i32..5, sy in 0i32..5,
        gx in 0i32..5, gy in 0i32..5,
    ) {
        let size = 5;
        let start = Position::new(sx, sy);
        let goal = Position::new(gx, gy);
        let mut costs = costs;
        costs[(sy * size + sx) as usize].get_or_insert(1);

        let path = pathfinding::solve(
            start,
            |p| grid_neighbors(size, &costs, *p),
            |_, q| costs[(q.y * size + q.x) as usize].unwrap_or(Cost::MAX / 4),
            pathfinding::manhattan(goal),
            pathfinding::goal_at(goal),
        );
        let expected = brute_force_costs(size, &costs, start)[(gy * size + gx) as usize];

        match (path, expected) {
            (Some(path), Some(expected)) => {
                prop_assert_eq!(path.first().copied(), Some(start));
                prop_assert_eq!(path.last().copied(), Some(goal));
                for pair in path.windows(2) {
                    prop_assert_eq!(pair[0].manhattan(&pair[1]), 1);
                }
                let total: Cost = path
                    .iter()
                    .skip(1)
                    .map(|q| costs[(q.y * size + q.x) as usize].unwrap_or(Cost::MAX / 4))
                    .sum();
                prop_assert_eq!(total, expected);
            }
            (None, None) => {}
            (path, expected) => prop_assert!(false, "path {:?} vs expected cost {:?}", path, expected),
        }
    }

    #[test]
    fn refresh_never_exceeds_cap(stamina in 0u32..200, health in 0u32..100, leftover in 0u32..=25) {
        let mut soldier = Soldier::new(
            SoldierId(1),
            TeamId::PLAYER,
            Position::new(0, 0),
            SoldierAttributes::new("Prop", stamina, health),
        );
        soldier.current_aps = leftover;
        soldier.refresh_aps();
        prop_assert!(soldier.current_aps <= 25);
        if health == 0 {
            prop_assert_eq!(soldier.current_aps, 0);
        }
    }

    #[test]
    fn shot_costs_exactly_ten(aps in 0u32..=25) {
        let mut bf = Battlefield::new(Grid::new(20, 20), false);
        let a = bf
            .add_soldier(TeamId::PLAYER, Position::new(0, 0), SoldierAttributes::new("Prop", 80, 80))
            .unwrap();
        bf.set_aps(a, aps);
        let result = bf.shoot(Position::new(5, 5), 1);
        let left = bf.soldier(a).unwrap().current_aps;
        if aps < 10 {
            prop_assert!(result.is_err());
            prop_assert_eq!(left, aps);
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(left, aps - 10);
        }
    }
}

#[test]
fn zero_length_trace() {
    let p = Position::new(3, -2);
    let points = line::trace(p, p);
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].pos, p);
    assert_eq!(points[0].progress, 0.0);
    assert!(line::interior(p, p).is_empty());
}
