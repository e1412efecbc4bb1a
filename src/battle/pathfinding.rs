//! A* search over caller-supplied graphs
//!
//! The search knows nothing about terrain: soldiers plan moves with it, and
//! the generator uses it to lay paths between houses.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::Hash;

use ahash::{AHashMap, AHashSet};

use crate::core::types::Position;

/// Edge and heuristic cost unit
pub type Cost = i32;

/// Node in the A* open set
#[derive(Debug, Clone)]
struct PathNode<N> {
    node: N,
    f_cost: Cost,
    /// Insertion counter; equal f costs pop in push order
    seq: u64,
}

impl<N> PartialEq for PathNode<N> {
    fn eq(&self, other: &Self) -> bool {
        self.f_cost == other.f_cost && self.seq == other.seq
    }
}

impl<N> Eq for PathNode<N> {}

impl<N> Ord for PathNode<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<N> PartialOrd for PathNode<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find a path using A*
///
/// * `neighbors` - nodes reachable in one step from a node
/// * `cost` - cost of the edge between two adjacent nodes; negative edges are skipped
/// * `heuristic` - estimated remaining cost from a node
/// * `is_goal` - checked when a node is popped, not when it is pushed
///
/// Returns the nodes from `start` to the goal inclusive, or `None` if the
/// frontier runs dry first.
pub fn solve<N, I>(
    start: N,
    mut neighbors: impl FnMut(&N) -> I,
    mut cost: impl FnMut(&N, &N) -> Cost,
    mut heuristic: impl FnMut(&N) -> Cost,
    mut is_goal: impl FnMut(&N) -> bool,
) -> Option<Vec<N>>
where
    N: Copy + Eq + Hash,
    I: IntoIterator<Item = N>,
{
    let mut open_set = BinaryHeap::new();
    let mut closed: AHashSet<N> = AHashSet::new();
    let mut came_from: AHashMap<N, N> = AHashMap::new();
    let mut g_scores: AHashMap<N, Cost> = AHashMap::new();
    let mut seq = 0u64;

    g_scores.insert(start, 0);
    open_set.push(PathNode {
        node: start,
        f_cost: heuristic(&start),
        seq,
    });

    while let Some(current) = open_set.pop() {
        if !closed.insert(current.node) {
            continue;
        }

        if is_goal(&current.node) {
            return Some(reconstruct_path(&came_from, current.node));
        }

        let current_g = g_scores.get(&current.node).copied().unwrap_or(0);

        for child in neighbors(&current.node) {
            if closed.contains(&child) {
                continue;
            }

            let edge = cost(&current.node, &child);
            if edge < 0 {
                tracing::warn!("A*: negative edge cost {} skipped", edge);
                continue;
            }

            let tentative_g = current_g + edge;
            let improves = g_scores
                .get(&child)
                .map_or(true, |&previous| tentative_g < previous);

            if improves {
                came_from.insert(child, current.node);
                g_scores.insert(child, tentative_g);
                seq += 1;
                open_set.push(PathNode {
                    node: child,
                    f_cost: tentative_g + heuristic(&child),
                    seq,
                });
            }
        }
    }

    None // No path found
}

/// Reconstruct path from came_from map
fn reconstruct_path<N: Copy + Eq + Hash>(came_from: &AHashMap<N, N>, mut current: N) -> Vec<N> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Manhattan distance heuristic in cell units
pub fn manhattan(goal: Position) -> impl Fn(&Position) -> Cost {
    move |pos| pos.manhattan(&goal)
}

/// Goal predicate for a single target cell
pub fn goal_at(goal: Position) -> impl Fn(&Position) -> bool {
    move |pos| *pos == goal
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hand-built graph: a chain with a dead-end branch at (1,0)
    fn chain_graph(n: &Position) -> Vec<Position> {
        let p = |x, y| Position::new(x, y);
        match (n.x, n.y) {
            (0, 0) => vec![p(1, 1)],
            (1, 1) => vec![p(0, 0), p(1, 0), p(2, 2)],
            (1, 0) => vec![p(1, 1)],
            (2, 2) => vec![p(1, 1), p(3, 2)],
            (3, 2) => vec![p(2, 2), p(2, 3)],
            (2, 3) => vec![p(3, 2), p(3, 3)],
            (3, 3) => vec![p(2, 3)],
            _ => vec![],
        }
    }

    #[test]
    fn test_solve_chain_graph() {
        let goal = Position::new(3, 3);
        let path = solve(
            Position::new(0, 0),
            chain_graph,
            |_, _| 3,
            manhattan(goal),
            goal_at(goal),
        )
        .expect("chain is connected");

        let expected: Vec<Position> = [(0, 0), (1, 1), (2, 2), (3, 2), (2, 3), (3, 3)]
            .iter()
            .map(|&(x, y)| Position::new(x, y))
            .collect();
        assert_eq!(path, expected);
    }

    #[test]
    fn test_solve_start_is_goal() {
        let start = Position::new(2, 2);
        let path = solve(start, chain_graph, |_, _| 1, |_| 0, goal_at(start));
        assert_eq!(path, Some(vec![start]));
    }

    #[test]
    fn test_solve_unreachable() {
        let goal = Position::new(9, 9);
        let path = solve(Position::new(0, 0), chain_graph, |_, _| 1, |_| 0, goal_at(goal));
        assert!(path.is_none());
    }

    #[test]
    fn test_negative_edges_are_skipped() {
        // Line 0 -> 1 -> 2, plus a "shortcut" 0 -> 2 with negative cost
        let neighbors = |n: &i32| match n {
            0 => vec![1, 2],
            1 => vec![2],
            _ => vec![],
        };
        let cost = |a: &i32, b: &i32| if (*a, *b) == (0, 2) { -5 } else { 1 };
        let path = solve(0, neighbors, cost, |_| 0, |n| *n == 2);
        assert_eq!(path, Some(vec![0, 1, 2]));
    }

    #[test]
    fn test_prefers_cheaper_longer_route() {
        // 0 -> 3 directly costs 10; 0 -> 1 -> 2 -> 3 costs 3
        let neighbors = |n: &i32| match n {
            0 => vec![3, 1],
            1 => vec![2],
            2 => vec![3],
            _ => vec![],
        };
        let cost = |a: &i32, b: &i32| if (*a, *b) == (0, 3) { 10 } else { 1 };
        let path = solve(0, neighbors, cost, |_| 0, |n| *n == 3);
        assert_eq!(path, Some(vec![0, 1, 2, 3]));
    }

    #[test]
    fn test_goal_checked_on_pop_not_push() {
        // Goal 2 is pushed early via an expensive edge, but the cheap route
        // through 1 must win because the goal is only accepted when popped.
        let neighbors = |n: &i32| match n {
            0 => vec![2, 1],
            1 => vec![2],
            _ => vec![],
        };
        let cost = |a: &i32, b: &i32| if (*a, *b) == (0, 2) { 5 } else { 1 };
        let path = solve(0, neighbors, cost, |_| 0, |n| *n == 2);
        assert_eq!(path, Some(vec![0, 1, 2]));
    }

    #[test]
    fn test_ties_resolve_deterministically() {
        let goal = Position::new(4, 0);
        let grid_neighbors = |p: &Position| {
            p.neighbors4()
                .into_iter()
                .filter(|q| q.x >= 0 && q.y >= 0 && q.x < 5 && q.y < 3)
                .collect::<Vec<_>>()
        };
        let first = solve(Position::new(0, 2), grid_neighbors, |_, _| 1, manhattan(goal), goal_at(goal));
        let second = solve(Position::new(0, 2), grid_neighbors, |_, _| 1, manhattan(goal), goal_at(goal));
        assert_eq!(first, second);
        assert_eq!(first.map(|p| p.len()), Some(7));
    }
}
