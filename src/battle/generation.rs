//! Procedural sector generation
//!
//! Grass, scattered trees, optional coastlines, a few walled houses joined by
//! paths, and a single weapon lying somewhere in the open. Generation never
//! fails: features that do not fit are left out.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::battle::grid::Grid;
use crate::battle::pathfinding::{self, Cost};
use crate::battle::terrain::{Overlay, Tile, TileBase};
use crate::core::config::GenerationConfig;
use crate::core::types::{Direction, Position};

/// Attempts per house before giving up on it
const HOUSE_ATTEMPTS: u32 = 10;
/// Clearance kept between a house and water or other houses
const HOUSE_MARGIN: i32 = 3;
const HOUSE_WIDTH: std::ops::RangeInclusive<i32> = 5..=10;
const HOUSE_HEIGHT: std::ops::RangeInclusive<i32> = 4..=7;
const COAST_CIRCLE_RADIUS: std::ops::RangeInclusive<i32> = 1..=4;

/// Output of sector generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sector {
    pub grid: Grid,
    /// Door of every house, in build order
    pub doors: Vec<Position>,
    /// Where the sector's weapon should be placed
    pub weapon: Option<Position>,
}

/// Generate a sector from a seed
pub fn generate_from_seed(config: &GenerationConfig, seed: u64) -> Sector {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generate_sector(config, &mut rng)
}

/// Generate a sector using the given RNG
pub fn generate_sector(config: &GenerationConfig, rng: &mut impl Rng) -> Sector {
    let mut grid = Grid::new(config.width, config.height);

    scatter_trees(&mut grid, config.tree_chance, rng);
    for edge in &config.coasts {
        paint_coast(&mut grid, *edge, config, rng);
    }

    let doors = build_houses(&mut grid, config.houses, rng);
    connect_doors(&mut grid, &doors);
    let weapon = find_weapon_spot(&grid, rng);

    tracing::debug!(
        "Generated {}x{} sector: {} houses, {} trees, weapon at {:?}",
        grid.width,
        grid.height,
        doors.len(),
        grid.count(|t| t.overlay == Overlay::Tree),
        weapon
    );

    Sector { grid, doors, weapon }
}

/// Trees everywhere except the outermost columns
fn scatter_trees(grid: &mut Grid, chance: f64, rng: &mut impl Rng) {
    if chance <= 0.0 {
        return;
    }
    let last_column = grid.width as i32 - 1;
    let candidates: Vec<Position> = grid
        .positions()
        .filter(|p| p.x != 0 && p.x != last_column)
        .collect();
    for pos in candidates {
        if rng.gen_bool(chance.min(1.0)) {
            grid.set_overlay(pos, Overlay::Tree);
        }
    }
}

/// Distance of a cell from the given edge
fn depth_from(grid: &Grid, edge: Direction, pos: Position) -> i32 {
    match edge {
        Direction::North => pos.y,
        Direction::South => grid.height as i32 - 1 - pos.y,
        Direction::West => pos.x,
        Direction::East => grid.width as i32 - 1 - pos.x,
    }
}

/// Water band along one edge, roughened by flipping random circles
fn paint_coast(grid: &mut Grid, edge: Direction, config: &GenerationConfig, rng: &mut impl Rng) {
    let width = config.coast_width as i32;
    let band: Vec<Position> = grid
        .positions()
        .filter(|p| depth_from(grid, edge, *p) < width)
        .collect();
    for pos in band {
        grid.set_tile(pos, Tile::WATER);
    }

    let along = match edge {
        Direction::North | Direction::South => grid.width as i32,
        Direction::East | Direction::West => grid.height as i32,
    };
    if along == 0 {
        return;
    }

    for _ in 0..config.coast_perturbations {
        let offset = rng.gen_range(0..along);
        let depth = width + rng.gen_range(-1..=1);
        let center = match edge {
            Direction::North => Position::new(offset, depth),
            Direction::South => Position::new(offset, grid.height as i32 - 1 - depth),
            Direction::West => Position::new(depth, offset),
            Direction::East => Position::new(grid.width as i32 - 1 - depth, offset),
        };
        let radius = rng.gen_range(COAST_CIRCLE_RADIUS);
        let to_water = rng.gen_bool(0.5);
        flip_circle(grid, center, radius, to_water);
    }
}

fn flip_circle(grid: &mut Grid, center: Position, radius: i32, to_water: bool) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            let pos = center.offset(dx, dy);
            let Some(tile) = grid.tile(pos).copied() else {
                continue;
            };
            // Only flip natural ground
            if !matches!(tile.base, TileBase::Grass | TileBase::Water) {
                continue;
            }
            if to_water {
                grid.set_tile(pos, Tile::WATER);
            } else if tile.base == TileBase::Water {
                grid.set_tile(pos, Tile::GRASS);
            }
        }
    }
}

/// Place up to `count` houses, returning their doors
fn build_houses(grid: &mut Grid, count: u32, rng: &mut impl Rng) -> Vec<Position> {
    let mut doors = Vec::new();

    for house in 0..count {
        let door = (0..HOUSE_ATTEMPTS).find_map(|_| try_place_house(grid, rng));
        match door {
            Some(door) => doors.push(door),
            None => tracing::debug!("House {} did not fit after {} attempts", house, HOUSE_ATTEMPTS),
        }
    }

    doors
}

fn try_place_house(grid: &mut Grid, rng: &mut impl Rng) -> Option<Position> {
    let w = rng.gen_range(HOUSE_WIDTH);
    let h = rng.gen_range(HOUSE_HEIGHT);
    let max_x = grid.width as i32 - w - HOUSE_MARGIN;
    let max_y = grid.height as i32 - h - HOUSE_MARGIN;
    if max_x < HOUSE_MARGIN || max_y < HOUSE_MARGIN {
        return None;
    }
    let left = rng.gen_range(HOUSE_MARGIN..=max_x);
    let top = rng.gen_range(HOUSE_MARGIN..=max_y);

    let collides = (top - HOUSE_MARGIN..top + h + HOUSE_MARGIN).any(|y| {
        (left - HOUSE_MARGIN..left + w + HOUSE_MARGIN).any(|x| {
            grid.tile(Position::new(x, y))
                .map_or(true, |t| matches!(t.base, TileBase::Water | TileBase::Floor))
        })
    });
    if collides {
        return None;
    }

    for y in top..top + h {
        for x in left..left + w {
            let on_border = x == left || x == left + w - 1 || y == top || y == top + h - 1;
            let overlay = if on_border { Overlay::Wall } else { Overlay::None };
            grid.set_tile(Position::new(x, y), Tile::new(TileBase::Floor, overlay));
        }
    }

    // Door on a random wall, never a corner
    let door = match rng.gen_range(0..4) {
        0 => Position::new(rng.gen_range(left + 1..left + w - 1), top),
        1 => Position::new(rng.gen_range(left + 1..left + w - 1), top + h - 1),
        2 => Position::new(left, rng.gen_range(top + 1..top + h - 1)),
        _ => Position::new(left + w - 1, rng.gen_range(top + 1..top + h - 1)),
    };
    grid.set_overlay(door, Overlay::None);

    let around: Vec<Position> = grid.neighbors8(door).collect();
    for pos in around {
        if grid.tile(pos).is_some_and(|t| t.overlay == Overlay::Tree) {
            grid.set_overlay(pos, Overlay::None);
        }
    }

    Some(door)
}

/// Cost of carving a path through a tile
fn path_carving_cost(tile: &Tile) -> Cost {
    match (tile.base, tile.overlay) {
        (TileBase::Pathway, _) => 1,
        (_, Overlay::Tree) => 4,
        _ => 2,
    }
}

fn carvable(tile: &Tile) -> bool {
    tile.overlay != Overlay::Wall && tile.base != TileBase::Water
}

/// Join every pair of doors with pathway
fn connect_doors(grid: &mut Grid, doors: &[Position]) {
    for (i, &from) in doors.iter().enumerate() {
        for &to in &doors[i + 1..] {
            let route = pathfinding::solve(
                from,
                |p| {
                    grid.neighbors4(*p)
                        .filter(|q| grid.tile(*q).is_some_and(carvable))
                        .collect::<Vec<_>>()
                },
                |_, q| grid.tile(*q).map_or(Cost::MAX / 2, path_carving_cost),
                pathfinding::manhattan(to),
                pathfinding::goal_at(to),
            );

            let Some(route) = route else {
                tracing::warn!("No path between doors {} and {}", from, to);
                continue;
            };

            for pos in route {
                // Traversed cells lose their trees as well
                if grid
                    .tile(pos)
                    .is_some_and(|t| matches!(t.base, TileBase::Grass | TileBase::Pathway))
                {
                    grid.set_tile(pos, Tile::new(TileBase::Pathway, Overlay::None));
                }
                let sides: Vec<Position> = grid.neighbors4(pos).collect();
                for side in sides {
                    if grid.tile(side).is_some_and(|t| t.base == TileBase::Grass) {
                        grid.set_base(side, TileBase::Pathway);
                    }
                }
            }
        }
    }
}

/// First open grass tile, scanning rows from a random column each
fn find_weapon_spot(grid: &Grid, rng: &mut impl Rng) -> Option<Position> {
    let width = grid.width as i32;
    for y in 0..grid.height as i32 {
        let start = rng.gen_range(0..width.max(1));
        for i in 0..width {
            let pos = Position::new((start + i) % width, y);
            if grid.tile(pos).is_some_and(|t| *t == Tile::GRASS) {
                return Some(pos);
            }
        }
    }
    None
}
