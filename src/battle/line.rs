//! Bresenham line tracing between two cells
//!
//! Shared by line of sight and ballistics. Each traced cell carries a
//! `progress` value: 1.0 at the origin, falling to 0.0 at the final cell.
//! Cover and attack scoring weight occlusion by it.

use serde::{Deserialize, Serialize};

use crate::core::types::Position;

/// One cell of a traced line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TracePoint {
    pub pos: Position,
    /// Fraction of the dominant-axis distance still ahead of this cell
    pub progress: f32,
}

/// Trace from `from` to `to`, both endpoints included
///
/// Tracing B to A visits exactly the cells of A to B in reverse order.
pub fn trace(from: Position, to: Position) -> Vec<TracePoint> {
    // Rasterize from the smaller endpoint so both directions agree on ties
    let cells = if from <= to {
        rasterize(from, to)
    } else {
        let mut cells = rasterize(to, from);
        cells.reverse();
        cells
    };

    let steps = cells.len().saturating_sub(1);
    cells
        .into_iter()
        .enumerate()
        .map(|(i, pos)| TracePoint {
            pos,
            progress: if steps == 0 {
                0.0
            } else {
                (steps - i) as f32 / steps as f32
            },
        })
        .collect()
}

/// Cells strictly between the endpoints
pub fn interior(from: Position, to: Position) -> Vec<TracePoint> {
    let mut points = trace(from, to);
    if points.len() < 2 {
        return Vec::new();
    }
    points.pop();
    points.remove(0);
    points
}

/// Integer Bresenham for all octants
fn rasterize(from: Position, to: Position) -> Vec<Position> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;

    let (mut x, mut y) = (from.x, from.y);
    let mut cells = Vec::with_capacity(dx.max(-dy) as usize + 1);

    loop {
        cells.push(Position::new(x, y));
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }

    cells
}
