//! Collision rules for movers on the cell grid
//!
//! Pure functions, no state. Movement is gated by `can_enter`; the
//! player-vs-adversary check uses plain circle overlap.

use glam::Vec2;

use super::grid::GridMap;
use super::mover::Direction;
use crate::error::SimResult;

/// Truncate a continuous position to the cell that contains it
#[inline]
pub fn cell_of(pos: Vec2) -> (i32, i32) {
    (pos.x as i32, pos.y as i32)
}

/// Whether a circle at `pos` lies entirely inside the maze interior
pub fn in_bounds(grid: &GridMap, pos: Vec2, radius: f32) -> bool {
    pos.x - radius >= 0.0
        && pos.y - radius >= 0.0
        && pos.x + radius <= grid.width() as f32
        && pos.y + radius <= grid.height() as f32
}

/// Check whether a mover may occupy `dest` while heading in `direction`.
///
/// Rejects a destination whose circle pokes outside the maze, whose center
/// cell is solid, or whose leading-edge probe (center offset by `radius`
/// along the heading) lands on a solid cell. Only that single probe point
/// is tested, so a move can clip the corner of a solid cell.
///
/// A stopped mover is always allowed to stay put.
pub fn can_enter(grid: &GridMap, dest: Vec2, radius: f32, direction: Direction) -> SimResult<bool> {
    if direction == Direction::Stopped {
        return Ok(true);
    }

    if !in_bounds(grid, dest, radius) {
        return Ok(false);
    }

    let (cx, cy) = cell_of(dest);
    if grid.cell_at(cx, cy)?.is_solid() {
        return Ok(false);
    }

    let probe = dest + direction.unit() * radius;
    let (px, py) = cell_of(probe);
    Ok(!grid.cell_at(px, py)?.is_solid())
}

/// True iff the two circles' centers are closer than the sum of the radii
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}
