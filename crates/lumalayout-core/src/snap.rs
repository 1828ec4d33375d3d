//! Grid snapping.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Default grid cell size in world units (matches the visual grid).
pub const DEFAULT_GRID_SIZE: f64 = 20.0;

/// Grid configuration shared by the input controller and renderers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSettings {
    /// Whether coordinates snap to the grid.
    pub snap_to_grid: bool,
    /// Grid cell size in world units.
    pub grid_size: f64,
    /// Whether the grid is drawn.
    pub show_grid: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            snap_to_grid: true,
            grid_size: DEFAULT_GRID_SIZE,
            show_grid: true,
        }
    }
}

impl GridSettings {
    /// Snap a coordinate if snapping is enabled, otherwise pass it through.
    pub fn apply(&self, v: f64) -> f64 {
        if self.snap_to_grid {
            snap_coord(v, self.grid_size)
        } else {
            v
        }
    }

    /// Snap a point if snapping is enabled, otherwise pass it through.
    pub fn apply_point(&self, p: Point) -> Point {
        if self.snap_to_grid {
            snap_point(p, self.grid_size)
        } else {
            p
        }
    }
}

/// Snap a scalar to the nearest grid line. Idempotent.
pub fn snap_coord(v: f64, grid_size: f64) -> f64 {
    (v / grid_size).round() * grid_size
}

/// Snap a point to the nearest grid intersection.
pub fn snap_point(p: Point, grid_size: f64) -> Point {
    Point::new(snap_coord(p.x, grid_size), snap_coord(p.y, grid_size))
}
