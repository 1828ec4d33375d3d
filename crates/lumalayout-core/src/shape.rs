//! Blueprint shape primitives.

use crate::id::{ShapeId, fresh_id};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Serializable RGBA8 color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Parse a `#rgb`, `#rrggbb`, or `#rrggbbaa` hex color.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.strip_prefix('#')?.trim();
        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
                Some(Self::rgb(r, g, b))
            }
            6 | 8 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                let a = if hex.len() == 8 {
                    u8::from_str_radix(&hex[6..8], 16).ok()?
                } else {
                    255
                };
                Some(Self::new(r, g, b, a))
            }
            _ => None,
        }
    }
}

/// Default fill for newly drawn blueprint shapes.
pub const DEFAULT_SHAPE_FILL: Color = Color::rgb(0xe2, 0xe8, 0xf0);
/// Default stroke for newly drawn blueprint shapes.
pub const DEFAULT_SHAPE_STROKE: Color = Color::rgb(0x33, 0x41, 0x55);
/// Default stroke width for newly drawn blueprint shapes.
pub const DEFAULT_SHAPE_STROKE_WIDTH: f64 = 2.0;

/// Geometric variant of a blueprint shape.
///
/// Every consumption site (hit-testing, rasterization) matches exhaustively,
/// so adding a variant is a compile-time-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Rect,
    Circle,
    Triangle,
}

/// A drawn room-geometry primitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintShape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    /// World-space center.
    pub position: Point,
    /// Bounding-box width; circle/triangle derive their radius from the
    /// smaller extent.
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees, clockwise.
    #[serde(default)]
    pub rotation: f64,
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f64,
    #[serde(default)]
    pub label: String,
    /// Paint order; only relative order matters.
    pub z_index: i32,
}

impl BlueprintShape {
    /// Create a shape with default styling and z-index 0.
    pub fn new(kind: ShapeKind, position: Point, width: f64, height: f64) -> Self {
        Self {
            id: fresh_id(),
            kind,
            position,
            width,
            height,
            rotation: 0.0,
            fill: DEFAULT_SHAPE_FILL,
            stroke: DEFAULT_SHAPE_STROKE,
            stroke_width: DEFAULT_SHAPE_STROKE_WIDTH,
            label: String::new(),
            z_index: 0,
        }
    }

    /// Radius used by the circle and triangle variants.
    pub fn radius(&self) -> f64 {
        self.width.min(self.height) / 2.0
    }

    /// Axis-aligned bounds of the unrotated bounding box.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x - self.width / 2.0,
            self.position.y - self.height / 2.0,
            self.position.x + self.width / 2.0,
            self.position.y + self.height / 2.0,
        )
    }

    /// Vertices of the triangle variant in world space (apex up before
    /// rotation).
    pub fn triangle_points(&self) -> [Point; 3] {
        let r = self.radius();
        let theta = self.rotation.to_radians();
        let vertex = |angle: f64| {
            let a = angle + theta;
            Point::new(
                self.position.x + r * a.cos(),
                self.position.y + r * a.sin(),
            )
        };
        // Regular polygon starting at the top, every 120 degrees.
        [
            vertex(-std::f64::consts::FRAC_PI_2),
            vertex(-std::f64::consts::FRAC_PI_2 + 2.0 * std::f64::consts::FRAC_PI_3),
            vertex(-std::f64::consts::FRAC_PI_2 + 4.0 * std::f64::consts::FRAC_PI_3),
        ]
    }

    /// Rotation-aware point containment test (world coordinates).
    pub fn hit_test(&self, point: Point) -> bool {
        let (lx, ly) = self.to_local(point);
        match self.kind {
            ShapeKind::Rect => lx.abs() <= self.width / 2.0 && ly.abs() <= self.height / 2.0,
            ShapeKind::Circle => {
                let r = self.radius();
                lx * lx + ly * ly <= r * r
            }
            ShapeKind::Triangle => {
                let r = self.radius();
                // Local-space vertices of the unrotated triangle.
                let pts = [
                    (0.0, -r),
                    (r * (2.0 * std::f64::consts::FRAC_PI_3 - std::f64::consts::FRAC_PI_2).cos(),
                     r * (2.0 * std::f64::consts::FRAC_PI_3 - std::f64::consts::FRAC_PI_2).sin()),
                    (r * (4.0 * std::f64::consts::FRAC_PI_3 - std::f64::consts::FRAC_PI_2).cos(),
                     r * (4.0 * std::f64::consts::FRAC_PI_3 - std::f64::consts::FRAC_PI_2).sin()),
                ];
                point_in_triangle((lx, ly), pts[0], pts[1], pts[2])
            }
        }
    }

    /// Map a world point into the shape's unrotated local frame.
    fn to_local(&self, point: Point) -> (f64, f64) {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        let theta = -self.rotation.to_radians();
        (
            dx * theta.cos() - dy * theta.sin(),
            dx * theta.sin() + dy * theta.cos(),
        )
    }
}

/// Sign-based point-in-triangle test.
fn point_in_triangle(p: (f64, f64), a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> bool {
    let sign = |p1: (f64, f64), p2: (f64, f64), p3: (f64, f64)| {
        (p1.0 - p3.0) * (p2.1 - p3.1) - (p2.0 - p3.0) * (p1.1 - p3.1)
    };
    let d1 = sign(p, a, b);
    let d2 = sign(p, b, c);
    let d3 = sign(p, c, a);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}
