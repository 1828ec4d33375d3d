//! Pure interaction geometry: marquee tests, transform bake-down, room
//! transforms, and label placement.

use crate::element::LightingElement;
use crate::id::ElementId;
use crate::snap::GridSettings;
use kurbo::{Affine, Point, Rect, Vec2};

/// Minimum edge length a blueprint shape can be resized to, in world units.
pub const MIN_SHAPE_EDGE: f64 = 10.0;

/// Minimum scaled edge length of a lighting icon under its resize handles.
pub const MIN_ICON_EDGE: f64 = 15.0;

/// Padding between an icon's enclosing circle and its annotation text.
pub const LABEL_CLEARANCE: f64 = 14.0;

/// World-space offset applied to duplicated entities.
pub const DUPLICATE_OFFSET: Vec2 = Vec2::new(20.0, 20.0);

/// Ids of all elements whose scaled bounding box overlaps a world-space
/// rectangle (marquee selection).
pub fn marquee_hits(elements: &[LightingElement], rect: Rect) -> Vec<ElementId> {
    let rect = normalized(rect);
    elements
        .iter()
        .filter(|el| {
            let (hw, hh) = el.scaled_half_extents();
            el.position.x + hw >= rect.x0
                && el.position.x - hw <= rect.x1
                && el.position.y + hh >= rect.y0
                && el.position.y - hh <= rect.y1
        })
        .map(|el| el.id)
        .collect()
}

/// Normalize a rect so x0 <= x1 and y0 <= y1.
pub fn normalized(rect: Rect) -> Rect {
    Rect::new(
        rect.x0.min(rect.x1),
        rect.y0.min(rect.y1),
        rect.x0.max(rect.x1),
        rect.y0.max(rect.y1),
    )
}

/// Bake an accumulated interactive scale factor into shape dimensions.
///
/// The floor keeps degenerate/inverted shapes impossible; the caller resets
/// its live scale to 1 afterwards so subsequent edits compose instead of
/// compounding.
pub fn bake_scale(width: f64, height: f64, scale_x: f64, scale_y: f64) -> (f64, f64) {
    (
        (width * scale_x).abs().max(MIN_SHAPE_EDGE),
        (height * scale_y).abs().max(MIN_SHAPE_EDGE),
    )
}

/// Clamp lighting-icon scale factors so neither scaled edge drops below
/// [`MIN_ICON_EDGE`]. The sign of a flip is preserved.
pub fn clamp_element_scale(width: f64, height: f64, scale_x: f64, scale_y: f64) -> (f64, f64) {
    let clamp = |size: f64, scale: f64| {
        if size <= 0.0 {
            return scale;
        }
        let min_mag = MIN_ICON_EDGE / size;
        let sign = if scale < 0.0 { -1.0 } else { 1.0 };
        sign * scale.abs().max(min_mag)
    };
    (clamp(width, scale_x), clamp(height, scale_y))
}

/// Apply a full affine to every room vertex individually, snapping each
/// result. Vertex data stays the single source of truth; the caller resets
/// its interactive handle back to identity.
pub fn transform_room_points(points: &[Point], affine: Affine, grid: &GridSettings) -> Vec<Point> {
    points.iter().map(|&p| grid.apply_point(affine * p)).collect()
}

/// Placement of an element's annotation text relative to the icon node.
#[derive(Debug, Clone, Copy)]
pub struct LabelPlacement {
    /// Label anchor in the icon's local (rotated, scaled) space.
    pub local_offset: Vec2,
    /// Counter-rotation in degrees keeping the text upright.
    pub counter_rotation: f64,
    /// Counter-scale keeping the text constant-size.
    pub counter_scale: (f64, f64),
}

/// Compute the label anchor that renders visually straight down from the
/// icon's center at every rotation/scale combination.
///
/// The anchor clears the icon's smallest enclosing circle (half-diagonal of
/// the scaled box) plus [`LABEL_CLEARANCE`]. Inverting the icon transform
/// for a pure screen-space downward offset of `d`:
///
/// ```text
/// (lx, ly) = Scale(1/sx, 1/sy) . Rotate(-theta) . (0, d)
///          = (d*sin(theta)/sx, d*cos(theta)/sy)
/// ```
pub fn label_placement(el: &LightingElement) -> LabelPlacement {
    let sx = if el.scale_x == 0.0 { 1.0 } else { el.scale_x };
    let sy = if el.scale_y == 0.0 { 1.0 } else { el.scale_y };
    let theta = el.rotation.to_radians();
    let half_diag = (el.width * sx / 2.0).hypot(el.height * sy / 2.0);
    let d = half_diag + LABEL_CLEARANCE;
    LabelPlacement {
        local_offset: Vec2::new(d * theta.sin() / sx, d * theta.cos() / sy),
        counter_rotation: -el.rotation,
        counter_scale: (1.0 / sx, 1.0 / sy),
    }
}

/// Distance from a point to a line segment a->b.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

/// Minimum distance from a point to a polyline; `closed` also considers the
/// wrap-around segment.
pub fn point_to_polyline_dist(point: Point, points: &[Point], closed: bool) -> f64 {
    let mut best = points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min);
    if closed && points.len() >= 3 {
        best = best.min(point_to_segment_dist(
            point,
            points[points.len() - 1],
            points[0],
        ));
    }
    best
}

/// Even-odd point-in-polygon test.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
