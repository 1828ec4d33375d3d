//! Lighting elements: placed equipment icons with annotations.

use crate::icons::IconRef;
use crate::id::{ElementId, GroupId, fresh_id};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

fn one() -> f64 {
    1.0
}

/// One placed icon/annotation in a scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightingElement {
    pub id: ElementId,
    /// Opaque icon reference; rendering resolves it or shows a placeholder.
    pub icon: IconRef,
    /// World-space center.
    pub position: Point,
    /// Unscaled base size, fixed at creation from the icon's natural aspect
    /// ratio.
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees, clockwise.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "one")]
    pub scale_x: f64,
    #[serde(default = "one")]
    pub scale_y: f64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub accessories: String,
    #[serde(default)]
    pub color_temperature: String,
    #[serde(default)]
    pub notes: String,
    /// Paint order; values need not be contiguous, only relative order
    /// matters.
    pub z_index: i32,
    /// Shared group relation; never an ownership link.
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

impl LightingElement {
    /// Create an element at the given center with a fixed base size.
    pub fn new(icon: IconRef, position: Point, (width, height): (f64, f64)) -> Self {
        Self {
            id: fresh_id(),
            icon,
            position,
            width,
            height,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            label: String::new(),
            accessories: String::new(),
            color_temperature: String::new(),
            notes: String::new(),
            z_index: 0,
            group_id: None,
        }
    }

    /// Half extents of the scaled bounding box.
    pub fn scaled_half_extents(&self) -> (f64, f64) {
        (
            (self.width * self.scale_x).abs() / 2.0,
            (self.height * self.scale_y).abs() / 2.0,
        )
    }

    /// Scaled axis-aligned bounds centered at the element position.
    pub fn bounds(&self) -> Rect {
        let (hw, hh) = self.scaled_half_extents();
        Rect::new(
            self.position.x - hw,
            self.position.y - hh,
            self.position.x + hw,
            self.position.y + hh,
        )
    }

    /// Exact rotation- and scale-aware point containment test.
    pub fn hit_test(&self, point: Point) -> bool {
        if self.scale_x == 0.0 || self.scale_y == 0.0 {
            return false;
        }
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        let theta = -self.rotation.to_radians();
        let rx = dx * theta.cos() - dy * theta.sin();
        let ry = dx * theta.sin() + dy * theta.cos();
        let lx = rx / self.scale_x;
        let ly = ry / self.scale_y;
        lx.abs() <= self.width / 2.0 && ly.abs() <= self.height / 2.0
    }

    /// Non-empty annotation lines, in display order.
    pub fn annotation_lines(&self) -> Vec<&str> {
        [
            self.label.as_str(),
            self.accessories.as_str(),
            self.color_temperature.as_str(),
            self.notes.as_str(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect()
    }
}
