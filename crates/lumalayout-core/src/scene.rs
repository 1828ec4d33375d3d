//! Scenes and the room plan they contain.

use crate::element::LightingElement;
use crate::id::{ElementId, GroupId, MarkerId, SceneId, ShapeId, fresh_id};
use crate::shape::BlueprintShape;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Which way a door swings open, looking along the wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorSwing {
    Left,
    Right,
}

/// Door marker anchored to a wall position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorMarker {
    pub id: MarkerId,
    /// Hinge position on the wall.
    pub position: Point,
    /// Gap length along the wall.
    pub width: f64,
    /// Wall direction in degrees.
    pub wall_angle: f64,
    pub swing: DoorSwing,
    #[serde(default)]
    pub label: String,
}

impl DoorMarker {
    pub fn new(position: Point, width: f64, wall_angle: f64, swing: DoorSwing) -> Self {
        Self {
            id: fresh_id(),
            position,
            width,
            wall_angle,
            swing,
            label: String::new(),
        }
    }
}

/// Window marker anchored to a wall position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowMarker {
    pub id: MarkerId,
    pub position: Point,
    pub width: f64,
    pub wall_angle: f64,
    #[serde(default)]
    pub label: String,
}

impl WindowMarker {
    pub fn new(position: Point, width: f64, wall_angle: f64) -> Self {
        Self {
            id: fresh_id(),
            position,
            width,
            wall_angle,
            label: String::new(),
        }
    }
}

/// The room polygon and its wall markers.
///
/// Vertex insertion order defines the polygon boundary; the polygon only
/// renders filled once closed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomPlan {
    pub points: Vec<Point>,
    pub closed: bool,
    #[serde(default)]
    pub doors: Vec<DoorMarker>,
    #[serde(default)]
    pub windows: Vec<WindowMarker>,
}

impl RoomPlan {
    /// Closing needs at least three vertices.
    pub fn can_close(&self) -> bool {
        self.points.len() >= 3
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.doors.is_empty() && self.windows.is_empty()
    }

    /// Reset points, closed flag, and wall markers in one step.
    pub fn clear(&mut self) {
        self.points.clear();
        self.closed = false;
        self.doors.clear();
        self.windows.clear();
    }
}

/// One named canvas/page within a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    /// User-visible, mutable, not necessarily unique.
    pub name: String,
    /// Paint order derives from `z_index`, not list position.
    pub elements: Vec<LightingElement>,
    pub shapes: Vec<BlueprintShape>,
    pub room: RoomPlan,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: fresh_id(),
            name: name.into(),
            elements: Vec::new(),
            shapes: Vec::new(),
            room: RoomPlan::default(),
        }
    }

    pub fn element(&self, id: ElementId) -> Option<&LightingElement> {
        self.elements.iter().find(|el| el.id == id)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut LightingElement> {
        self.elements.iter_mut().find(|el| el.id == id)
    }

    pub fn shape(&self, id: ShapeId) -> Option<&BlueprintShape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn shape_mut(&mut self, id: ShapeId) -> Option<&mut BlueprintShape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    /// Next z-index above all existing elements (0 when empty).
    pub fn next_element_z(&self) -> i32 {
        self.elements
            .iter()
            .map(|el| el.z_index)
            .max()
            .map_or(0, |z| z + 1)
    }

    /// Next z-index above all existing shapes (0 when empty).
    pub fn next_shape_z(&self) -> i32 {
        self.shapes
            .iter()
            .map(|s| s.z_index)
            .max()
            .map_or(0, |z| z + 1)
    }

    /// Elements sorted back-to-front for painting and hit-testing.
    pub fn elements_by_paint_order(&self) -> Vec<&LightingElement> {
        let mut sorted: Vec<&LightingElement> = self.elements.iter().collect();
        sorted.sort_by_key(|el| el.z_index);
        sorted
    }

    /// Shapes sorted back-to-front.
    pub fn shapes_by_paint_order(&self) -> Vec<&BlueprintShape> {
        let mut sorted: Vec<&BlueprintShape> = self.shapes.iter().collect();
        sorted.sort_by_key(|s| s.z_index);
        sorted
    }

    /// Ids of all elements sharing a group.
    pub fn group_members(&self, group_id: GroupId) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|el| el.group_id == Some(group_id))
            .map(|el| el.id)
            .collect()
    }

    /// Deep-clone the mutable slice for history or export.
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            elements: self.elements.clone(),
            shapes: self.shapes.clone(),
            room: self.room.clone(),
        }
    }

    /// Replace the mutable slice with a snapshot's contents.
    pub fn restore(&mut self, snapshot: &SceneSnapshot) {
        self.elements = snapshot.elements.clone();
        self.shapes = snapshot.shapes.clone();
        self.room = snapshot.room.clone();
    }
}

/// Immutable deep copy of a scene's mutable slice, used as an undo/redo
/// checkpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub elements: Vec<LightingElement>,
    pub shapes: Vec<BlueprintShape>,
    pub room: RoomPlan,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icons::IconRef;

    fn element_at(x: f64, y: f64) -> LightingElement {
        LightingElement::new(IconRef::catalog("par-64"), Point::new(x, y), (60.0, 60.0))
    }

    #[test]
    fn test_new_scene_is_empty() {
        let scene = Scene::new("Scene 1");
        assert!(scene.elements.is_empty());
        assert!(scene.shapes.is_empty());
        assert!(scene.room.is_empty());
        assert!(!scene.room.closed);
    }

    #[test]
    fn test_next_z_indices() {
        let mut scene = Scene::new("Scene 1");
        assert_eq!(scene.next_element_z(), 0);

        let mut a = element_at(0.0, 0.0);
        a.z_index = 3;
        let mut b = element_at(10.0, 10.0);
        b.z_index = 7;
        scene.elements.push(a);
        scene.elements.push(b);
        assert_eq!(scene.next_element_z(), 8);
    }

    #[test]
    fn test_paint_order_sorts_by_z() {
        let mut scene = Scene::new("Scene 1");
        let mut a = element_at(0.0, 0.0);
        a.z_index = 5;
        let a_id = a.id;
        let mut b = element_at(10.0, 10.0);
        b.z_index = 1;
        let b_id = b.id;
        scene.elements.push(a);
        scene.elements.push(b);

        let order: Vec<_> = scene
            .elements_by_paint_order()
            .iter()
            .map(|el| el.id)
            .collect();
        assert_eq!(order, vec![b_id, a_id]);
    }

    #[test]
    fn test_room_clear_resets_everything() {
        let mut scene = Scene::new("Scene 1");
        scene.room.points = vec![Point::ZERO, Point::new(100.0, 0.0), Point::new(100.0, 100.0)];
        scene.room.closed = true;
        scene
            .room
            .doors
            .push(DoorMarker::new(Point::new(50.0, 0.0), 40.0, 0.0, DoorSwing::Left));
        scene
            .room
            .windows
            .push(WindowMarker::new(Point::new(100.0, 50.0), 30.0, 90.0));

        scene.room.clear();
        assert!(scene.room.is_empty());
        assert!(!scene.room.closed);
    }

    #[test]
    fn test_snapshot_restore_roundtrip() {
        let mut scene = Scene::new("Scene 1");
        scene.elements.push(element_at(1.0, 2.0));
        scene.room.points.push(Point::new(5.0, 5.0));

        let snap = scene.snapshot();
        scene.elements.clear();
        scene.room.points.clear();

        scene.restore(&snap);
        assert_eq!(scene.elements.len(), 1);
        assert_eq!(scene.room.points.len(), 1);
    }

    #[test]
    fn test_group_members() {
        let mut scene = Scene::new("Scene 1");
        let gid = fresh_id();
        let mut a = element_at(0.0, 0.0);
        a.group_id = Some(gid);
        let mut b = element_at(10.0, 10.0);
        b.group_id = Some(gid);
        let c = element_at(20.0, 20.0);
        let (a_id, b_id) = (a.id, b.id);
        scene.elements.extend([a, b, c]);

        assert_eq!(scene.group_members(gid), vec![a_id, b_id]);
    }
}
