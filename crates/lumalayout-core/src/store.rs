//! Project store: the single owner of document state and its mutation API.
//!
//! An explicit, constructed service object: instantiate once at application
//! start and hand it to the input/render layer. Every operation acts on the
//! current scene unless noted, reads fresh state at call time, and decides
//! for itself whether it is history-bearing.

use crate::element::LightingElement;
use crate::geometry::DUPLICATE_OFFSET;
use crate::history::History;
use crate::icons::IconRef;
use crate::id::{ElementId, GroupId, SceneId, ShapeId, fresh_id};
use crate::project::{ImportError, ProjectDocument};
use crate::scene::{DoorMarker, Scene, WindowMarker};
use crate::selection::{Selection, ShapeTarget};
use crate::shape::{
    BlueprintShape, Color, DEFAULT_SHAPE_FILL, DEFAULT_SHAPE_STROKE, DEFAULT_SHAPE_STROKE_WIDTH,
    ShapeKind,
};
use kurbo::Point;

/// Construction data for a new lighting element.
#[derive(Debug, Clone)]
pub struct NewElement {
    pub icon: IconRef,
    /// World-space center.
    pub position: Point,
    /// Base size, already derived from the icon's natural aspect ratio.
    pub size: (f64, f64),
}

impl NewElement {
    pub fn new(icon: IconRef, position: Point, size: (f64, f64)) -> Self {
        Self {
            icon,
            position,
            size,
        }
    }
}

/// Construction data for a new blueprint shape.
#[derive(Debug, Clone)]
pub struct NewShape {
    pub kind: ShapeKind,
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f64,
}

impl NewShape {
    pub fn new(kind: ShapeKind, position: Point, width: f64, height: f64) -> Self {
        Self {
            kind,
            position,
            width,
            height,
            fill: DEFAULT_SHAPE_FILL,
            stroke: DEFAULT_SHAPE_STROKE,
            stroke_width: DEFAULT_SHAPE_STROKE_WIDTH,
        }
    }
}

/// Shallow-merge patch for a lighting element. `None` fields are untouched.
#[derive(Debug, Clone, Default)]
pub struct ElementPatch {
    pub position: Option<Point>,
    pub rotation: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub label: Option<String>,
    pub accessories: Option<String>,
    pub color_temperature: Option<String>,
    pub notes: Option<String>,
    pub z_index: Option<i32>,
    /// `Some(None)` clears the group relation.
    pub group_id: Option<Option<GroupId>>,
}

impl ElementPatch {
    /// Patch that only moves the element.
    pub fn at(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    fn apply(&self, el: &mut LightingElement) {
        if let Some(position) = self.position {
            el.position = position;
        }
        if let Some(rotation) = self.rotation {
            el.rotation = rotation;
        }
        if let Some(scale_x) = self.scale_x {
            el.scale_x = scale_x;
        }
        if let Some(scale_y) = self.scale_y {
            el.scale_y = scale_y;
        }
        if let Some(label) = &self.label {
            el.label = label.clone();
        }
        if let Some(accessories) = &self.accessories {
            el.accessories = accessories.clone();
        }
        if let Some(color_temperature) = &self.color_temperature {
            el.color_temperature = color_temperature.clone();
        }
        if let Some(notes) = &self.notes {
            el.notes = notes.clone();
        }
        if let Some(z_index) = self.z_index {
            el.z_index = z_index;
        }
        if let Some(group_id) = self.group_id {
            el.group_id = group_id;
        }
    }
}

/// Shallow-merge patch for a blueprint shape.
#[derive(Debug, Clone, Default)]
pub struct ShapePatch {
    pub position: Option<Point>,
    pub rotation: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: Option<f64>,
    pub label: Option<String>,
    pub z_index: Option<i32>,
}

impl ShapePatch {
    /// Patch that only moves the shape.
    pub fn at(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    fn apply(&self, shape: &mut BlueprintShape) {
        if let Some(position) = self.position {
            shape.position = position;
        }
        if let Some(rotation) = self.rotation {
            shape.rotation = rotation;
        }
        if let Some(width) = self.width {
            shape.width = width;
        }
        if let Some(height) = self.height {
            shape.height = height;
        }
        if let Some(fill) = self.fill {
            shape.fill = fill;
        }
        if let Some(stroke) = self.stroke {
            shape.stroke = stroke;
        }
        if let Some(stroke_width) = self.stroke_width {
            shape.stroke_width = stroke_width;
        }
        if let Some(label) = &self.label {
            shape.label = label.clone();
        }
        if let Some(z_index) = self.z_index {
            shape.z_index = z_index;
        }
    }
}

/// Owns the scene list, the current-scene pointer, undo/redo history, and
/// the transient selection.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    scenes: Vec<Scene>,
    current_scene_id: SceneId,
    history: History,
    selection: Selection,
    dirty: bool,
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectStore {
    /// Create a store with a single fresh scene.
    pub fn new() -> Self {
        let scene = Scene::new("Scene 1");
        let current_scene_id = scene.id;
        Self {
            scenes: vec![scene],
            current_scene_id,
            history: History::new(),
            selection: Selection::default(),
            dirty: false,
        }
    }

    // ---- Accessors -------------------------------------------------------

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn current_scene_id(&self) -> SceneId {
        self.current_scene_id
    }

    pub fn scene(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == id)
    }

    /// The scene all unqualified operations act on.
    ///
    /// The scene list is never empty and `current_scene_id` always resolves,
    /// so the fallback to the first scene is unreachable in practice.
    pub fn current_scene(&self) -> &Scene {
        self.scenes
            .iter()
            .find(|s| s.id == self.current_scene_id)
            .unwrap_or(&self.scenes[0])
    }

    fn current_scene_mut(&mut self) -> &mut Scene {
        let idx = self
            .scenes
            .iter()
            .position(|s| s.id == self.current_scene_id)
            .unwrap_or(0);
        &mut self.scenes[idx]
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_elements(&self) -> &[ElementId] {
        self.selection.elements()
    }

    pub fn selected_shapes(&self) -> &[ShapeTarget] {
        self.selection.shapes()
    }

    /// Deep-cloned current scene for the export collaborator; in-flight
    /// exports are immune to later edits.
    pub fn scene_snapshot(&self) -> Scene {
        self.current_scene().clone()
    }

    // ---- History ---------------------------------------------------------

    /// Capture the pre-mutation state of the current scene.
    fn record_history(&mut self) {
        let snap = self.current_scene().snapshot();
        self.history.record(snap);
        self.dirty = true;
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Step back one history entry. Clears selection: restored state may not
    /// contain the selected ids, and stale ids are dropped, not reconciled.
    pub fn undo(&mut self) -> bool {
        let live = self.current_scene().snapshot();
        let Some(snap) = self.history.undo(live) else {
            return false;
        };
        self.current_scene_mut().restore(&snap);
        self.selection.clear_all();
        self.dirty = true;
        true
    }

    /// Step forward one history entry. Clears selection like `undo`.
    pub fn redo(&mut self) -> bool {
        let Some(snap) = self.history.redo() else {
            return false;
        };
        self.current_scene_mut().restore(&snap);
        self.selection.clear_all();
        self.dirty = true;
        true
    }

    // ---- Elements --------------------------------------------------------

    /// Add an element on top of the paint order and select it.
    pub fn add_element(&mut self, new: NewElement) -> ElementId {
        self.record_history();
        let mut element = LightingElement::new(new.icon, new.position, new.size);
        element.z_index = self.current_scene().next_element_z();
        let id = element.id;
        self.current_scene_mut().elements.push(element);
        self.selection.set_elements(vec![id]);
        id
    }

    /// Shallow-merge a patch without touching history (live-drag feedback).
    pub fn update_element(&mut self, id: ElementId, patch: ElementPatch) -> bool {
        match self.current_scene_mut().element_mut(id) {
            Some(el) => {
                patch.apply(el);
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Like [`update_element`](Self::update_element) but snapshots first
    /// (drag-end / transform-end commit).
    pub fn update_element_with_history(&mut self, id: ElementId, patch: ElementPatch) -> bool {
        if self.current_scene().element(id).is_none() {
            return false;
        }
        self.record_history();
        self.update_element(id, patch)
    }

    /// Apply a per-element patch function to several elements atomically
    /// under one history snapshot, so a multi-select drag is exactly one
    /// undo step.
    pub fn update_elements_with_history<F>(&mut self, ids: &[ElementId], patch_for: F)
    where
        F: Fn(&LightingElement) -> ElementPatch,
    {
        if !ids.iter().any(|&id| self.current_scene().element(id).is_some()) {
            return;
        }
        self.record_history();
        let scene = self.current_scene_mut();
        for &id in ids {
            if let Some(el) = scene.element_mut(id) {
                let patch = patch_for(el);
                patch.apply(el);
            }
        }
    }

    /// Delete one element, pruning it from the selection.
    pub fn delete_element(&mut self, id: ElementId) -> bool {
        if self.current_scene().element(id).is_none() {
            return false;
        }
        self.record_history();
        self.current_scene_mut().elements.retain(|el| el.id != id);
        self.selection.remove_element(id);
        true
    }

    /// Delete every selected element under one history snapshot.
    pub fn delete_selected_elements(&mut self) {
        let ids: Vec<ElementId> = self.selection.elements().to_vec();
        if ids.is_empty() {
            return;
        }
        self.record_history();
        self.current_scene_mut()
            .elements
            .retain(|el| !ids.contains(&el.id));
        self.selection.clear_elements();
    }

    /// Clone an element with a fresh id, offset position, and top z-index;
    /// the clone becomes the selection.
    pub fn duplicate_element(&mut self, id: ElementId) -> Option<ElementId> {
        self.current_scene().element(id)?;
        self.record_history();
        let clone_id = self.clone_element(id);
        if let Some(clone_id) = clone_id {
            self.selection.set_elements(vec![clone_id]);
        }
        clone_id
    }

    /// Duplicate every selected element under one history snapshot; the
    /// clones become the selection.
    pub fn duplicate_selected_elements(&mut self) -> Vec<ElementId> {
        let ids: Vec<ElementId> = self.selection.elements().to_vec();
        if ids.is_empty() {
            return Vec::new();
        }
        self.record_history();
        let clones: Vec<ElementId> = ids
            .iter()
            .filter_map(|&id| self.clone_element(id))
            .collect();
        self.selection.set_elements(clones.clone());
        clones
    }

    fn clone_element(&mut self, id: ElementId) -> Option<ElementId> {
        let next_z = self.current_scene().next_element_z();
        let scene = self.current_scene_mut();
        let source = scene.element(id)?;
        let mut clone = source.clone();
        clone.id = fresh_id();
        clone.position += DUPLICATE_OFFSET;
        clone.z_index = next_z;
        let clone_id = clone.id;
        scene.elements.push(clone);
        Some(clone_id)
    }

    // ---- Grouping --------------------------------------------------------

    /// Assign a freshly generated shared group id to the selection.
    /// Requires at least two selected elements.
    pub fn group_selected_elements(&mut self) -> Option<GroupId> {
        let ids: Vec<ElementId> = self.selection.elements().to_vec();
        if ids.len() < 2 {
            return None;
        }
        self.record_history();
        let group_id = fresh_id();
        let scene = self.current_scene_mut();
        for id in ids {
            if let Some(el) = scene.element_mut(id) {
                el.group_id = Some(group_id);
            }
        }
        Some(group_id)
    }

    /// Clear the group relation on all members. A stale or already-cleared
    /// group id is a safe no-op and pushes no history.
    pub fn ungroup_elements(&mut self, group_id: GroupId) {
        if self.current_scene().group_members(group_id).is_empty() {
            return;
        }
        self.record_history();
        let scene = self.current_scene_mut();
        for el in scene.elements.iter_mut() {
            if el.group_id == Some(group_id) {
                el.group_id = None;
            }
        }
    }

    /// Ids of all elements sharing a group in the current scene.
    pub fn group_members(&self, group_id: GroupId) -> Vec<ElementId> {
        self.current_scene().group_members(group_id)
    }

    // ---- Z-order ---------------------------------------------------------

    /// Raise an element one above the current maximum z-index.
    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        if self.current_scene().element(id).is_none() {
            return false;
        }
        self.record_history();
        let top = self.current_scene().next_element_z();
        if let Some(el) = self.current_scene_mut().element_mut(id) {
            el.z_index = top;
        }
        true
    }

    /// Lower an element one below the current minimum z-index.
    pub fn send_to_back(&mut self, id: ElementId) -> bool {
        if self.current_scene().element(id).is_none() {
            return false;
        }
        self.record_history();
        let bottom = self
            .current_scene()
            .elements
            .iter()
            .map(|el| el.z_index)
            .min()
            .map_or(0, |z| z - 1);
        if let Some(el) = self.current_scene_mut().element_mut(id) {
            el.z_index = bottom;
        }
        true
    }

    // ---- Shapes ----------------------------------------------------------

    /// Add a blueprint shape on top of the shape paint order.
    pub fn add_shape(&mut self, new: NewShape) -> ShapeId {
        self.record_history();
        let mut shape = BlueprintShape::new(new.kind, new.position, new.width, new.height);
        shape.fill = new.fill;
        shape.stroke = new.stroke;
        shape.stroke_width = new.stroke_width;
        shape.z_index = self.current_scene().next_shape_z();
        let id = shape.id;
        self.current_scene_mut().shapes.push(shape);
        id
    }

    /// Shallow-merge a patch without touching history.
    pub fn update_shape(&mut self, id: ShapeId, patch: ShapePatch) -> bool {
        match self.current_scene_mut().shape_mut(id) {
            Some(shape) => {
                patch.apply(shape);
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Like [`update_shape`](Self::update_shape) but snapshots first.
    pub fn update_shape_with_history(&mut self, id: ShapeId, patch: ShapePatch) -> bool {
        if self.current_scene().shape(id).is_none() {
            return false;
        }
        self.record_history();
        self.update_shape(id, patch)
    }

    /// Delete one shape, pruning it from the blueprint selection.
    pub fn delete_shape(&mut self, id: ShapeId) -> bool {
        if self.current_scene().shape(id).is_none() {
            return false;
        }
        self.record_history();
        self.current_scene_mut().shapes.retain(|s| s.id != id);
        self.selection.remove_shape(ShapeTarget::Shape(id));
        true
    }

    /// Delete every selected blueprint target under one history snapshot.
    /// Selecting the room deletes the room geometry (points, markers).
    pub fn delete_selected_shapes(&mut self) {
        let targets: Vec<ShapeTarget> = self.selection.shapes().to_vec();
        if targets.is_empty() {
            return;
        }
        self.record_history();
        let scene = self.current_scene_mut();
        for target in &targets {
            match target {
                ShapeTarget::Shape(id) => scene.shapes.retain(|s| s.id != *id),
                ShapeTarget::Room => scene.room.clear(),
            }
        }
        self.selection.clear_shapes();
    }

    // ---- Room ------------------------------------------------------------

    /// Append a room vertex.
    pub fn add_room_point(&mut self, point: Point) {
        self.record_history();
        self.current_scene_mut().room.points.push(point);
    }

    /// Close the room polygon. Fewer than three vertices is a no-op; the
    /// caller gates the gesture, the store just refuses to corrupt state.
    pub fn close_room(&mut self) -> bool {
        let room = &self.current_scene().room;
        if room.closed || !room.can_close() {
            return false;
        }
        self.record_history();
        self.current_scene_mut().room.closed = true;
        true
    }

    /// Reset points, closed flag, and wall markers atomically.
    pub fn clear_room(&mut self) {
        if self.current_scene().room.is_empty() {
            return;
        }
        self.record_history();
        self.current_scene_mut().room.clear();
    }

    /// Replace all room vertices (drag/transform commit).
    pub fn set_room_points(&mut self, points: Vec<Point>) {
        self.record_history();
        self.current_scene_mut().room.points = points;
    }

    pub fn add_door(&mut self, door: DoorMarker) {
        self.record_history();
        self.current_scene_mut().room.doors.push(door);
    }

    pub fn add_window(&mut self, window: WindowMarker) {
        self.record_history();
        self.current_scene_mut().room.windows.push(window);
    }

    // ---- Selection -------------------------------------------------------

    /// Select one element; `additive` toggles membership.
    pub fn select_element(&mut self, id: ElementId, additive: bool) {
        if self.current_scene().element(id).is_none() {
            return;
        }
        self.selection.select_element(id, additive);
    }

    /// Replace the element selection wholesale (marquee commit), dropping
    /// ids that do not resolve.
    pub fn set_selected_elements(&mut self, ids: Vec<ElementId>) {
        let ids = ids
            .into_iter()
            .filter(|&id| self.current_scene().element(id).is_some())
            .collect();
        self.selection.set_elements(ids);
    }

    /// Add elements to the selection without removing existing ones.
    pub fn extend_selected_elements(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        self.selection.extend_elements(ids);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear_elements();
    }

    /// Select one blueprint target; `additive` toggles membership.
    pub fn select_shape(&mut self, target: ShapeTarget, additive: bool) {
        if let ShapeTarget::Shape(id) = target {
            if self.current_scene().shape(id).is_none() {
                return;
            }
        }
        self.selection.select_shape(target, additive);
    }

    pub fn clear_shape_selection(&mut self) {
        self.selection.clear_shapes();
    }

    // ---- Scenes ----------------------------------------------------------

    /// Append a fresh scene and make it current.
    pub fn add_scene(&mut self) -> SceneId {
        let scene = Scene::new(format!("Scene {}", self.scenes.len() + 1));
        let id = scene.id;
        self.scenes.push(scene);
        self.switch_to(id);
        self.dirty = true;
        id
    }

    /// Remove a scene. Deleting the current scene falls back to the last
    /// remaining one; deleting the only scene substitutes a fresh default.
    pub fn delete_scene(&mut self, id: SceneId) -> bool {
        let Some(idx) = self.scenes.iter().position(|s| s.id == id) else {
            return false;
        };
        self.scenes.remove(idx);
        self.dirty = true;

        if self.scenes.is_empty() {
            let scene = Scene::new("Scene 1");
            let new_id = scene.id;
            self.scenes.push(scene);
            self.switch_to(new_id);
        } else if self.current_scene_id == id {
            let last = self.scenes[self.scenes.len() - 1].id;
            self.switch_to(last);
        }
        true
    }

    pub fn rename_scene(&mut self, id: SceneId, name: impl Into<String>) -> bool {
        match self.scenes.iter_mut().find(|s| s.id == id) {
            Some(scene) => {
                scene.name = name.into();
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Reorder the scene list. Ignored unless `order` is a permutation of
    /// the current scene ids.
    pub fn reorder_scenes(&mut self, order: &[SceneId]) -> bool {
        if order.len() != self.scenes.len() {
            return false;
        }
        let mut reordered = Vec::with_capacity(order.len());
        for &id in order {
            match self.scenes.iter().find(|s| s.id == id) {
                Some(scene) => reordered.push(scene.clone()),
                None => return false,
            }
        }
        // Reject duplicate ids in the requested order.
        let mut seen = std::collections::HashSet::new();
        if !order.iter().all(|id| seen.insert(*id)) {
            return false;
        }
        self.scenes = reordered;
        self.dirty = true;
        true
    }

    /// Switch the current scene. Selection never crosses scenes and history
    /// never crosses scenes, so both are cleared on an actual switch.
    pub fn set_current_scene(&mut self, id: SceneId) -> bool {
        if self.scene(id).is_none() {
            return false;
        }
        if id != self.current_scene_id {
            self.switch_to(id);
        }
        true
    }

    fn switch_to(&mut self, id: SceneId) {
        self.current_scene_id = id;
        self.selection.clear_all();
        self.history.clear();
    }

    // ---- Persistence -----------------------------------------------------

    /// Canonical serialized form of the document.
    pub fn export_data(&self) -> serde_json::Result<String> {
        ProjectDocument::new(self.scenes.clone(), self.current_scene_id).to_json()
    }

    /// Replace the whole document. On any failure the store is left
    /// entirely unchanged; on success history and selection reset.
    pub fn import_data(&mut self, json: &str) -> Result<(), ImportError> {
        let doc = ProjectDocument::from_json(json).inspect_err(|err| {
            log::warn!("rejected project import: {err}");
        })?;
        self.scenes = doc.scenes;
        self.current_scene_id = doc.current_scene_id;
        self.selection.clear_all();
        self.history.clear();
        self.dirty = false;
        log::info!("imported project with {} scene(s)", self.scenes.len());
        Ok(())
    }

    /// Whether the document changed since the last `mark_saved`.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Shell signal: the document was written out.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snap::snap_coord;

    fn new_element_at(x: f64, y: f64) -> NewElement {
        NewElement::new(IconRef::catalog("fresnel-650"), Point::new(x, y), (60.0, 30.0))
    }

    fn store_with_elements(n: usize) -> (ProjectStore, Vec<ElementId>) {
        let mut store = ProjectStore::new();
        let ids = (0..n)
            .map(|i| store.add_element(new_element_at(i as f64 * 100.0, 100.0)))
            .collect();
        (store, ids)
    }

    #[test]
    fn test_add_element_assigns_z_and_selects() {
        let (store, ids) = store_with_elements(2);
        let scene = store.current_scene();
        assert_eq!(scene.element(ids[0]).unwrap().z_index, 0);
        assert_eq!(scene.element(ids[1]).unwrap().z_index, 1);
        assert_eq!(store.selected_elements(), &[ids[1]]);
    }

    #[test]
    fn test_update_element_has_no_history() {
        let (mut store, ids) = store_with_elements(1);
        let entries_before = store.can_undo();
        store.update_element(ids[0], ElementPatch::at(Point::new(5.0, 5.0)));
        // Only the add has history; the live update added nothing.
        assert_eq!(store.can_undo(), entries_before);
        store.undo();
        assert!(store.current_scene().elements.is_empty());
    }

    #[test]
    fn test_update_with_history_is_undoable() {
        let (mut store, ids) = store_with_elements(1);
        store.update_element_with_history(ids[0], ElementPatch::at(Point::new(7.0, 9.0)));
        assert_eq!(
            store.current_scene().element(ids[0]).unwrap().position,
            Point::new(7.0, 9.0)
        );
        store.undo();
        assert_eq!(
            store.current_scene().element(ids[0]).unwrap().position,
            Point::new(0.0, 100.0)
        );
    }

    #[test]
    fn test_multi_update_is_one_history_entry() {
        // Scenario C: three elements dragged by (15, -8) with snapping on.
        let (mut store, ids) = store_with_elements(3);
        let delta = kurbo::Vec2::new(15.0, -8.0);
        store.update_elements_with_history(&ids, |el| {
            ElementPatch::at(Point::new(
                snap_coord(el.position.x + delta.x, 20.0),
                snap_coord(el.position.y + delta.y, 20.0),
            ))
        });

        for (i, &id) in ids.iter().enumerate() {
            let el = store.current_scene().element(id).unwrap();
            assert_eq!(el.position.x, snap_coord(i as f64 * 100.0 + 15.0, 20.0));
            assert_eq!(el.position.y, snap_coord(100.0 - 8.0, 20.0));
        }

        // One undo reverts the whole drag, not a third of it.
        store.undo();
        for (i, &id) in ids.iter().enumerate() {
            let el = store.current_scene().element(id).unwrap();
            assert_eq!(el.position, Point::new(i as f64 * 100.0, 100.0));
        }
    }

    #[test]
    fn test_delete_prunes_selection() {
        let (mut store, ids) = store_with_elements(2);
        store.set_selected_elements(ids.clone());
        store.delete_element(ids[0]);
        assert_eq!(store.selected_elements(), &[ids[1]]);
        assert!(store.current_scene().element(ids[0]).is_none());
    }

    #[test]
    fn test_delete_selected_is_one_entry() {
        let (mut store, ids) = store_with_elements(3);
        store.set_selected_elements(ids.clone());
        store.delete_selected_elements();
        assert!(store.current_scene().elements.is_empty());
        assert!(store.selected_elements().is_empty());
        store.undo();
        assert_eq!(store.current_scene().elements.len(), 3);
    }

    #[test]
    fn test_duplicate_scenario_a() {
        // Scenario A: element at (100,100), bring_to_front, duplicate.
        let mut store = ProjectStore::new();
        let e1 = store.add_element(new_element_at(100.0, 100.0));
        store.bring_to_front(e1);
        let clone = store.duplicate_element(e1).unwrap();

        let scene = store.current_scene();
        let original = scene.element(e1).unwrap();
        let duplicate = scene.element(clone).unwrap();
        assert_ne!(duplicate.id, original.id);
        assert_eq!(duplicate.position, Point::new(120.0, 120.0));
        assert!(duplicate.z_index > original.z_index);
        assert_eq!(store.selected_elements(), &[clone]);
    }

    #[test]
    fn test_duplicate_selected_is_one_entry() {
        let (mut store, ids) = store_with_elements(2);
        store.set_selected_elements(ids.clone());
        let clones = store.duplicate_selected_elements();
        assert_eq!(clones.len(), 2);
        assert_eq!(store.current_scene().elements.len(), 4);
        assert_eq!(store.selected_elements(), &clones[..]);

        store.undo();
        assert_eq!(store.current_scene().elements.len(), 2);
    }

    #[test]
    fn test_group_scenario_d() {
        // Scenario D: grouping survives member deletion.
        let (mut store, ids) = store_with_elements(2);
        store.set_selected_elements(ids.clone());
        let gid = store.group_selected_elements().unwrap();

        for &id in &ids {
            assert_eq!(
                store.current_scene().element(id).unwrap().group_id,
                Some(gid)
            );
        }

        store.delete_element(ids[0]);
        assert_eq!(
            store.current_scene().element(ids[1]).unwrap().group_id,
            Some(gid)
        );
    }

    #[test]
    fn test_group_requires_two() {
        let (mut store, ids) = store_with_elements(1);
        store.set_selected_elements(ids);
        assert!(store.group_selected_elements().is_none());
    }

    #[test]
    fn test_ungroup_stale_id_is_noop() {
        let (mut store, _) = store_with_elements(1);
        let before = store.can_undo();
        store.ungroup_elements(fresh_id());
        assert_eq!(store.can_undo(), before);
    }

    #[test]
    fn test_ungroup_clears_members() {
        let (mut store, ids) = store_with_elements(2);
        store.set_selected_elements(ids.clone());
        let gid = store.group_selected_elements().unwrap();
        store.ungroup_elements(gid);
        for &id in &ids {
            assert_eq!(store.current_scene().element(id).unwrap().group_id, None);
        }
    }

    #[test]
    fn test_z_order_monotonicity() {
        let (mut store, ids) = store_with_elements(3);
        store.bring_to_front(ids[0]);
        let z0 = store.current_scene().element(ids[0]).unwrap().z_index;
        for &other in &ids[1..] {
            assert!(z0 > store.current_scene().element(other).unwrap().z_index);
        }

        store.send_to_back(ids[0]);
        let z0 = store.current_scene().element(ids[0]).unwrap().z_index;
        for &other in &ids[1..] {
            assert!(z0 < store.current_scene().element(other).unwrap().z_index);
        }
    }

    #[test]
    fn test_delete_selected_shapes_includes_room() {
        let mut store = ProjectStore::new();
        let kept = store.add_shape(NewShape::new(
            ShapeKind::Rect,
            Point::new(0.0, 0.0),
            40.0,
            40.0,
        ));
        let doomed = store.add_shape(NewShape::new(
            ShapeKind::Circle,
            Point::new(100.0, 0.0),
            40.0,
            40.0,
        ));
        store.set_room_points(vec![
            Point::ZERO,
            Point::new(200.0, 0.0),
            Point::new(200.0, 200.0),
        ]);

        store.select_shape(ShapeTarget::Shape(doomed), false);
        store.select_shape(ShapeTarget::Room, true);
        assert_eq!(store.selected_shapes().len(), 2);

        store.delete_selected_shapes();
        assert!(store.current_scene().shape(doomed).is_none());
        assert!(store.current_scene().shape(kept).is_some());
        assert!(store.current_scene().room.points.is_empty());
        assert!(store.selected_shapes().is_empty());

        // One undo restores the shape and the room together.
        store.undo();
        assert!(store.current_scene().shape(doomed).is_some());
        assert_eq!(store.current_scene().room.points.len(), 3);
    }

    #[test]
    fn test_close_room_requires_three_points() {
        let mut store = ProjectStore::new();
        store.add_room_point(Point::ZERO);
        store.add_room_point(Point::new(100.0, 0.0));
        assert!(!store.close_room());
        assert!(!store.current_scene().room.closed);

        store.add_room_point(Point::new(100.0, 100.0));
        assert!(store.close_room());
        assert!(store.current_scene().room.closed);
        // Closing twice is a no-op.
        assert!(!store.close_room());
    }

    #[test]
    fn test_clear_room_resets_atomically() {
        let mut store = ProjectStore::new();
        store.add_room_point(Point::ZERO);
        store.add_room_point(Point::new(100.0, 0.0));
        store.add_room_point(Point::new(100.0, 100.0));
        store.close_room();
        store.add_door(DoorMarker::new(
            Point::new(50.0, 0.0),
            40.0,
            0.0,
            crate::scene::DoorSwing::Left,
        ));

        store.clear_room();
        assert!(store.current_scene().room.is_empty());
        assert!(!store.current_scene().room.closed);

        // One undo restores the full room state.
        store.undo();
        assert_eq!(store.current_scene().room.points.len(), 3);
        assert!(store.current_scene().room.closed);
        assert_eq!(store.current_scene().room.doors.len(), 1);
    }

    #[test]
    fn test_wall_markers_are_history_bearing() {
        let mut store = ProjectStore::new();
        store.add_door(DoorMarker::new(
            Point::new(50.0, 0.0),
            40.0,
            0.0,
            crate::scene::DoorSwing::Right,
        ));
        store.add_window(WindowMarker::new(Point::new(120.0, 0.0), 30.0, 0.0));
        assert_eq!(store.current_scene().room.doors.len(), 1);
        assert_eq!(store.current_scene().room.windows.len(), 1);

        store.undo();
        assert!(store.current_scene().room.windows.is_empty());
        store.undo();
        assert!(store.current_scene().room.doors.is_empty());
    }

    #[test]
    fn test_patch_merges_only_set_fields() {
        let (mut store, ids) = store_with_elements(1);
        store.update_element(
            ids[0],
            ElementPatch {
                label: Some("Key light".to_string()),
                notes: Some("half CTO".to_string()),
                rotation: Some(45.0),
                ..ElementPatch::default()
            },
        );

        let el = store.current_scene().element(ids[0]).unwrap();
        assert_eq!(el.label, "Key light");
        assert_eq!(el.notes, "half CTO");
        assert!((el.rotation - 45.0).abs() < f64::EPSILON);
        // Untouched fields keep their values.
        assert_eq!(el.position, Point::new(0.0, 100.0));
        assert!((el.scale_x - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scene_delete_falls_back() {
        let mut store = ProjectStore::new();
        let first = store.current_scene_id();
        let second = store.add_scene();
        let third = store.add_scene();
        assert_eq!(store.current_scene_id(), third);

        // Deleting a non-current scene leaves the pointer alone.
        store.delete_scene(second);
        assert_eq!(store.current_scene_id(), third);

        // Deleting the current scene falls back to the last remaining one.
        store.delete_scene(third);
        assert_eq!(store.current_scene_id(), first);

        // Deleting the only scene substitutes a fresh default.
        store.delete_scene(first);
        assert_eq!(store.scenes().len(), 1);
        assert_eq!(store.current_scene_id(), store.scenes()[0].id);
    }

    #[test]
    fn test_scene_switch_clears_selection_and_history() {
        let (mut store, ids) = store_with_elements(1);
        let first = store.current_scene_id();
        store.set_selected_elements(ids);
        assert!(store.can_undo());

        let second = store.add_scene();
        assert_eq!(store.current_scene_id(), second);
        assert!(store.selected_elements().is_empty());
        assert!(!store.can_undo());

        store.set_current_scene(first);
        assert_eq!(store.current_scene_id(), first);
        assert!(store.selected_elements().is_empty());
    }

    #[test]
    fn test_rename_and_reorder() {
        let mut store = ProjectStore::new();
        let first = store.current_scene_id();
        let second = store.add_scene();

        assert!(store.rename_scene(first, "Stage A"));
        assert_eq!(store.scene(first).unwrap().name, "Stage A");

        assert!(store.reorder_scenes(&[second, first]));
        assert_eq!(store.scenes()[0].id, second);

        // Not a permutation: rejected.
        assert!(!store.reorder_scenes(&[second]));
        assert!(!store.reorder_scenes(&[second, second]));
    }

    #[test]
    fn test_undo_redo_inverse_law() {
        let mut store = ProjectStore::new();
        let baseline = store.export_data().unwrap();

        let id = store.add_element(new_element_at(100.0, 100.0));
        store.update_element_with_history(id, ElementPatch::at(Point::new(140.0, 160.0)));
        store.bring_to_front(id);
        let final_state = store.export_data().unwrap();

        assert!(store.undo());
        assert!(store.undo());
        assert!(store.undo());
        assert!(!store.undo());
        assert_eq!(store.export_data().unwrap(), baseline);

        assert!(store.redo());
        assert!(store.redo());
        assert!(store.redo());
        assert!(!store.redo());
        assert_eq!(store.export_data().unwrap(), final_state);
    }

    #[test]
    fn test_history_branch_truncation() {
        let mut store = ProjectStore::new();
        store.add_element(new_element_at(0.0, 0.0));
        store.add_element(new_element_at(50.0, 0.0));

        store.undo();
        assert!(store.can_redo());
        store.add_element(new_element_at(90.0, 0.0));
        assert!(!store.can_redo());
        assert!(!store.redo());
    }

    #[test]
    fn test_undo_clears_selection() {
        let (mut store, ids) = store_with_elements(1);
        store.set_selected_elements(ids);
        store.undo();
        assert!(store.selected_elements().is_empty());
    }

    #[test]
    fn test_import_scenario_e() {
        // Scenario E: invalid JSON leaves the document untouched.
        let (mut store, _) = store_with_elements(2);
        let before = store.export_data().unwrap();

        assert!(store.import_data("{ not json").is_err());
        assert_eq!(store.export_data().unwrap(), before);
        assert_eq!(store.current_scene().elements.len(), 2);
    }

    #[test]
    fn test_import_export_roundtrip() {
        let (mut source, _) = store_with_elements(2);
        source.add_room_point(Point::ZERO);
        let json = source.export_data().unwrap();

        let mut target = ProjectStore::new();
        target.add_element(new_element_at(999.0, 999.0));
        target.import_data(&json).unwrap();

        assert_eq!(target.scenes().len(), 1);
        assert_eq!(target.current_scene().elements.len(), 2);
        assert_eq!(target.current_scene().room.points.len(), 1);
        assert!(target.selected_elements().is_empty());
        assert!(!target.can_undo());
        assert!(!target.is_dirty());
    }

    #[test]
    fn test_dirty_tracking() {
        let mut store = ProjectStore::new();
        assert!(!store.is_dirty());
        store.add_element(new_element_at(0.0, 0.0));
        assert!(store.is_dirty());
        store.mark_saved();
        assert!(!store.is_dirty());
    }
}
