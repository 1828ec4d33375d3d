//! Input controller: maps pointer and keyboard events to store mutations.
//!
//! The editor owns the store, camera, grid, and tool state. Live drags are
//! preview state here: the store is only written at drag-end, so undo
//! always restores the true pre-drag state.

use crate::camera::{Camera, ZOOM_WHEEL_STEP};
use crate::geometry::{
    bake_scale, clamp_element_scale, marquee_hits, normalized, point_in_polygon,
    point_to_polyline_dist, transform_room_points,
};
use crate::icons::{IconCatalog, IconRef, placement_size};
use crate::id::{ElementId, ShapeId};
use crate::input::{EditorAction, Modifiers, PointerButton};
use crate::selection::ShapeTarget;
use crate::snap::GridSettings;
use crate::store::{ElementPatch, NewElement, NewShape, ProjectStore, ShapePatch};
use crate::tools::{ToolKind, ToolManager, closes_room};
use kurbo::{Affine, Point, Rect, Vec2};
use std::collections::HashMap;

/// Marquee releases moving less than this many screen pixels are
/// deselect-clicks, not marquee commits.
pub const CLICK_THRESHOLD: f64 = 5.0;

/// Screen-pixel tolerance for hitting the room polyline.
const ROOM_HIT_TOLERANCE: f64 = 7.0;

/// Editing layer the pointer currently operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Blueprint,
    Lighting,
}

/// Active pointer interaction.
#[derive(Debug, Clone)]
enum PointerState {
    Idle,
    Panning {
        last: Point,
    },
    Marquee {
        start: Point,
        current: Point,
    },
    DragElements {
        start_world: Point,
        current_world: Point,
        starts: HashMap<ElementId, Point>,
        /// Set when the press landed on an already-selected element; a
        /// zero-movement release then re-selects just that element.
        pending_click: Option<ElementId>,
    },
    DragShape {
        id: ShapeId,
        start_world: Point,
        current_world: Point,
        origin: Point,
    },
    DragRoom {
        start_world: Point,
        current_world: Point,
        origin_points: Vec<Point>,
    },
    Drawing,
}

/// The interactive editing session over one project.
#[derive(Debug)]
pub struct Editor {
    pub store: ProjectStore,
    pub camera: Camera,
    pub grid: GridSettings,
    pub mode: Mode,
    pub tools: ToolManager,
    pointer: PointerState,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::with_store(ProjectStore::new())
    }

    pub fn with_store(store: ProjectStore) -> Self {
        Self {
            store,
            camera: Camera::new(),
            grid: GridSettings::default(),
            mode: Mode::default(),
            tools: ToolManager::new(),
            pointer: PointerState::Idle,
        }
    }

    /// Switch editing layers, abandoning any in-progress interaction.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.tools.cancel();
        self.pointer = PointerState::Idle;
    }

    // ---- Pointer events --------------------------------------------------

    pub fn pointer_down(&mut self, screen: Point, button: PointerButton, mods: Modifiers) {
        if button == PointerButton::Middle {
            self.pointer = PointerState::Panning { last: screen };
            return;
        }
        if button != PointerButton::Left {
            return;
        }

        match self.mode {
            Mode::Blueprint => self.blueprint_pointer_down(screen, mods),
            Mode::Lighting => self.lighting_pointer_down(screen, mods),
        }
    }

    fn blueprint_pointer_down(&mut self, screen: Point, mods: Modifiers) {
        let world = self.camera.screen_to_world(screen);
        let snapped = self.grid.apply_point(world);

        match self.tools.current {
            ToolKind::Room => {
                let room = &self.store.current_scene().room;
                if room.closed {
                    return;
                }
                if closes_room(room, snapped, self.camera.zoom) {
                    self.store.close_room();
                } else {
                    self.store.add_room_point(snapped);
                }
            }
            ToolKind::Rect | ToolKind::Circle | ToolKind::Triangle => {
                self.tools.begin(snapped);
                self.pointer = PointerState::Drawing;
            }
            ToolKind::Select => {
                if let Some(id) = self.topmost_shape_at(world) {
                    self.store.select_shape(ShapeTarget::Shape(id), mods.additive());
                    if self.store.selection().contains_shape(ShapeTarget::Shape(id)) {
                        let origin = self
                            .store
                            .current_scene()
                            .shape(id)
                            .map(|s| s.position)
                            .unwrap_or(world);
                        self.pointer = PointerState::DragShape {
                            id,
                            start_world: world,
                            current_world: world,
                            origin,
                        };
                    }
                } else if self.room_hit(world) {
                    self.store.select_shape(ShapeTarget::Room, mods.additive());
                    if self.store.selection().contains_shape(ShapeTarget::Room) {
                        self.pointer = PointerState::DragRoom {
                            start_world: world,
                            current_world: world,
                            origin_points: self.store.current_scene().room.points.clone(),
                        };
                    }
                } else {
                    self.store.clear_shape_selection();
                }
            }
        }
    }

    fn lighting_pointer_down(&mut self, screen: Point, mods: Modifiers) {
        let world = self.camera.screen_to_world(screen);

        let Some(id) = self.topmost_element_at(world) else {
            self.store.clear_selection();
            self.pointer = PointerState::Marquee {
                start: screen,
                current: screen,
            };
            return;
        };

        let mut pending_click = None;
        if self.store.selection().contains_element(id) && !mods.additive() {
            // Keep the multi-selection for dragging; a plain release will
            // collapse the selection to this element instead.
            pending_click = Some(id);
        } else {
            self.select_element_group_aware(id, mods.additive());
        }

        if self.store.selection().contains_element(id) {
            let starts = self
                .store
                .selected_elements()
                .iter()
                .filter_map(|&sel| {
                    self.store
                        .current_scene()
                        .element(sel)
                        .map(|el| (sel, el.position))
                })
                .collect();
            self.pointer = PointerState::DragElements {
                start_world: world,
                current_world: world,
                starts,
                pending_click,
            };
        }
    }

    pub fn pointer_move(&mut self, screen: Point) {
        match &mut self.pointer {
            PointerState::Idle => {}
            PointerState::Panning { last } => {
                let delta = Vec2::new(screen.x - last.x, screen.y - last.y);
                *last = screen;
                self.camera.pan(delta);
            }
            PointerState::Marquee { current, .. } => {
                *current = screen;
            }
            PointerState::Drawing => {
                let snapped = self.grid.apply_point(self.camera.screen_to_world(screen));
                self.tools.update(snapped);
            }
            PointerState::DragElements { current_world, .. }
            | PointerState::DragShape { current_world, .. }
            | PointerState::DragRoom { current_world, .. } => {
                *current_world = self.camera.screen_to_world(screen);
            }
        }
    }

    pub fn pointer_up(&mut self, screen: Point) {
        let state = std::mem::replace(&mut self.pointer, PointerState::Idle);
        match state {
            PointerState::Idle | PointerState::Panning { .. } => {}
            PointerState::Drawing => {
                let snapped = self.grid.apply_point(self.camera.screen_to_world(screen));
                if let Some((kind, rect)) = self.tools.end(snapped) {
                    self.store.add_shape(NewShape::new(
                        kind,
                        rect.center(),
                        rect.width(),
                        rect.height(),
                    ));
                }
            }
            PointerState::Marquee { start, current } => {
                let span = normalized(Rect::new(start.x, start.y, current.x, current.y));
                if span.width() <= CLICK_THRESHOLD && span.height() <= CLICK_THRESHOLD {
                    // Deselect-click; selection was already cleared on press.
                    return;
                }
                let world_rect = self.camera.screen_rect_to_world(span);
                let ids = marquee_hits(&self.store.current_scene().elements, world_rect);
                self.store.set_selected_elements(ids);
            }
            PointerState::DragElements {
                start_world,
                current_world,
                starts,
                pending_click,
            } => {
                let delta = current_world - start_world;
                if delta.hypot() < f64::EPSILON {
                    if let Some(id) = pending_click {
                        self.select_element_group_aware(id, false);
                    }
                    return;
                }
                let ids: Vec<ElementId> = starts.keys().copied().collect();
                let grid = self.grid.clone();
                self.store.update_elements_with_history(&ids, |el| {
                    let start = starts.get(&el.id).copied().unwrap_or(el.position);
                    ElementPatch::at(grid.apply_point(start + delta))
                });
            }
            PointerState::DragShape {
                id,
                start_world,
                current_world,
                origin,
            } => {
                let delta = current_world - start_world;
                if delta.hypot() < f64::EPSILON {
                    return;
                }
                let snapped = self.grid.apply_point(origin + delta);
                self.store
                    .update_shape_with_history(id, ShapePatch::at(snapped));
            }
            PointerState::DragRoom {
                start_world,
                current_world,
                origin_points,
            } => {
                let delta = current_world - start_world;
                if delta.x.abs() < 0.5 && delta.y.abs() < 0.5 {
                    return;
                }
                let moved: Vec<Point> = origin_points
                    .iter()
                    .map(|&p| self.grid.apply_point(p + delta))
                    .collect();
                self.store.set_room_points(moved);
            }
        }
    }

    /// Place a new element dropped from the icon palette at a screen
    /// position. The icon's natural size fixes the element's base size
    /// once, at placement time; the new element becomes the selection.
    pub fn place_element(
        &mut self,
        icon: IconRef,
        screen: Point,
        catalog: &dyn IconCatalog,
    ) -> ElementId {
        let world = self.grid.apply_point(self.camera.screen_to_world(screen));
        let size = placement_size(catalog.natural_size(&icon));
        self.store.add_element(NewElement::new(icon, world, size))
    }

    /// Wheel zoom about the pointer position.
    pub fn wheel_zoom(&mut self, screen: Point, delta_y: f64) {
        let factor = if delta_y < 0.0 {
            ZOOM_WHEEL_STEP
        } else {
            1.0 / ZOOM_WHEEL_STEP
        };
        self.camera.zoom_at(screen, factor);
    }

    // ---- Keyboard --------------------------------------------------------

    /// Map a key press to an action and apply it.
    pub fn key_pressed(&mut self, key: &str, mods: Modifiers) -> bool {
        match action_for_key(key, mods, self.mode) {
            Some(action) => {
                self.apply_action(action);
                true
            }
            None => false,
        }
    }

    /// Apply a discrete editor command (shortcut or menu invocation).
    pub fn apply_action(&mut self, action: EditorAction) {
        match action {
            EditorAction::Undo => {
                self.store.undo();
            }
            EditorAction::Redo => {
                self.store.redo();
            }
            EditorAction::Duplicate => {
                self.store.duplicate_selected_elements();
            }
            EditorAction::Group => {
                self.store.group_selected_elements();
            }
            EditorAction::Ungroup => {
                let groups: Vec<_> = self
                    .store
                    .selected_elements()
                    .iter()
                    .filter_map(|&id| {
                        self.store
                            .current_scene()
                            .element(id)
                            .and_then(|el| el.group_id)
                    })
                    .collect();
                for gid in groups {
                    self.store.ungroup_elements(gid);
                }
            }
            EditorAction::DeleteSelected => match self.mode {
                Mode::Lighting => self.store.delete_selected_elements(),
                Mode::Blueprint => self.store.delete_selected_shapes(),
            },
            EditorAction::Escape => {
                self.store.clear_selection();
                self.store.clear_shape_selection();
                self.tools.cancel();
                self.pointer = PointerState::Idle;
            }
            EditorAction::SelectTool => self.tools.set_tool(ToolKind::Select),
            EditorAction::RoomTool => self.tools.set_tool(ToolKind::Room),
            EditorAction::RectTool => self.tools.set_tool(ToolKind::Rect),
            EditorAction::CircleTool => self.tools.set_tool(ToolKind::Circle),
            EditorAction::TriangleTool => self.tools.set_tool(ToolKind::Triangle),
        }
    }

    // ---- Transform commits ----------------------------------------------

    /// Commit a lighting-icon transform at handle release. Scale factors
    /// persist on the element, clamped so no scaled edge collapses.
    pub fn commit_element_transform(
        &mut self,
        id: ElementId,
        position: Point,
        rotation: f64,
        scale_x: f64,
        scale_y: f64,
    ) {
        let Some(el) = self.store.current_scene().element(id) else {
            return;
        };
        let (scale_x, scale_y) = clamp_element_scale(el.width, el.height, scale_x, scale_y);
        self.store.update_element_with_history(
            id,
            ElementPatch {
                position: Some(position),
                rotation: Some(rotation),
                scale_x: Some(scale_x),
                scale_y: Some(scale_y),
                ..ElementPatch::default()
            },
        );
    }

    /// Commit a blueprint-shape transform at handle release, baking the
    /// accumulated scale into width/height so the handle resets to identity.
    pub fn commit_shape_transform(
        &mut self,
        id: ShapeId,
        position: Point,
        rotation: f64,
        scale_x: f64,
        scale_y: f64,
    ) {
        let Some(shape) = self.store.current_scene().shape(id) else {
            return;
        };
        let (width, height) = bake_scale(shape.width, shape.height, scale_x, scale_y);
        self.store.update_shape_with_history(
            id,
            ShapePatch {
                position: Some(position),
                rotation: Some(rotation),
                width: Some(width),
                height: Some(height),
                ..ShapePatch::default()
            },
        );
    }

    /// Commit a whole-room transform: the full affine applies to every
    /// vertex, each result snaps, and the caller resets its handle node.
    pub fn commit_room_transform(&mut self, affine: Affine) {
        let points = self.store.current_scene().room.points.clone();
        if points.is_empty() {
            return;
        }
        let moved = transform_room_points(&points, affine, &self.grid);
        self.store.set_room_points(moved);
    }

    // ---- Preview accessors (for the renderer) ---------------------------

    /// Screen-space marquee rectangle while one is active.
    pub fn marquee_rect(&self) -> Option<Rect> {
        match &self.pointer {
            PointerState::Marquee { start, current } => Some(normalized(Rect::new(
                start.x, start.y, current.x, current.y,
            ))),
            _ => None,
        }
    }

    /// Preview position of an element during a live drag, before commit.
    pub fn element_preview_position(&self, id: ElementId) -> Option<Point> {
        match &self.pointer {
            PointerState::DragElements {
                start_world,
                current_world,
                starts,
                ..
            } => {
                let start = starts.get(&id)?;
                Some(*start + (*current_world - *start_world))
            }
            _ => None,
        }
    }

    /// True while a drag, marquee, or drawing interaction is in flight.
    pub fn is_interacting(&self) -> bool {
        !matches!(self.pointer, PointerState::Idle)
    }

    // ---- Hit testing -----------------------------------------------------

    fn topmost_element_at(&self, world: Point) -> Option<ElementId> {
        self.store
            .current_scene()
            .elements_by_paint_order()
            .iter()
            .rev()
            .find(|el| el.hit_test(world))
            .map(|el| el.id)
    }

    fn topmost_shape_at(&self, world: Point) -> Option<ShapeId> {
        self.store
            .current_scene()
            .shapes_by_paint_order()
            .iter()
            .rev()
            .find(|s| s.hit_test(world))
            .map(|s| s.id)
    }

    fn room_hit(&self, world: Point) -> bool {
        let room = &self.store.current_scene().room;
        if room.points.len() < 2 {
            return false;
        }
        if room.closed && point_in_polygon(world, &room.points) {
            return true;
        }
        point_to_polyline_dist(world, &room.points, room.closed)
            <= ROOM_HIT_TOLERANCE / self.camera.zoom
    }

    /// Selecting any member of a group selects the whole group; an additive
    /// click on a fully-selected group contracts it instead.
    fn select_element_group_aware(&mut self, id: ElementId, additive: bool) {
        let Some(el) = self.store.current_scene().element(id) else {
            return;
        };
        let Some(gid) = el.group_id else {
            self.store.select_element(id, additive);
            return;
        };

        let members = self.store.group_members(gid);
        if additive {
            let all_selected = members
                .iter()
                .all(|m| self.store.selection().contains_element(*m));
            if all_selected {
                let remaining: Vec<ElementId> = self
                    .store
                    .selected_elements()
                    .iter()
                    .copied()
                    .filter(|sel| !members.contains(sel))
                    .collect();
                self.store.set_selected_elements(remaining);
            } else {
                self.store.extend_selected_elements(members);
            }
        } else {
            self.store.set_selected_elements(members);
        }
    }
}

/// Map a key press to an editor action. Tool hotkeys only apply in
/// blueprint mode and never while a command modifier is held.
pub fn action_for_key(key: &str, mods: Modifiers, mode: Mode) -> Option<EditorAction> {
    let key = key.to_ascii_lowercase();
    match key.as_str() {
        "z" if mods.command() && mods.shift => Some(EditorAction::Redo),
        "z" if mods.command() => Some(EditorAction::Undo),
        "y" if mods.command() => Some(EditorAction::Redo),
        "d" if mods.command() => Some(EditorAction::Duplicate),
        "g" if mods.command() && mods.shift => Some(EditorAction::Ungroup),
        "g" if mods.command() => Some(EditorAction::Group),
        "delete" | "backspace" => Some(EditorAction::DeleteSelected),
        "escape" => Some(EditorAction::Escape),
        _ if mode == Mode::Blueprint && !mods.command() && !mods.alt => match key.as_str() {
            "v" => Some(EditorAction::SelectTool),
            "p" => Some(EditorAction::RoomTool),
            "r" => Some(EditorAction::RectTool),
            "c" => Some(EditorAction::CircleTool),
            "t" => Some(EditorAction::TriangleTool),
            _ => None,
        },
        _ => None,
    }
}
