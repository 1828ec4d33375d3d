//! LumaLayout core library.
//!
//! Scene-graph editing engine for film/photo lighting plots: the document
//! model (scenes, lighting elements, blueprint shapes, room polygon), the
//! mutation store with undo/redo history, the interaction geometry, and the
//! input controller that maps pointer/keyboard events to store calls.

pub mod camera;
pub mod editor;
pub mod element;
pub mod geometry;
pub mod history;
pub mod icons;
pub mod id;
pub mod input;
pub mod project;
pub mod scene;
pub mod selection;
pub mod shape;
pub mod snap;
pub mod storage;
pub mod store;
pub mod tools;

pub use camera::{Camera, ZOOM_WHEEL_STEP};
pub use editor::{Editor, Mode, action_for_key};
pub use element::LightingElement;
pub use icons::{IconCatalog, IconRef, MemoryIconCatalog, placement_size};
pub use id::{ElementId, GroupId, MarkerId, SceneId, ShapeId};
pub use input::{EditorAction, Modifiers, PointerButton};
pub use project::{ImportError, ProjectDocument};
pub use scene::{DoorMarker, DoorSwing, RoomPlan, Scene, SceneSnapshot, WindowMarker};
pub use selection::{Selection, ShapeTarget};
pub use shape::{BlueprintShape, Color, ShapeKind};
pub use snap::{GridSettings, snap_coord, snap_point};
pub use store::{ElementPatch, NewElement, NewShape, ProjectStore, ShapePatch};
pub use tools::{ToolKind, ToolManager};
