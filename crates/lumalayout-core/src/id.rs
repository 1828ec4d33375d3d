//! Entity identity.

use uuid::Uuid;

/// Unique identifier for a scene.
pub type SceneId = Uuid;

/// Unique identifier for a lighting element.
pub type ElementId = Uuid;

/// Unique identifier for a blueprint shape.
pub type ShapeId = Uuid;

/// Identifier shared by all lighting elements of one group.
///
/// A group id is a relation between elements, never an ownership link:
/// clearing it on one member leaves the others untouched.
pub type GroupId = Uuid;

/// Unique identifier for a door or window marker.
pub type MarkerId = Uuid;

/// Generate a fresh entity id.
pub fn fresh_id() -> Uuid {
    Uuid::new_v4()
}
