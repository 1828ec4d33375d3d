//! Blueprint tool state machine.

use crate::scene::RoomPlan;
use crate::shape::ShapeKind;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Minimum preview width AND height for a drawn shape to commit, in world
/// units. Sub-threshold drags are discarded silently.
pub const MIN_DRAW_SIZE: f64 = 5.0;

/// Click radius around the first room vertex that closes the polygon, in
/// screen pixels (converted through the current zoom).
pub const ROOM_CLOSE_RADIUS: f64 = 15.0;

/// Blueprint editing tools, mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolKind {
    #[default]
    Select,
    Room,
    Rect,
    Circle,
    Triangle,
}

impl ToolKind {
    /// The shape variant a draw tool commits, if any.
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            ToolKind::Rect => Some(ShapeKind::Rect),
            ToolKind::Circle => Some(ShapeKind::Circle),
            ToolKind::Triangle => Some(ShapeKind::Triangle),
            ToolKind::Select | ToolKind::Room => None,
        }
    }
}

/// In-progress drag preview for the draw tools.
#[derive(Debug, Clone, Copy)]
pub struct DrawState {
    pub kind: ShapeKind,
    pub start: Point,
    pub current: Point,
}

impl DrawState {
    /// Preview rectangle spanned by the drag, corners normalized.
    pub fn preview_rect(&self) -> Rect {
        Rect::new(
            self.start.x.min(self.current.x),
            self.start.y.min(self.current.y),
            self.start.x.max(self.current.x),
            self.start.y.max(self.current.y),
        )
    }

    /// Whether releasing now would commit a shape.
    pub fn commits(&self) -> bool {
        let rect = self.preview_rect();
        rect.width() > MIN_DRAW_SIZE && rect.height() > MIN_DRAW_SIZE
    }
}

/// Tracks the active tool and any in-progress draw interaction.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    pub current: ToolKind,
    draw: Option<DrawState>,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch tools, cancelling any in-progress drawing.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current = tool;
        self.draw = None;
    }

    /// Begin a draw drag. No-op for non-draw tools.
    pub fn begin(&mut self, point: Point) {
        if let Some(kind) = self.current.shape_kind() {
            self.draw = Some(DrawState {
                kind,
                start: point,
                current: point,
            });
        }
    }

    /// Update the drag preview.
    pub fn update(&mut self, point: Point) {
        if let Some(draw) = &mut self.draw {
            draw.current = point;
        }
    }

    /// Finish the drag. Returns the committed kind and rect, or `None` when
    /// the preview stayed below the commit threshold.
    pub fn end(&mut self, point: Point) -> Option<(ShapeKind, Rect)> {
        let mut draw = self.draw.take()?;
        draw.current = point;
        if draw.commits() {
            Some((draw.kind, draw.preview_rect()))
        } else {
            None
        }
    }

    /// Abandon any in-progress drawing.
    pub fn cancel(&mut self) {
        self.draw = None;
    }

    pub fn is_drawing(&self) -> bool {
        self.draw.is_some()
    }

    /// Current draw preview for rendering.
    pub fn preview(&self) -> Option<&DrawState> {
        self.draw.as_ref()
    }
}

/// Whether a room-tool click at `world_click` closes the polygon instead of
/// appending a vertex.
pub fn closes_room(room: &RoomPlan, world_click: Point, zoom: f64) -> bool {
    if room.closed || !room.can_close() {
        return false;
    }
    let Some(&first) = room.points.first() else {
        return false;
    };
    let dist = (world_click.x - first.x).hypot(world_click.y - first.y);
    dist < ROOM_CLOSE_RADIUS / zoom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_commit_threshold() {
        let mut tools = ToolManager::new();
        tools.set_tool(ToolKind::Rect);
        tools.begin(Point::ZERO);
        tools.update(Point::new(4.0, 80.0));
        // Width below threshold: discarded silently.
        assert!(tools.end(Point::new(4.0, 80.0)).is_none());

        tools.begin(Point::ZERO);
        let (kind, rect) = tools.end(Point::new(40.0, 30.0)).unwrap();
        assert_eq!(kind, ShapeKind::Rect);
        assert_eq!(rect, Rect::new(0.0, 0.0, 40.0, 30.0));
    }

    #[test]
    fn test_draw_normalizes_corners() {
        let mut tools = ToolManager::new();
        tools.set_tool(ToolKind::Circle);
        tools.begin(Point::new(100.0, 100.0));
        let (_, rect) = tools.end(Point::new(40.0, 60.0)).unwrap();
        assert_eq!(rect, Rect::new(40.0, 60.0, 100.0, 100.0));
    }

    #[test]
    fn test_select_tool_never_draws() {
        let mut tools = ToolManager::new();
        tools.begin(Point::ZERO);
        assert!(!tools.is_drawing());
        assert!(tools.end(Point::new(100.0, 100.0)).is_none());
    }

    #[test]
    fn test_tool_switch_cancels_drawing() {
        let mut tools = ToolManager::new();
        tools.set_tool(ToolKind::Triangle);
        tools.begin(Point::ZERO);
        assert!(tools.is_drawing());
        tools.set_tool(ToolKind::Select);
        assert!(!tools.is_drawing());
    }

    #[test]
    fn test_closes_room_radius_scales_with_zoom() {
        let mut room = RoomPlan::default();
        room.points = vec![
            Point::ZERO,
            Point::new(200.0, 0.0),
            Point::new(200.0, 200.0),
        ];

        // Scenario B: a click 10 screen px from the first point closes.
        assert!(closes_room(&room, Point::new(10.0, 0.0), 1.0));
        assert!(!closes_room(&room, Point::new(20.0, 0.0), 1.0));
        // Zoomed in 2x, the world-space radius halves.
        assert!(!closes_room(&room, Point::new(10.0, 0.0), 2.0));

        room.points.pop();
        assert!(!closes_room(&room, Point::ZERO, 1.0));
    }

    #[test]
    fn test_closed_room_never_closes_again() {
        let mut room = RoomPlan::default();
        room.points = vec![
            Point::ZERO,
            Point::new(200.0, 0.0),
            Point::new(200.0, 200.0),
        ];
        room.closed = true;
        assert!(!closes_room(&room, Point::ZERO, 1.0));
    }
}
