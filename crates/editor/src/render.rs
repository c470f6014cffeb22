//! Contract with the 3D view: a flat list of boxes to draw, and the pointer
//! events the view reports back.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use shared::{Appearance, Texture, Wall};

use crate::state::controller::ManipulationController;
use crate::state::plan::FloorPlanStore;

/// Color of the selected wall
pub const HIGHLIGHT_COLOR: &str = "orange";

/// Pointer events reported by the view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ViewEvent {
    /// Click on a wall, or on empty space when `None`
    Clicked { index: Option<usize> },
    /// Intermediate drag frame (visual only)
    DragFrame { index: usize, position: [f64; 3] },
    /// Drag gesture finished at `position`
    DragEnd { index: usize, position: [f64; 3] },
}

/// Resolved surface treatment: exactly one of textured or plain
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    Plain { color: String },
    Textured { texture: Texture, fallback_color: String },
}

impl Surface {
    pub fn from_appearance(appearance: &Appearance) -> Self {
        let color = appearance.resolved_color().to_string();
        match appearance.texture() {
            Some(texture) => Surface::Textured {
                texture,
                fallback_color: color,
            },
            None => Surface::Plain { color },
        }
    }
}

/// One box to draw
#[derive(Debug, Clone, PartialEq)]
pub struct BoxInstance {
    /// Index of the wall in the plan
    pub index: usize,
    pub center: Vec3,
    pub size: Vec3,
    /// Euler angles, radians
    pub rotation: Vec3,
    pub surface: Surface,
    pub highlighted: bool,
}

impl BoxInstance {
    fn from_wall(index: usize, wall: &Wall, highlighted: bool) -> Self {
        Self {
            index,
            center: to_vec3(wall.position),
            size: to_vec3(wall.size),
            rotation: to_vec3(wall.rotation),
            surface: Surface::from_appearance(&wall.appearance),
            highlighted,
        }
    }

    /// Flat color for untextured rendering (selected walls use the highlight)
    pub fn display_color(&self) -> &str {
        if self.highlighted {
            return HIGHLIGHT_COLOR;
        }
        match &self.surface {
            Surface::Plain { color } => color,
            Surface::Textured { fallback_color, .. } => fallback_color,
        }
    }
}

fn to_vec3(v: [f64; 3]) -> Vec3 {
    Vec3::new(v[0] as f32, v[1] as f32, v[2] as f32)
}

/// Boxes for the current plan. A drag in progress moves the preview only.
pub fn render_list(store: &FloorPlanStore, controller: &ManipulationController) -> Vec<BoxInstance> {
    let selected = store.selected();
    let preview = controller
        .drag_preview()
        .filter(|p| selected == Some(p.index));

    store
        .walls()
        .iter()
        .enumerate()
        .map(|(index, wall)| {
            let mut instance = BoxInstance::from_wall(index, wall, selected == Some(index));
            if let Some(p) = preview.filter(|p| p.index == index) {
                instance.center = to_vec3(p.position);
            }
            instance
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_is_exclusive() {
        let textured = Wall::at([0.0; 3]).with_color("white").with_texture(Texture::Brick);
        assert_eq!(
            Surface::from_appearance(&textured.appearance),
            Surface::Textured {
                texture: Texture::Brick,
                fallback_color: "white".into()
            }
        );

        let plain = Wall::at([0.0; 3]);
        assert_eq!(
            Surface::from_appearance(&plain.appearance),
            Surface::Plain {
                color: "gray".into()
            }
        );
    }

    #[test]
    fn test_render_list_highlights_selection() {
        let mut store = FloorPlanStore::new(vec![Wall::at([0.0; 3]), Wall::at([1.0, 0.0, 0.0])]);
        store.select(1);
        let boxes = render_list(&store, &ManipulationController::default());
        assert_eq!(boxes.len(), 2);
        assert!(!boxes[0].highlighted);
        assert!(boxes[1].highlighted);
        assert_eq!(boxes[1].display_color(), HIGHLIGHT_COLOR);
        assert_eq!(boxes[1].center, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_drag_frame_moves_preview_only() {
        let mut store = FloorPlanStore::new(vec![Wall::at([0.0; 3])]);
        let mut controller = ManipulationController::default();
        controller.handle(&mut store, ViewEvent::Clicked { index: Some(0) });
        controller.handle(
            &mut store,
            ViewEvent::DragFrame {
                index: 0,
                position: [3.0, 0.0, 0.0],
            },
        );
        let boxes = render_list(&store, &controller);
        assert_eq!(boxes[0].center, Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(store.walls()[0].position, [0.0; 3]);
    }

    #[test]
    fn test_view_event_json() {
        let event: ViewEvent =
            serde_json::from_str(r#"{"event": "drag_end", "index": 0, "position": [1, 0, 0]}"#)
                .unwrap();
        assert_eq!(
            event,
            ViewEvent::DragEnd {
                index: 0,
                position: [1.0, 0.0, 0.0]
            }
        );
    }
}
