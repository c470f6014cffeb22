//! Selection & manipulation: routes view events and material commands to
//! store mutations.

use serde::{Deserialize, Serialize};
use shared::{Appearance, Texture, Wall, WallPatch, DEFAULT_COLOR};

use super::plan::FloorPlanStore;
use super::selection::EditMode;
use crate::render::ViewEvent;

/// What happens to the selection when the selected wall is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Return to idle
    #[default]
    Clear,
    /// Keep focus on the shifted successor, or the new last wall
    Retarget,
}

/// Material choice offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    Plain,
    Brick,
    Wood,
    Concrete,
}

impl Material {
    pub fn texture(&self) -> Option<Texture> {
        match self {
            Material::Plain => None,
            Material::Brick => Some(Texture::Brick),
            Material::Wood => Some(Texture::Wood),
            Material::Concrete => Some(Texture::Concrete),
        }
    }
}

/// In-progress drag, shown by the view but not yet committed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPreview {
    pub index: usize,
    pub position: [f64; 3],
}

/// Idle / Editing(i) state machine over a [`FloorPlanStore`]
#[derive(Debug, Clone)]
pub struct ManipulationController {
    pub delete_policy: DeletePolicy,
    /// Color applied when the user picks the plain material
    pub default_color: String,
    drag: Option<DragPreview>,
}

impl Default for ManipulationController {
    fn default() -> Self {
        Self::new(DeletePolicy::default(), DEFAULT_COLOR)
    }
}

impl ManipulationController {
    pub fn new(delete_policy: DeletePolicy, default_color: impl Into<String>) -> Self {
        Self {
            delete_policy,
            default_color: default_color.into(),
            drag: None,
        }
    }

    pub fn drag_preview(&self) -> Option<&DragPreview> {
        self.drag.as_ref()
    }

    /// Apply a view event. Returns `true` if the plan itself changed.
    pub fn handle(&mut self, store: &mut FloorPlanStore, event: ViewEvent) -> bool {
        match event {
            ViewEvent::Clicked { index: Some(index) } => {
                self.drag = None;
                store.select(index);
                false
            }
            ViewEvent::Clicked { index: None } => {
                self.drag = None;
                store.clear_selection();
                false
            }
            ViewEvent::DragFrame { index, position } => {
                if store.mode() == EditMode::Editing(index) {
                    self.drag = Some(DragPreview { index, position });
                }
                false
            }
            ViewEvent::DragEnd { index, position } => {
                self.drag = None;
                if store.mode() != EditMode::Editing(index) {
                    tracing::warn!("Drag end on wall {} which is not selected", index);
                    return false;
                }
                store.patch(index, &WallPatch::position(position))
            }
        }
    }

    /// Apply a material to the selected wall.
    ///
    /// Plain clears the texture and sets the default color; a texture keeps
    /// the existing color as its load fallback.
    pub fn set_material(&mut self, store: &mut FloorPlanStore, material: Material) -> bool {
        let EditMode::Editing(index) = store.mode() else {
            tracing::warn!("Set material: no wall selected");
            return false;
        };
        let Some(wall) = store.get(index) else {
            return false;
        };

        let appearance = match material.texture() {
            None => Appearance::Plain {
                color: Some(self.default_color.clone()),
            },
            Some(texture) => Appearance::Textured {
                texture,
                fallback: wall.appearance.color().map(str::to_string),
            },
        };
        store.patch(index, &WallPatch::appearance(appearance))
    }

    /// Remove the selected wall, then apply the delete policy
    pub fn delete_selected(&mut self, store: &mut FloorPlanStore) -> Option<Wall> {
        let EditMode::Editing(index) = store.mode() else {
            return None;
        };
        self.drag = None;
        let removed = store.remove(index)?;

        if self.delete_policy == DeletePolicy::Retarget && !store.is_empty() {
            store.select(index.min(store.len() - 1));
        }
        Some(removed)
    }
}
