//! Floor-plan store
//!
//! Ordered walls plus the single selected index, with undo/redo history.

mod history;
mod wall_ops;

use shared::{FloorPlan, Wall};

use super::selection::{EditMode, SelectionState};

/// Maximum number of undo entries kept
const UNDO_LIMIT: usize = 100;

/// Walls of the current plan with selection and undo/redo history
#[derive(Default)]
pub struct FloorPlanStore {
    walls: FloorPlan,
    selection: SelectionState,
    /// Undo stack - previous plans
    pub(crate) undo_stack: Vec<FloorPlan>,
    /// Redo stack - undone plans
    pub(crate) redo_stack: Vec<FloorPlan>,
    /// Monotonically increasing version counter for cache invalidation
    pub(crate) version: u64,
}

impl FloorPlanStore {
    pub fn new(walls: FloorPlan) -> Self {
        Self {
            walls,
            ..Default::default()
        }
    }

    /// Current plan version (increments on every mutation)
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    /// Owned copy of the current plan
    pub fn snapshot(&self) -> FloorPlan {
        self.walls.clone()
    }

    pub fn len(&self) -> usize {
        self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Wall> {
        self.walls.get(index)
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selected(&self) -> Option<usize> {
        self.selection.primary()
    }

    pub fn mode(&self) -> EditMode {
        self.selection.mode()
    }

    /// Select wall `index`; out-of-range indices are ignored
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.walls.len() {
            self.selection.select(index);
            true
        } else {
            tracing::warn!("Select: wall {} out of range (len {})", index, self.walls.len());
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Save current plan to undo stack and drop the redo branch
    pub(crate) fn save_undo(&mut self) {
        self.undo_stack.push(self.walls.clone());
        if self.undo_stack.len() > UNDO_LIMIT {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }
}
