//! Wall mutations: whole-plan replacement, per-wall patch, removal

use shared::{FloorPlan, Wall, WallPatch};

use super::FloorPlanStore;

impl FloorPlanStore {
    /// Replace the whole plan. Selection is always cleared.
    pub fn replace_all(&mut self, walls: FloorPlan) {
        self.save_undo();
        self.walls = walls;
        self.selection.clear();
        self.version += 1;
    }

    /// Overwrite the fields present in `patch` on wall `index`.
    ///
    /// Out-of-range indices are a no-op returning `false`. An empty patch
    /// succeeds without recording history.
    pub fn patch(&mut self, index: usize, patch: &WallPatch) -> bool {
        if index >= self.walls.len() {
            tracing::warn!("Patch: wall {} out of range (len {})", index, self.walls.len());
            return false;
        }
        if patch.is_empty() {
            return true;
        }

        self.save_undo();
        self.walls[index].apply(patch);
        self.version += 1;
        true
    }

    /// Drop wall `index`, shifting later walls down by one, and clear selection.
    ///
    /// Out-of-range indices are a no-op returning `None`.
    pub fn remove(&mut self, index: usize) -> Option<Wall> {
        if index >= self.walls.len() {
            tracing::warn!("Remove: wall {} out of range (len {})", index, self.walls.len());
            return None;
        }

        self.save_undo();
        let removed = self.walls.remove(index);
        self.selection.clear();
        self.version += 1;
        Some(removed)
    }
}
