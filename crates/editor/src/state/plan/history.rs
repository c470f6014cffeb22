//! Undo/redo functionality

use super::FloorPlanStore;

impl FloorPlanStore {
    /// Undo last change. Indices may shift, so selection is cleared.
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(prev) => {
                self.redo_stack.push(std::mem::replace(&mut self.walls, prev));
                self.selection.clear();
                self.version += 1;
                true
            }
            None => false,
        }
    }

    /// Redo last undone change
    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(next) => {
                self.undo_stack.push(std::mem::replace(&mut self.walls, next));
                self.selection.clear();
                self.version += 1;
                true
            }
            None => false,
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Wall, WallPatch};

    #[test]
    fn test_undo_redo_patch() {
        let mut store = FloorPlanStore::new(vec![Wall::at([0.0; 3])]);
        store.patch(0, &WallPatch::position([5.0, 0.0, 0.0]));
        assert!(store.undo());
        assert_eq!(store.walls()[0].position, [0.0; 3]);
        assert!(store.redo());
        assert_eq!(store.walls()[0].position, [5.0, 0.0, 0.0]);
    }

    #[test]
    fn test_undo_clears_selection() {
        let mut store = FloorPlanStore::new(vec![Wall::at([0.0; 3]), Wall::at([1.0; 3])]);
        store.remove(0);
        store.select(0);
        assert!(store.undo());
        assert_eq!(store.len(), 2);
        assert!(store.selected().is_none());
    }

    #[test]
    fn test_new_mutation_clears_redo() {
        let mut store = FloorPlanStore::new(vec![Wall::at([0.0; 3])]);
        store.patch(0, &WallPatch::position([1.0, 0.0, 0.0]));
        store.undo();
        assert!(store.can_redo());
        store.patch(0, &WallPatch::position([2.0, 0.0, 0.0]));
        assert!(!store.can_redo());
    }

    #[test]
    fn test_undo_on_empty_history() {
        let mut store = FloorPlanStore::default();
        assert!(!store.can_undo());
        assert!(!store.undo());
        assert!(!store.redo());
    }

    #[test]
    fn test_undo_limit() {
        let mut store = FloorPlanStore::new(vec![Wall::at([0.0; 3])]);
        for i in 0..150 {
            store.patch(0, &WallPatch::position([i as f64, 0.0, 0.0]));
        }
        assert_eq!(store.undo_stack.len(), 100);
    }
}
