/// Editing mode derived from the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    /// Nothing selected
    Idle,
    /// Wall at this index is selected
    Editing(usize),
}

/// Wall selection state (at most one wall, by index)
#[derive(Debug, Default, Clone)]
pub struct SelectionState {
    selected: Option<usize>,
    /// Version counter for selection changes (for cache invalidation)
    pub version: u64,
}

impl SelectionState {
    /// Selected wall index
    pub fn primary(&self) -> Option<usize> {
        self.selected
    }

    pub fn mode(&self) -> EditMode {
        match self.selected {
            Some(index) => EditMode::Editing(index),
            None => EditMode::Idle,
        }
    }

    /// Check if a wall is selected
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected == Some(index)
    }

    /// Select a single wall (re-targets any previous selection)
    pub fn select(&mut self, index: usize) {
        if self.selected != Some(index) {
            self.selected = Some(index);
            self.version += 1;
        }
    }

    /// Clear selection
    pub fn clear(&mut self) {
        if self.selected.take().is_some() {
            self.version += 1;
        }
    }
}
