//! Headless test harness for programmatic plan manipulation.
//!
//! Wraps one signed-in [`EditorSession`] so tests and the agent protocol can
//! drive the store and controller without an auth service or a backend.

use shared::{FloorPlan, Wall};

use crate::render::{BoxInstance, ViewEvent};
use crate::session::Session;
use crate::state::{DeletePolicy, EditMode, EditorSession, EditorSettings, Material};

/// Headless test harness — one editor session for a fixed test user
pub struct TestHarness {
    pub editor: EditorSession,
}

impl TestHarness {
    /// Create a harness with an empty plan and default settings.
    pub fn new() -> Self {
        Self::with_settings(&EditorSettings::default())
    }

    pub fn with_settings(settings: &EditorSettings) -> Self {
        Self {
            editor: EditorSession::new(Session::new("tester", "tester@example.com"), settings),
        }
    }

    /// Harness whose controller uses `policy` on delete
    pub fn with_delete_policy(policy: DeletePolicy) -> Self {
        Self::with_settings(&EditorSettings {
            delete_policy: policy,
            ..Default::default()
        })
    }

    // ── Plan manipulation ─────────────────────────────────────

    /// Load a plan (replaces current, clears selection)
    pub fn load_plan(&mut self, walls: FloorPlan) {
        self.editor.replace_plan(walls);
    }

    /// Load a plan from its wire JSON
    pub fn load_plan_json(&mut self, json: &str) -> Result<(), String> {
        let walls: FloorPlan =
            serde_json::from_str(json).map_err(|e| format!("JSON parse error: {e}"))?;
        self.load_plan(walls);
        Ok(())
    }

    /// Export the current plan as JSON
    pub fn export_plan_json(&self) -> String {
        serde_json::to_string_pretty(self.editor.plan.walls()).unwrap_or_default()
    }

    /// Undo the last change
    pub fn undo(&mut self) -> bool {
        self.editor.plan.undo()
    }

    /// Redo the last undone change
    pub fn redo(&mut self) -> bool {
        self.editor.plan.redo()
    }

    // ── Interaction ───────────────────────────────────────────

    /// Click a wall
    pub fn click(&mut self, index: usize) {
        self.editor.apply_view_event(ViewEvent::Clicked { index: Some(index) });
    }

    /// Click empty space
    pub fn click_empty(&mut self) {
        self.editor.apply_view_event(ViewEvent::Clicked { index: None });
    }

    /// Drag wall `index` to `position`: one intermediate frame, then the end
    pub fn drag(&mut self, index: usize, position: [f64; 3]) -> bool {
        let from = self
            .wall(index)
            .map(|w| w.position)
            .unwrap_or(position);
        let mid = [
            (from[0] + position[0]) / 2.0,
            (from[1] + position[1]) / 2.0,
            (from[2] + position[2]) / 2.0,
        ];
        self.editor
            .apply_view_event(ViewEvent::DragFrame { index, position: mid });
        self.editor
            .apply_view_event(ViewEvent::DragEnd { index, position })
    }

    pub fn set_material(&mut self, material: Material) -> bool {
        self.editor.set_material(material)
    }

    pub fn delete_selected(&mut self) -> Option<Wall> {
        self.editor.delete_selected()
    }

    // ── Inspection ────────────────────────────────────────────

    /// Number of walls in the plan
    pub fn wall_count(&self) -> usize {
        self.editor.plan.len()
    }

    pub fn wall(&self, index: usize) -> Option<&Wall> {
        self.editor.plan.get(index)
    }

    pub fn walls(&self) -> &[Wall] {
        self.editor.plan.walls()
    }

    pub fn selected(&self) -> Option<usize> {
        self.editor.plan.selected()
    }

    pub fn mode(&self) -> EditMode {
        self.editor.plan.mode()
    }

    pub fn render_list(&self) -> Vec<BoxInstance> {
        self.editor.render_list()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_new_harness_empty() {
        let h = TestHarness::new();
        assert_eq!(h.wall_count(), 0);
        assert_eq!(h.mode(), EditMode::Idle);
    }

    #[test]
    fn test_drag_moves_selected_wall() {
        let mut h = TestHarness::new();
        h.load_plan(fixtures::row_of_walls(2));
        h.click(1);
        assert!(h.drag(1, [9.0, 1.0, 9.0]));
        assert_eq!(h.wall(1).unwrap().position, [9.0, 1.0, 9.0]);
        assert_eq!(h.selected(), Some(1));
    }

    #[test]
    fn test_drag_unselected_is_ignored() {
        let mut h = TestHarness::new();
        h.load_plan(fixtures::row_of_walls(2));
        h.click(0);
        assert!(!h.drag(1, [9.0, 1.0, 9.0]));
        assert_eq!(h.wall(1).unwrap().position, [2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_load_plan_json_errors() {
        let mut h = TestHarness::new();
        assert!(h.load_plan_json("not json").is_err());
        assert!(h.load_plan_json(r#"[{"position":[0,1,0]}]"#).is_ok());
        assert_eq!(h.wall_count(), 1);
    }
}
