//! JSON command protocol for agents and scripted sessions.
//!
//! Local commands act on the editor session synchronously. Remote commands
//! start background work on an [`EditorApp`]; their outcome shows up later
//! as plan changes and notices.

use serde::{Deserialize, Serialize};
use shared::FloorPlan;

use crate::app::EditorApp;
use crate::harness::TestHarness;
use crate::persistence::ProjectBackend;
use crate::render::ViewEvent;
use crate::session::AuthService;
use crate::state::{EditMode, EditorSession, Material};

/// A command that edits the plan or inspects the editor.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AgentCommand {
    /// Select the wall at `index` (as if clicked).
    Select { index: usize },
    /// Click empty space: return to idle.
    ClickEmpty,
    /// Finish a drag of wall `index` at `position`.
    DragEnd { index: usize, position: [f64; 3] },
    /// Apply a material to the selected wall.
    SetMaterial { material: Material },
    /// Delete the selected wall.
    DeleteSelected,
    /// Undo the last operation.
    Undo,
    /// Redo the last undone operation.
    Redo,
    /// Replace the whole plan.
    LoadPlan { walls: FloorPlan },
    /// Inspect the editor: walls, selection, busy flags, projects.
    Inspect,
    /// Export the plan as JSON.
    ExportPlan,
    /// Dismiss one notice, or all of them.
    DismissNotices {
        #[serde(default)]
        id: Option<u64>,
    },
}

/// A command that talks to the auth service, the backend or project storage.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum RemoteCommand {
    SignIn { email: String },
    ConfirmSignIn { email: String, code: String },
    SignOut,
    /// Send the image at `path` for wall inference.
    Upload { path: String },
    /// Natural-language edit of the current plan.
    Prompt { text: String },
    Save { name: String },
    ListProjects,
    LoadProject { id: String },
}

/// Either kind of command, as read from one input line
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    Local(AgentCommand),
    Remote(RemoteCommand),
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

/// Execute a single local command on an editor session.
pub fn execute_command(editor: &mut EditorSession, cmd: AgentCommand) -> CommandResponse {
    match cmd {
        AgentCommand::Select { index } => {
            if editor.plan.get(index).is_none() {
                return CommandResponse::err(format!("No wall at index {index}"));
            }
            editor.apply_view_event(ViewEvent::Clicked { index: Some(index) });
            CommandResponse::ok_with_data(serde_json::json!({ "selected": index }))
        }

        AgentCommand::ClickEmpty => {
            editor.apply_view_event(ViewEvent::Clicked { index: None });
            CommandResponse::ok()
        }

        AgentCommand::DragEnd { index, position } => {
            let moved = editor.apply_view_event(ViewEvent::DragEnd { index, position });
            CommandResponse::ok_with_data(serde_json::json!({ "moved": moved }))
        }

        AgentCommand::SetMaterial { material } => {
            if editor.plan.selected().is_none() {
                return CommandResponse::err("No wall selected");
            }
            let changed = editor.set_material(material);
            CommandResponse::ok_with_data(serde_json::json!({ "changed": changed }))
        }

        AgentCommand::DeleteSelected => match editor.delete_selected() {
            Some(_) => CommandResponse::ok_with_data(serde_json::json!({
                "wall_count": editor.plan.len(),
                "selected": editor.plan.selected(),
            })),
            None => CommandResponse::err("No wall selected"),
        },

        AgentCommand::Undo => {
            let success = editor.plan.undo();
            CommandResponse::ok_with_data(serde_json::json!({ "undone": success }))
        }

        AgentCommand::Redo => {
            let success = editor.plan.redo();
            CommandResponse::ok_with_data(serde_json::json!({ "redone": success }))
        }

        AgentCommand::LoadPlan { walls } => {
            editor.replace_plan(walls);
            CommandResponse::ok_with_data(serde_json::json!({ "wall_count": editor.plan.len() }))
        }

        AgentCommand::Inspect => CommandResponse::ok_with_data(inspect(editor)),

        AgentCommand::ExportPlan => {
            let json = serde_json::to_string_pretty(editor.plan.walls()).unwrap_or_default();
            CommandResponse::ok_with_data(serde_json::json!({ "plan_json": json }))
        }

        AgentCommand::DismissNotices { id: Some(id) } => {
            let dismissed = editor.notices.dismiss(id);
            CommandResponse::ok_with_data(serde_json::json!({ "dismissed": dismissed }))
        }

        AgentCommand::DismissNotices { id: None } => {
            editor.notices.clear();
            CommandResponse::ok()
        }
    }
}

fn inspect(editor: &EditorSession) -> serde_json::Value {
    let walls: Vec<serde_json::Value> = editor
        .render_list()
        .iter()
        .zip(editor.plan.walls())
        .map(|(instance, wall)| {
            serde_json::json!({
                "index": instance.index,
                "id": wall.id,
                "position": wall.position,
                "size": wall.size,
                "rotation": wall.rotation,
                "texture": wall.appearance.texture(),
                "color": instance.display_color(),
                "highlighted": instance.highlighted,
            })
        })
        .collect();
    let projects: Vec<serde_json::Value> = editor
        .projects
        .iter()
        .map(|p| {
            serde_json::json!({
                "id": p.id,
                "name": p.name,
                "created_at": p.created_at,
                "wall_count": p.walls.len(),
            })
        })
        .collect();
    let mode = match editor.plan.mode() {
        EditMode::Idle => "idle",
        EditMode::Editing(_) => "editing",
    };

    serde_json::json!({
        "user": editor.session.email,
        "wall_count": walls.len(),
        "walls": walls,
        "mode": mode,
        "selected": editor.plan.selected(),
        "can_undo": editor.plan.can_undo(),
        "can_redo": editor.plan.can_redo(),
        "processing_image": editor.busy.processing_image(),
        "ai_thinking": editor.busy.ai_thinking(),
        "saving": editor.busy.saving(),
        "projects": projects,
    })
}

/// Start a remote command. `queued` is `false` when it was rejected locally.
pub fn execute_remote<A: AuthService, P: ProjectBackend>(
    app: &mut EditorApp<A, P>,
    cmd: RemoteCommand,
) -> CommandResponse {
    let queued = match cmd {
        RemoteCommand::SignIn { email } => app.sign_in(&email),
        RemoteCommand::ConfirmSignIn { email, code } => {
            app.confirm_sign_in(&email, &code);
            true
        }
        RemoteCommand::SignOut => {
            app.sign_out();
            true
        }
        RemoteCommand::Upload { path } => {
            let image = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => return CommandResponse::err(format!("Failed to read {path}: {e}")),
            };
            let file_name = std::path::Path::new(&path)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("floorplan.png")
                .to_string();
            app.upload_image(image, &file_name)
        }
        RemoteCommand::Prompt { text } => app.submit_prompt(&text),
        RemoteCommand::Save { name } => app.save_project(&name),
        RemoteCommand::ListProjects => {
            if app.editor().is_none() {
                return CommandResponse::err("Not signed in");
            }
            app.refresh_projects();
            true
        }
        RemoteCommand::LoadProject { id } => {
            if !app.load_project(&id) {
                return CommandResponse::err(format!("Cannot load project {id}"));
            }
            return CommandResponse::ok_with_data(serde_json::json!({ "loaded": id }));
        }
    };
    CommandResponse::ok_with_data(serde_json::json!({ "queued": queued }))
}

/// Execute one input line against the application.
pub fn execute_line<A: AuthService, P: ProjectBackend>(
    app: &mut EditorApp<A, P>,
    line: &str,
) -> CommandResponse {
    let cmd: Command = match serde_json::from_str(line) {
        Ok(cmd) => cmd,
        Err(e) => return CommandResponse::err(format!("Invalid command JSON: {e}")),
    };
    match cmd {
        Command::Local(cmd) => match app.editor_mut() {
            Some(editor) => execute_command(editor, cmd),
            None => CommandResponse::err("Not signed in"),
        },
        Command::Remote(cmd) => execute_remote(app, cmd),
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json(harness: &mut TestHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: AgentCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(&mut harness.editor, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    harness: &mut TestHarness,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<AgentCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(&mut harness.editor, cmd))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::state::{EditorSettings, SyncPolicy};

    #[test]
    fn test_command_serde_undo() {
        let json = r#"{"command": "undo"}"#;
        let cmd: AgentCommand = serde_json::from_str(json).unwrap();
        assert!(matches!(cmd, AgentCommand::Undo));
    }

    #[test]
    fn test_command_serde_set_material() {
        let json = r#"{"command": "set_material", "material": "brick"}"#;
        let cmd: AgentCommand = serde_json::from_str(json).unwrap();
        match cmd {
            AgentCommand::SetMaterial { material } => assert_eq!(material, Material::Brick),
            _ => panic!("Expected SetMaterial"),
        }
    }

    #[test]
    fn test_command_untagged_dispatch() {
        let local: Command = serde_json::from_str(r#"{"command": "inspect"}"#).unwrap();
        assert!(matches!(local, Command::Local(AgentCommand::Inspect)));

        let remote: Command =
            serde_json::from_str(r#"{"command": "prompt", "text": "add a door"}"#).unwrap();
        match remote {
            Command::Remote(RemoteCommand::Prompt { text }) => assert_eq!(text, "add a door"),
            _ => panic!("Expected Prompt"),
        }
    }

    #[test]
    fn test_execute_select_out_of_range() {
        let mut h = TestHarness::new();
        h.load_plan(fixtures::row_of_walls(2));
        let resp = execute_json(&mut h, r#"{"command": "select", "index": 5}"#).unwrap();
        assert!(!resp.success);
        assert_eq!(h.selected(), None);
    }

    #[test]
    fn test_select_clears_drag_preview() {
        let mut h = TestHarness::new();
        h.load_plan(fixtures::row_of_walls(2));
        h.click(0);
        h.editor.apply_view_event(ViewEvent::DragFrame {
            index: 0,
            position: [3.0, 1.0, 3.0],
        });
        assert!(h.editor.controller.drag_preview().is_some());

        execute_json(&mut h, r#"{"command": "select", "index": 1}"#).unwrap();
        assert!(h.editor.controller.drag_preview().is_none());
        assert_eq!(h.selected(), Some(1));

        h.editor.apply_view_event(ViewEvent::DragFrame {
            index: 1,
            position: [3.0, 1.0, 3.0],
        });
        execute_json(&mut h, r#"{"command": "click_empty"}"#).unwrap();
        assert!(h.editor.controller.drag_preview().is_none());
        assert_eq!(h.mode(), EditMode::Idle);
    }

    #[test]
    fn test_load_plan_supersedes_pending_upload() {
        let mut h = TestHarness::with_settings(&EditorSettings {
            sync_policy: SyncPolicy::LatestSubmitted,
            ..Default::default()
        });
        let upload = h.editor.begin_request();

        let resp = execute_json(
            &mut h,
            r#"{"command": "load_plan", "walls": [{"position": [4, 1, 4]}]}"#,
        )
        .unwrap();
        assert!(resp.success);

        assert!(!h.editor.apply_replacement(upload, fixtures::row_of_walls(3)));
        assert_eq!(h.wall_count(), 1);
        assert_eq!(h.wall(0).unwrap().position, [4.0, 1.0, 4.0]);
    }

    #[test]
    fn test_execute_inspect() {
        let mut h = TestHarness::new();
        h.load_plan(fixtures::sample_plan());
        h.click(2);

        let resp = execute_json(&mut h, r#"{"command": "inspect"}"#).unwrap();
        assert!(resp.success);
        let data = resp.data.unwrap();
        assert_eq!(data["wall_count"], 3);
        assert_eq!(data["mode"], "editing");
        assert_eq!(data["walls"][2]["texture"], "brick");
        assert_eq!(data["walls"][2]["color"], "orange");
        assert_eq!(data["walls"][1]["color"], "white");
    }

    #[test]
    fn test_execute_undo_redo() {
        let mut h = TestHarness::new();
        h.load_plan(fixtures::row_of_walls(2));

        let resp = execute_json(&mut h, r#"{"command": "undo"}"#).unwrap();
        assert_eq!(resp.data.unwrap()["undone"], true);
        assert_eq!(h.wall_count(), 0);

        let resp = execute_json(&mut h, r#"{"command": "redo"}"#).unwrap();
        assert_eq!(resp.data.unwrap()["redone"], true);
        assert_eq!(h.wall_count(), 2);
    }

    #[test]
    fn test_execute_set_material_without_selection() {
        let mut h = TestHarness::new();
        h.load_plan(fixtures::row_of_walls(1));
        let resp =
            execute_json(&mut h, r#"{"command": "set_material", "material": "wood"}"#).unwrap();
        assert!(!resp.success);
        assert!(!h.wall(0).unwrap().appearance.is_textured());
    }

    #[test]
    fn test_execute_export_plan() {
        let mut h = TestHarness::new();
        h.load_plan(fixtures::row_of_walls(1));

        let resp = execute_json(&mut h, r#"{"command": "export_plan"}"#).unwrap();
        let data = resp.data.unwrap();
        let plan_json = data["plan_json"].as_str().unwrap();
        assert!(plan_json.contains("position"));
    }

    #[test]
    fn test_execute_invalid_json() {
        let mut h = TestHarness::new();
        let result = execute_json(&mut h, "not valid json");
        assert!(result.is_err());
    }
}
