pub mod controller;
pub mod notices;
pub mod plan;
pub mod selection;
pub mod settings;

use shared::{FloorPlan, Project, Wall};

pub use controller::{DeletePolicy, ManipulationController, Material};
pub use notices::{Notice, NoticeLevel, Notices};
pub use plan::FloorPlanStore;
pub use selection::{EditMode, SelectionState};
pub use settings::{AppSettings, EditorSettings, SyncPolicy};

use crate::render::{self, BoxInstance, ViewEvent};
use crate::session::Session;

/// Outstanding remote operations, per kind
#[derive(Debug, Default, Clone)]
pub struct BusyState {
    pub(crate) uploads: usize,
    pub(crate) instructions: usize,
    pub(crate) saves: usize,
}

impl BusyState {
    /// An image is being analysed
    pub fn processing_image(&self) -> bool {
        self.uploads > 0
    }

    /// An instruction is being applied
    pub fn ai_thinking(&self) -> bool {
        self.instructions > 0
    }

    pub fn saving(&self) -> bool {
        self.saves > 0
    }
}

/// Editor state for one signed-in user.
///
/// Created when the session gate admits a user and dropped on sign-out;
/// nothing here outlives the session.
pub struct EditorSession {
    pub session: Session,
    pub plan: FloorPlanStore,
    pub controller: ManipulationController,
    pub notices: Notices,
    pub busy: BusyState,
    /// Saved projects, most recent first
    pub projects: Vec<Project>,
    sync_policy: SyncPolicy,
    next_seq: u64,
    last_applied_seq: u64,
}

impl EditorSession {
    pub fn new(session: Session, settings: &EditorSettings) -> Self {
        Self {
            session,
            plan: FloorPlanStore::default(),
            controller: ManipulationController::new(
                settings.delete_policy,
                settings.default_color.clone(),
            ),
            notices: Notices::default(),
            busy: BusyState::default(),
            projects: Vec::new(),
            sync_policy: settings.sync_policy,
            next_seq: 0,
            last_applied_seq: 0,
        }
    }

    /// Owner id used for project storage
    pub fn owner(&self) -> &str {
        &self.session.user_id
    }

    pub fn sync_policy(&self) -> SyncPolicy {
        self.sync_policy
    }

    // ── Interaction ───────────────────────────────────────────

    pub fn apply_view_event(&mut self, event: ViewEvent) -> bool {
        self.controller.handle(&mut self.plan, event)
    }

    pub fn set_material(&mut self, material: Material) -> bool {
        self.controller.set_material(&mut self.plan, material)
    }

    pub fn delete_selected(&mut self) -> Option<Wall> {
        self.controller.delete_selected(&mut self.plan)
    }

    pub fn render_list(&self) -> Vec<BoxInstance> {
        render::render_list(&self.plan, &self.controller)
    }

    // ── Whole-plan replacement ────────────────────────────────

    /// Sequence number for a new request that may end in a replacement
    pub fn begin_request(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Replace the plan with a remote result tagged `seq`.
    ///
    /// Under [`SyncPolicy::LatestSubmitted`] a result older than the latest
    /// applied replacement is discarded and `false` is returned.
    pub fn apply_replacement(&mut self, seq: u64, walls: FloorPlan) -> bool {
        if self.sync_policy == SyncPolicy::LatestSubmitted && seq < self.last_applied_seq {
            tracing::warn!(
                "Discarding stale response #{} (latest applied #{})",
                seq,
                self.last_applied_seq
            );
            return false;
        }
        self.last_applied_seq = self.last_applied_seq.max(seq);
        self.plan.replace_all(walls);
        true
    }

    /// Replace the plan locally; supersedes any replacement still in flight
    pub fn replace_plan(&mut self, walls: FloorPlan) {
        let seq = self.begin_request();
        self.apply_replacement(seq, walls);
    }

    /// Load a saved project into the store
    pub fn load_project(&mut self, project: &Project) {
        self.replace_plan(project.walls.clone());
        tracing::info!("Loaded project '{}' ({} walls)", project.name, project.walls.len());
    }
}
