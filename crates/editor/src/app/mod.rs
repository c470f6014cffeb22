//! Editor application driver
//!
//! Owns the session gate and the editor session. Remote calls run as tokio
//! tasks and report back through a channel; `poll` applies the results one at
//! a time on the caller's thread, so the store is only ever mutated there.

mod completion;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::persistence::{validate_save, ProjectBackend, ProjectsAdapter};
use crate::session::{validate_email, AuthService, GateEvent, SessionGate};
use crate::state::{EditorSession, EditorSettings, Notices};
use crate::sync::{SyncError, SyncGateway};
use completion::Completion;

pub struct EditorApp<A, P> {
    auth: Arc<A>,
    gate: SessionGate,
    gateway: SyncGateway,
    projects: ProjectsAdapter<P>,
    settings: EditorSettings,
    editor: Option<EditorSession>,
    /// Bumped on every admission and sign-out; stale task results are dropped
    epoch: u64,
    /// Messages for the signed-out screen
    pub gate_notices: Notices,
    /// Listing requests issued / newest listing applied
    listing_seq: u64,
    listing_applied: u64,
    in_flight: usize,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl<A: AuthService, P: ProjectBackend> EditorApp<A, P> {
    pub fn new(
        auth: Arc<A>,
        projects: Arc<P>,
        gateway: SyncGateway,
        settings: EditorSettings,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let gate = SessionGate::new(auth.subscribe());
        Self {
            auth,
            gate,
            gateway,
            projects: ProjectsAdapter::new(projects),
            settings,
            editor: None,
            epoch: 0,
            gate_notices: Notices::default(),
            listing_seq: 0,
            listing_applied: 0,
            in_flight: 0,
            tx,
            rx,
        }
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    pub fn editor(&self) -> Option<&EditorSession> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut EditorSession> {
        self.editor.as_mut()
    }

    pub fn gateway(&self) -> &SyncGateway {
        &self.gateway
    }

    /// Changes on every admission and sign-out
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Background tasks not yet applied by `poll`
    pub fn pending(&self) -> usize {
        self.in_flight
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let _ = tx.send(task.await);
        });
    }

    // ── Session ───────────────────────────────────────────────

    /// Ask the auth service for an existing session
    pub fn start(&mut self) {
        let auth = Arc::clone(&self.auth);
        self.spawn(async move { Completion::SessionRestored(auth.current_session().await) });
    }

    /// Send a magic link. The session itself arrives as a session change.
    pub fn sign_in(&mut self, address: &str) -> bool {
        if let Err(e) = validate_email(address) {
            self.gate_notices.warning(e.to_string());
            return false;
        }
        let auth = Arc::clone(&self.auth);
        let address = address.trim().to_string();
        self.spawn(async move {
            let result = auth.sign_in_with_email_link(&address).await;
            Completion::SignIn { address, result }
        });
        true
    }

    /// Complete sign-in with the code from the link email
    pub fn confirm_sign_in(&mut self, address: &str, code: &str) {
        let auth = Arc::clone(&self.auth);
        let (address, code) = (address.trim().to_string(), code.trim().to_string());
        self.spawn(async move { Completion::Confirmed(auth.confirm_sign_in(&address, &code).await) });
    }

    pub fn sign_out(&mut self) {
        let auth = Arc::clone(&self.auth);
        self.spawn(async move { Completion::SignedOut(auth.sign_out().await) });
    }

    fn on_gate_event(&mut self, event: GateEvent) {
        match event {
            GateEvent::Admitted(session) => {
                tracing::info!("Admitted {}", session.email);
                self.epoch += 1;
                self.editor = Some(EditorSession::new(session, &self.settings));
                self.refresh_projects();
            }
            GateEvent::SignedOut => {
                tracing::info!("Signed out; discarding editor state");
                self.epoch += 1;
                self.editor = None;
            }
            GateEvent::Unchanged => {}
        }
    }

    // ── Remote sync ───────────────────────────────────────────

    /// Submit an image for inference. Returns `false` if rejected locally.
    pub fn upload_image(&mut self, image: Vec<u8>, file_name: &str) -> bool {
        let Some(editor) = self.editor.as_mut() else {
            self.gate_notices.warning("Sign in to upload a floor plan");
            return false;
        };
        if image.is_empty() {
            editor.notices.warning(SyncError::EmptyImage.to_string());
            return false;
        }

        let seq = editor.begin_request();
        editor.busy.uploads += 1;
        let gateway = self.gateway.clone();
        let epoch = self.epoch;
        let file_name = file_name.to_string();
        self.spawn(async move {
            let result = gateway.infer_from_image(image, &file_name).await;
            Completion::Inferred { epoch, seq, result }
        });
        true
    }

    /// Submit a natural-language edit of the current plan
    pub fn submit_prompt(&mut self, prompt: &str) -> bool {
        let Some(editor) = self.editor.as_mut() else {
            self.gate_notices.warning("Sign in to use the assistant");
            return false;
        };
        let prompt = prompt.trim();
        if prompt.is_empty() {
            editor.notices.warning(SyncError::EmptyPrompt.to_string());
            return false;
        }

        let seq = editor.begin_request();
        editor.busy.instructions += 1;
        let current = editor.plan.snapshot();
        let gateway = self.gateway.clone();
        let epoch = self.epoch;
        let prompt = prompt.to_string();
        self.spawn(async move {
            let result = gateway.apply_instruction(&prompt, &current).await;
            Completion::Instructed { epoch, seq, result }
        });
        true
    }

    // ── Projects ──────────────────────────────────────────────

    pub fn refresh_projects(&mut self) {
        let Some(editor) = self.editor.as_ref() else {
            return;
        };
        let owner = editor.owner().to_string();
        let projects = self.projects.clone();
        let epoch = self.epoch;
        self.listing_seq += 1;
        let seq = self.listing_seq;
        self.spawn(async move {
            let listing = projects.list_projects(&owner).await;
            Completion::Listed {
                epoch,
                seq,
                listing,
            }
        });
    }

    /// Save the current plan as `name`. Returns `false` if rejected locally.
    pub fn save_project(&mut self, name: &str) -> bool {
        let Some(editor) = self.editor.as_mut() else {
            self.gate_notices.warning("Sign in to save projects");
            return false;
        };
        let name = match validate_save(name, editor.plan.walls()) {
            Ok(name) => name.to_string(),
            Err(e) => {
                editor.notices.warning(e.to_string());
                return false;
            }
        };

        editor.busy.saves += 1;
        let owner = editor.owner().to_string();
        let plan = editor.plan.snapshot();
        let projects = self.projects.clone();
        let epoch = self.epoch;
        self.spawn(async move {
            let result = projects.save_project(&owner, &name, plan).await;
            Completion::Saved { epoch, result }
        });
        true
    }

    /// Load a listed project into the store
    pub fn load_project(&mut self, id: &str) -> bool {
        let Some(editor) = self.editor.as_mut() else {
            return false;
        };
        let Some(project) = editor.projects.iter().find(|p| p.id == id).cloned() else {
            editor.notices.warning(format!("Unknown project {id}"));
            return false;
        };
        editor.load_project(&project);
        editor.notices.info(format!("Loaded '{}'", project.name));
        true
    }

    // ── Completion handling ───────────────────────────────────

    /// Apply finished background work and session changes. Never blocks.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        let event = self.gate.observe();
        self.on_gate_event(event);

        while let Ok(completion) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.apply(completion);
            applied += 1;
        }

        let event = self.gate.observe();
        self.on_gate_event(event);
        applied
    }

    /// Poll until no background work is outstanding, or `timeout` elapses
    pub async fn run_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            self.poll();
            if self.in_flight == 0 {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn apply(&mut self, completion: Completion) {
        if let Some(epoch) = completion.epoch() {
            if epoch != self.epoch {
                tracing::debug!("Dropping result from a previous session");
                return;
            }
        }

        match completion {
            Completion::SessionRestored(Ok(Some(session))) => {
                if !self.gate.is_admitted() {
                    let event = self.gate.transition(Some(session));
                    self.on_gate_event(event);
                }
            }
            Completion::SessionRestored(Ok(None)) => {}
            Completion::SessionRestored(Err(e)) => {
                tracing::error!("Session restore failed: {}", e);
                self.gate_notices.error(format!("Could not restore session: {e}"));
            }

            Completion::SignIn { address, result } => match result {
                Ok(()) => {
                    self.gate_notices
                        .info(format!("Check your email ({address}) for the magic link!"));
                }
                Err(e) => {
                    tracing::error!("Sign-in failed: {}", e);
                    self.gate_notices.error(e.to_string());
                }
            },
            Completion::Confirmed(result) => {
                if let Err(e) = result {
                    tracing::error!("Sign-in confirmation failed: {}", e);
                    self.gate_notices.error(e.to_string());
                }
            }
            Completion::SignedOut(result) => {
                if let Err(e) = result {
                    tracing::warn!("Sign-out reported: {}", e);
                    self.gate_notices.warning(e.to_string());
                }
            }

            Completion::Inferred { seq, result, .. } => {
                let Some(editor) = self.editor.as_mut() else {
                    return;
                };
                editor.busy.uploads = editor.busy.uploads.saturating_sub(1);
                match result {
                    Ok(walls) => {
                        let count = walls.len();
                        if editor.apply_replacement(seq, walls) {
                            editor.notices.info(format!("Generated {count} walls"));
                        }
                    }
                    Err(e) if e.is_empty_result() => {
                        editor.notices.warning(e.to_string());
                    }
                    Err(e) => {
                        tracing::error!("Upload failed: {}", e);
                        editor.notices.error(e.to_string());
                    }
                }
            }

            Completion::Instructed { seq, result, .. } => {
                let Some(editor) = self.editor.as_mut() else {
                    return;
                };
                editor.busy.instructions = editor.busy.instructions.saturating_sub(1);
                match result {
                    Ok(Some(walls)) => {
                        editor.apply_replacement(seq, walls);
                    }
                    Ok(None) => {
                        editor.notices.warning("The assistant returned no changes");
                    }
                    Err(e) => {
                        tracing::error!("Instruction failed: {}", e);
                        editor.notices.error(e.to_string());
                    }
                }
            }

            Completion::Listed { seq, listing, .. } => {
                if seq < self.listing_applied {
                    tracing::debug!(
                        "Dropping listing #{} (newer #{} already applied)",
                        seq,
                        self.listing_applied
                    );
                    return;
                }
                let Some(editor) = self.editor.as_mut() else {
                    return;
                };
                self.listing_applied = seq;
                editor.projects = listing.projects;
                if let Some(e) = listing.error {
                    editor.notices.error(format!("Could not load projects: {e}"));
                }
            }

            Completion::Saved { result, .. } => {
                let Some(editor) = self.editor.as_mut() else {
                    return;
                };
                editor.busy.saves = editor.busy.saves.saturating_sub(1);
                match result {
                    Ok(project) => {
                        editor.notices.info(format!("Saved '{}'", project.name));
                        self.refresh_projects();
                    }
                    Err(e) => {
                        editor.notices.error(format!("Save failed: {e}"));
                    }
                }
            }
        }
    }
}
