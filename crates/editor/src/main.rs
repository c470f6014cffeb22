use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use floorplan_editor_lib::app::EditorApp;
use floorplan_editor_lib::command::{execute_line, CommandResponse};
use floorplan_editor_lib::persistence::{CloudProjects, MemoryProjects, ProjectBackend};
use floorplan_editor_lib::session::{AuthService, CloudAuth, MemoryAuth};
use floorplan_editor_lib::state::{AppSettings, Notice};
use floorplan_editor_lib::sync::SyncGateway;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries the JSON responses
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "floorplan_editor=info,floorplan_editor_lib=info".into()),
        )
        .init();

    let settings = AppSettings::load();
    let host = std::env::var("FLOORPLAN_HOST").unwrap_or_default();
    let gateway = SyncGateway::new(settings.backend.resolve(&host));
    tracing::info!("Backend: {}", gateway.base_url());

    if settings.cloud.is_configured() {
        let auth = Arc::new(CloudAuth::new(&settings.cloud.url, &settings.cloud.anon_key));
        let projects = Arc::new(CloudProjects::new(
            &settings.cloud.url,
            &settings.cloud.anon_key,
            auth.subscribe(),
        ));
        run(EditorApp::new(auth, projects, gateway, settings.editor)).await;
    } else {
        tracing::info!("No cloud service configured, using in-memory auth and storage");
        let auth = Arc::new(MemoryAuth::new());
        let projects = Arc::new(MemoryProjects::new());
        run(EditorApp::new(auth, projects, gateway, settings.editor)).await;
    }
}

/// Read commands from stdin until EOF, applying background results in between
async fn run<A: AuthService, P: ProjectBackend>(mut app: EditorApp<A, P>) {
    app.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    let mut reporter = NoticeReporter::default();

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => emit(&execute_line(&mut app, &line)),
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Failed to read stdin: {e}");
                    break;
                }
            },
            _ = ticker.tick() => {
                app.poll();
            }
        }
        reporter.report(&app);
    }

    if !app.run_until_idle(SHUTDOWN_GRACE).await {
        tracing::warn!("Exiting with {} unfinished request(s)", app.pending());
    }
    reporter.report(&app);
}

fn emit(response: &CommandResponse) {
    match serde_json::to_string(response) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!("Failed to encode response: {e}"),
    }
}

/// Prints each notice once, as `{"notice": {...}}`
#[derive(Default)]
struct NoticeReporter {
    gate_seen: u64,
    editor_seen: u64,
    epoch: u64,
}

impl NoticeReporter {
    fn report<A: AuthService, P: ProjectBackend>(&mut self, app: &EditorApp<A, P>) {
        for notice in app.gate_notices.since(self.gate_seen) {
            print_notice(notice);
            self.gate_seen = notice.id;
        }

        // A new editor session numbers its notices from scratch
        if app.epoch() != self.epoch {
            self.epoch = app.epoch();
            self.editor_seen = 0;
        }
        if let Some(editor) = app.editor() {
            for notice in editor.notices.since(self.editor_seen) {
                print_notice(notice);
                self.editor_seen = notice.id;
            }
        }
    }
}

fn print_notice(notice: &Notice) {
    println!("{}", serde_json::json!({ "notice": notice }));
}
