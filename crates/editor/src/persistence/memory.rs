//! In-process project table for offline use and tests

use std::sync::Mutex;

use chrono::{Duration, Utc};
use shared::{NewProject, Project};

use super::{PersistError, ProjectBackend};

#[derive(Default)]
struct Table {
    rows: Vec<Project>,
    inserts: usize,
    failure: Option<String>,
}

#[derive(Default)]
pub struct MemoryProjects {
    table: Mutex<Table>,
}

impl MemoryProjects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail with `message` (`None` to recover)
    pub fn fail_with(&self, message: Option<&str>) {
        self.lock().failure = message.map(str::to_string);
    }

    /// Number of successful inserts so far
    pub fn insert_count(&self) -> usize {
        self.lock().inserts
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ProjectBackend for MemoryProjects {
    async fn select_by_owner(&self, owner: &str) -> Result<Vec<Project>, PersistError> {
        let table = self.lock();
        if let Some(message) = &table.failure {
            return Err(PersistError::Storage(message.clone()));
        }
        let mut projects: Vec<Project> = table
            .rows
            .iter()
            .filter(|p| p.owner == owner)
            .cloned()
            .collect();
        projects.reverse();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn insert(&self, project: NewProject) -> Result<Project, PersistError> {
        let mut table = self.lock();
        if let Some(message) = &table.failure {
            return Err(PersistError::Storage(message.clone()));
        }

        // Keep created_at strictly increasing so ordering is total
        let mut created_at = Utc::now();
        if let Some(last) = table.rows.last() {
            if created_at <= last.created_at {
                created_at = last.created_at + Duration::microseconds(1);
            }
        }

        let row = Project {
            id: uuid::Uuid::new_v4().to_string(),
            owner: project.owner,
            name: project.name,
            walls: project.walls,
            created_at,
        };
        table.rows.push(row.clone());
        table.inserts += 1;
        Ok(row)
    }
}
