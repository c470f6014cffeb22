//! Project persistence: save, list and load named floor plans per user.

mod cloud;
mod memory;

use std::future::Future;
use std::sync::Arc;

use shared::{FloorPlan, NewProject, Project};
use thiserror::Error;

pub use cloud::CloudProjects;
pub use memory::MemoryProjects;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Nothing to save: the floor plan is empty")]
    EmptyPlan,

    #[error("Please enter a project name")]
    EmptyName,

    #[error("{0}")]
    Storage(String),

    #[error("Storage unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

impl PersistError {
    /// Rejected locally before any storage call
    pub fn is_user_input(&self) -> bool {
        matches!(self, PersistError::EmptyPlan | PersistError::EmptyName)
    }
}

/// Table-like project store keyed by owner
pub trait ProjectBackend: Send + Sync + 'static {
    /// All projects of `owner`, newest first
    fn select_by_owner(
        &self,
        owner: &str,
    ) -> impl Future<Output = Result<Vec<Project>, PersistError>> + Send;

    fn insert(&self, project: NewProject) -> impl Future<Output = Result<Project, PersistError>> + Send;
}

/// Result of listing: failures degrade to an empty list plus the error
#[derive(Debug, Default)]
pub struct ProjectListing {
    pub projects: Vec<Project>,
    pub error: Option<PersistError>,
}

/// Checks performed before anything is sent to storage
pub fn validate_save<'a>(name: &'a str, plan: &[shared::Wall]) -> Result<&'a str, PersistError> {
    if plan.is_empty() {
        return Err(PersistError::EmptyPlan);
    }
    let name = name.trim();
    if name.is_empty() {
        return Err(PersistError::EmptyName);
    }
    Ok(name)
}

pub struct ProjectsAdapter<B> {
    backend: Arc<B>,
}

impl<B> Clone for ProjectsAdapter<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: ProjectBackend> ProjectsAdapter<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Projects of `owner`, most recent first. Never fails.
    pub async fn list_projects(&self, owner: &str) -> ProjectListing {
        match self.backend.select_by_owner(owner).await {
            Ok(mut projects) => {
                // Stable: equal timestamps keep the backend's order
                projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                tracing::info!("Listed {} project(s)", projects.len());
                ProjectListing {
                    projects,
                    error: None,
                }
            }
            Err(e) => {
                tracing::error!("Failed to list projects: {}", e);
                ProjectListing {
                    projects: Vec::new(),
                    error: Some(e),
                }
            }
        }
    }

    /// Save `plan` as a new project named `name`
    pub async fn save_project(
        &self,
        owner: &str,
        name: &str,
        plan: FloorPlan,
    ) -> Result<Project, PersistError> {
        let name = validate_save(name, &plan)?;
        let project = self
            .backend
            .insert(NewProject {
                owner: owner.to_string(),
                name: name.to_string(),
                walls: plan,
            })
            .await
            .inspect_err(|e| tracing::error!("Failed to save project: {}", e))?;
        tracing::info!("Saved project '{}' ({})", project.name, project.id);
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Wall;

    fn adapter() -> ProjectsAdapter<MemoryProjects> {
        ProjectsAdapter::new(Arc::new(MemoryProjects::new()))
    }

    #[tokio::test]
    async fn test_empty_plan_never_reaches_storage() {
        let a = adapter();
        let err = a.save_project("u1", "Flat", vec![]).await.unwrap_err();
        assert!(matches!(err, PersistError::EmptyPlan));
        assert_eq!(a.backend().insert_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let a = adapter();
        let err = a
            .save_project("u1", "   ", vec![Wall::at([0.0; 3])])
            .await
            .unwrap_err();
        assert!(matches!(err, PersistError::EmptyName));
        assert_eq!(a.backend().insert_count(), 0);
    }

    #[tokio::test]
    async fn test_saved_project_listed_first() {
        let a = adapter();
        a.save_project("u1", "First", vec![Wall::at([0.0; 3])]).await.unwrap();
        a.save_project("u2", "Other user", vec![Wall::at([0.0; 3])]).await.unwrap();
        let saved = a
            .save_project("u1", " Second ", vec![Wall::at([1.0; 3])])
            .await
            .unwrap();
        assert_eq!(saved.name, "Second");

        let listing = a.list_projects("u1").await;
        assert!(listing.error.is_none());
        let names: Vec<_> = listing.projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Second", "First"]);
    }

    #[tokio::test]
    async fn test_list_failure_degrades_to_empty() {
        let a = adapter();
        a.save_project("u1", "Flat", vec![Wall::at([0.0; 3])]).await.unwrap();
        a.backend().fail_with(Some("relation \"projects\" does not exist"));
        let listing = a.list_projects("u1").await;
        assert!(listing.projects.is_empty());
        assert!(matches!(listing.error, Some(PersistError::Storage(_))));
    }

    #[tokio::test]
    async fn test_save_failure_surfaces_message() {
        let a = adapter();
        a.backend().fail_with(Some("permission denied"));
        let err = a
            .save_project("u1", "Flat", vec![Wall::at([0.0; 3])])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "permission denied");
    }
}
