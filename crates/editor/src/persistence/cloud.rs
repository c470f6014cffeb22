//! Hosted project table (PostgREST-style REST API).

use serde::Deserialize;
use shared::{NewProject, Project};
use tokio::sync::watch;

use super::{PersistError, ProjectBackend};
use crate::session::Session;

const TABLE: &str = "projects";

pub struct CloudProjects {
    client: reqwest::Client,
    url: String,
    anon_key: String,
    /// Current session, for the bearer token
    session: watch::Receiver<Option<Session>>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl CloudProjects {
    pub fn new(
        url: impl Into<String>,
        anon_key: impl Into<String>,
        session: watch::Receiver<Option<Session>>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            session,
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url, TABLE)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self
            .session
            .borrow()
            .as_ref()
            .and_then(|s| s.access_token.clone())
            .unwrap_or_else(|| self.anon_key.clone());
        request.header("apikey", &self.anon_key).bearer_auth(token)
    }
}

async fn storage_error(response: reqwest::Response) -> PersistError {
    let status = response.status();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| format!("Storage request failed ({status})"));
    tracing::error!("Storage error {}: {}", status, message);
    PersistError::Storage(message)
}

impl ProjectBackend for CloudProjects {
    async fn select_by_owner(&self, owner: &str) -> Result<Vec<Project>, PersistError> {
        let owner_filter = format!("eq.{owner}");
        let request = self.client.get(self.table_url()).query(&[
            ("select", "*"),
            ("owner", owner_filter.as_str()),
            ("order", "created_at.desc"),
        ]);
        let response = self.authorized(request).send().await?;
        if !response.status().is_success() {
            return Err(storage_error(response).await);
        }
        Ok(response.json().await?)
    }

    async fn insert(&self, project: NewProject) -> Result<Project, PersistError> {
        let request = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=representation")
            .json(&project);
        let response = self.authorized(request).send().await?;
        if !response.status().is_success() {
            return Err(storage_error(response).await);
        }

        let mut rows: Vec<Project> = response.json().await?;
        rows.pop()
            .ok_or_else(|| PersistError::Storage("Insert returned no row".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url() {
        let (_tx, rx) = watch::channel(None);
        let p = CloudProjects::new("https://x.supabase.co/", "key", rx);
        assert_eq!(p.table_url(), "https://x.supabase.co/rest/v1/projects");
    }

    #[tokio::test]
    async fn test_unreachable_storage() {
        let (_tx, rx) = watch::channel(None);
        let p = CloudProjects::new("http://127.0.0.1:1", "key", rx);
        let err = p.select_by_owner("u1").await.unwrap_err();
        assert!(matches!(err, PersistError::Transport(_)));
    }
}
