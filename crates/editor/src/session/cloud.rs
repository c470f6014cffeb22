//! Hosted auth service (GoTrue-style REST API).
//!
//! The session is kept on disk so it can be restored on the next start.

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::json;
use tokio::sync::watch;

use super::{validate_email, AuthError, AuthService, Session};

pub struct CloudAuth {
    client: reqwest::Client,
    url: String,
    anon_key: String,
    sender: watch::Sender<Option<Session>>,
    store_path: Option<PathBuf>,
}

#[derive(Deserialize)]
struct UserBody {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
struct TokenBody {
    access_token: String,
    user: UserBody,
}

impl CloudAuth {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let store_path = directories::ProjectDirs::from("com", "floorplan", "floorplan-editor")
            .map(|dirs| dirs.data_dir().join("session.json"));
        Self::with_store_path(url, anon_key, store_path)
    }

    /// Keep the session at `store_path` (`None` keeps it in memory only)
    pub fn with_store_path(
        url: impl Into<String>,
        anon_key: impl Into<String>,
        store_path: Option<PathBuf>,
    ) -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            client: reqwest::Client::new(),
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            sender,
            store_path,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url, path)
    }

    fn load_stored(&self) -> Option<Session> {
        let path = self.store_path.as_ref()?;
        let json = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&json).ok()
    }

    fn store(&self, session: Option<&Session>) {
        let Some(path) = &self.store_path else {
            return;
        };
        match session {
            Some(session) => {
                if let Some(parent) = path.parent() {
                    let _ = std::fs::create_dir_all(parent);
                }
                if let Ok(json) = serde_json::to_string(session) {
                    if let Err(e) = std::fs::write(path, json) {
                        tracing::warn!("Failed to persist session: {e}");
                    }
                }
            }
            None => {
                let _ = std::fs::remove_file(path);
            }
        }
    }

    fn publish(&self, session: Option<Session>) {
        self.store(session.as_ref());
        self.sender.send_replace(session);
    }
}

/// Turn a non-2xx auth response into a user-facing rejection
async fn rejection(response: reqwest::Response) -> AuthError {
    let status = response.status();
    let body: serde_json::Value = response.json().await.unwrap_or_default();
    let message = ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| body[*key].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Sign-in failed ({status})"));
    tracing::error!("Auth error {}: {}", status, message);
    AuthError::Rejected(message)
}

impl AuthService for CloudAuth {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        let Some(stored) = self.load_stored() else {
            return Ok(None);
        };
        let Some(token) = stored.access_token.clone() else {
            self.publish(None);
            return Ok(None);
        };

        let response = self
            .client
            .get(self.endpoint("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&token)
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::info!("Stored session expired ({})", response.status());
            self.publish(None);
            return Ok(None);
        }

        let user: UserBody = response.json().await?;
        let session = Session {
            user_id: user.id,
            email: user.email.unwrap_or(stored.email),
            access_token: Some(token),
        };
        self.publish(Some(session.clone()));
        Ok(Some(session))
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sender.subscribe()
    }

    async fn sign_in_with_email_link(&self, address: &str) -> Result<(), AuthError> {
        let address = validate_email(address)?;
        let response = self
            .client
            .post(self.endpoint("otp"))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": address, "create_user": true }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        tracing::info!("Magic link sent to {}", address);
        Ok(())
    }

    async fn confirm_sign_in(&self, address: &str, code: &str) -> Result<(), AuthError> {
        let address = validate_email(address)?;
        let response = self
            .client
            .post(self.endpoint("verify"))
            .header("apikey", &self.anon_key)
            .json(&json!({ "type": "email", "email": address, "token": code.trim() }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let body: TokenBody = response.json().await?;
        let session = Session {
            user_id: body.user.id,
            email: body.user.email.unwrap_or_else(|| address.to_string()),
            access_token: Some(body.access_token),
        };
        tracing::info!("Signed in as {}", session.email);
        self.publish(Some(session));
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let token = self
            .sender
            .borrow()
            .as_ref()
            .and_then(|s| s.access_token.clone());

        // Local state goes regardless of what the server says
        self.publish(None);

        if let Some(token) = token {
            let response = self
                .client
                .post(self.endpoint("logout"))
                .header("apikey", &self.anon_key)
                .bearer_auth(token)
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(rejection(response).await);
            }
        }
        Ok(())
    }
}
