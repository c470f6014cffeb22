//! Remote sync gateway: image inference and natural-language edits.
//!
//! Both calls are plain request/response exchanges against an injected base
//! URL. Neither touches editor state; callers decide what to do with the
//! returned plan.

pub mod endpoint;

use shared::{retain_solid, EditRequest, FloorPlan, Wall, WallsResponse};
use thiserror::Error;

/// Failures of the remote sync calls. All are recoverable.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Please describe the change you want")]
    EmptyPrompt,

    #[error("No image selected")]
    EmptyImage,

    #[error("No walls detected! Try an image with higher contrast.")]
    NoWallsDetected,

    #[error("Backend unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed backend response: {0}")]
    Decode(String),
}

impl SyncError {
    /// "Nothing found" outcomes as opposed to failures
    pub fn is_empty_result(&self) -> bool {
        matches!(self, SyncError::NoWallsDetected)
    }

    /// Rejected locally before any network call
    pub fn is_user_input(&self) -> bool {
        matches!(self, SyncError::EmptyPrompt | SyncError::EmptyImage)
    }
}

#[derive(Clone)]
pub struct SyncGateway {
    client: reqwest::Client,
    base: String,
}

impl SyncGateway {
    pub fn new(base: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base)
    }

    pub fn with_client(client: reqwest::Client, base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { client, base }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    /// Upload a floor-plan image and get the detected walls.
    ///
    /// An empty or missing wall list is reported as
    /// [`SyncError::NoWallsDetected`].
    pub async fn infer_from_image(
        &self,
        image: Vec<u8>,
        file_name: &str,
    ) -> Result<FloorPlan, SyncError> {
        if image.is_empty() {
            return Err(SyncError::EmptyImage);
        }

        let mime = mime_guess::from_path(file_name).first_or_octet_stream();
        let part = reqwest::multipart::Part::bytes(image)
            .file_name(file_name.to_string())
            .mime_str(mime.essence_str())?;
        let form = reqwest::multipart::Form::new().part("file", part);

        tracing::info!("Sending image {} to {}", file_name, self.base);
        let response = self
            .client
            .post(self.url("upload"))
            .multipart(form)
            .send()
            .await?;

        let walls = retain_solid(read_walls(response).await?.walls.unwrap_or_default());
        if walls.is_empty() {
            tracing::warn!("Inference returned no walls");
            return Err(SyncError::NoWallsDetected);
        }
        tracing::info!("Received {} walls", walls.len());
        Ok(walls)
    }

    /// Ask the backend to apply `prompt` to `current`.
    ///
    /// `Ok(None)` means the response carried no wall list: nothing to apply.
    pub async fn apply_instruction(
        &self,
        prompt: &str,
        current: &[Wall],
    ) -> Result<Option<FloorPlan>, SyncError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(SyncError::EmptyPrompt);
        }

        let request = EditRequest {
            prompt: prompt.to_string(),
            current_walls: current.to_vec(),
        };

        let response = self
            .client
            .post(self.url("edit"))
            .json(&request)
            .send()
            .await?;

        let walls = read_walls(response).await?.walls.map(retain_solid);
        match &walls {
            Some(w) => tracing::info!("Instruction produced {} walls", w.len()),
            None => tracing::info!("Instruction produced no wall list"),
        }
        Ok(walls)
    }
}

async fn read_walls(response: reqwest::Response) -> Result<WallsResponse, SyncError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!("Backend error {}: {}", status, body);
        return Err(SyncError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| SyncError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let gw = SyncGateway::new("http://localhost:8000/");
        assert_eq!(gw.base_url(), "http://localhost:8000");
        assert_eq!(gw.url("edit"), "http://localhost:8000/edit");
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected_locally() {
        // Unroutable base: any network call would fail with Unreachable
        let gw = SyncGateway::new("http://127.0.0.1:1");
        let err = gw.apply_instruction("   ", &[]).await.unwrap_err();
        assert!(matches!(err, SyncError::EmptyPrompt));
        assert!(err.is_user_input());
    }

    #[tokio::test]
    async fn test_empty_image_rejected_locally() {
        let gw = SyncGateway::new("http://127.0.0.1:1");
        let err = gw.infer_from_image(Vec::new(), "plan.png").await.unwrap_err();
        assert!(matches!(err, SyncError::EmptyImage));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SyncError::NoWallsDetected.to_string(),
            "No walls detected! Try an image with higher contrast."
        );
        assert!(SyncError::NoWallsDetected.is_empty_result());
    }
}
