use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use editor_core::backend::{BackendInfo, ComposeEntry, ComposeResult, GenerationBackend};
use editor_core::config::GenerationConfig;

/// Remote generation backend: two opaque JSON endpoints, no retries.
/// A single failed call is terminal for the job.
pub struct HttpBackend {
    upload_url: String,
    compose_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(upload_url: String, compose_url: String) -> Self {
        Self { upload_url, compose_url, client: reqwest::Client::new() }
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

#[derive(Deserialize)]
struct ComposeResponse {
    preview_url: String,
    video_url: Option<String>,
    duration: Option<u32>,
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    async fn upload(&self, file_name: &str, bytes: Bytes) -> Result<String> {
        let body = json!({
            "file": BASE64.encode(&bytes),
            "fileName": file_name,
        });
        let resp = self
            .client
            .post(&self.upload_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let parsed: UploadResponse = resp.json().await.context("malformed upload response")?;
        Ok(parsed.url)
    }

    async fn compose(
        &self,
        photos: &[ComposeEntry],
        config: &GenerationConfig,
    ) -> Result<ComposeResult> {
        let body = json!({
            "photos": photos,
            "duration": config.frame_duration.seconds(),
            "animationType": config.animation,
            "transition": config.transition,
        });
        let resp = self
            .client
            .post(&self.compose_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let parsed: ComposeResponse = resp.json().await.context("malformed compose response")?;

        let fallback = photos.len() as u32 * u32::from(config.frame_duration.seconds());
        Ok(ComposeResult {
            preview_url: parsed.preview_url,
            video_url: parsed.video_url,
            total_seconds: parsed.duration.unwrap_or(fallback),
        })
    }

    async fn fetch_artifact(&self, artifact_url: &str) -> Result<Bytes> {
        let resp = self.client.get(artifact_url).send().await?.error_for_status()?;
        Ok(resp.bytes().await?)
    }

    async fn ping(&self) -> Result<()> {
        // The upload endpoint answers its CORS preflight with 200.
        self.client
            .request(Method::OPTIONS, &self.upload_url)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    fn info(&self) -> BackendInfo {
        BackendInfo {
            name: "http".to_string(),
            base_url: Some(self.upload_url.clone()),
            synthetic: false,
        }
    }
}
