use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::config::GenerationConfig;

#[derive(Debug, Clone, Serialize)]
pub struct BackendInfo {
    pub name: String,
    pub base_url: Option<String>,
    /// True for the local fallback; the orchestrator drives the
    /// cosmetic progress simulation only in that mode.
    pub synthetic: bool,
}

/// One entry of the ordered compose payload. Order equals ingestion
/// order and the backend composites in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposeEntry {
    pub url: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeResult {
    pub preview_url: String,
    pub video_url: Option<String>,
    pub total_seconds: u32,
}

/// Capability interface of the generation backend. The session depends
/// only on this trait; remote-HTTP and local-synthetic variants must be
/// interchangeable without changing the observable job state machine.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Stores one photo and returns its backend-assigned reference.
    async fn upload(&self, file_name: &str, bytes: Bytes) -> anyhow::Result<String>;

    /// Turns the ordered photo references plus config into a preview
    /// artifact.
    async fn compose(
        &self,
        photos: &[ComposeEntry],
        config: &GenerationConfig,
    ) -> anyhow::Result<ComposeResult>;

    /// Resolves a previously returned artifact reference to its bytes.
    async fn fetch_artifact(&self, artifact_url: &str) -> anyhow::Result<Bytes>;

    /// Cheap reachability probe, used to pick remote vs. degraded mode.
    async fn ping(&self) -> anyhow::Result<()>;

    fn info(&self) -> BackendInfo;
}
