use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future::try_join_all;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use uuid::Uuid;

use crate::backend::{ComposeEntry, ComposeResult, GenerationBackend};
use crate::blobs::BlobStore;
use crate::config::{ConfigPatch, GenerationConfig};
use crate::error::EditorError;
use crate::job::{GenerationJob, JobEvent, JobPhase};
use crate::notice::{Notice, NoticeSender};
use crate::photo::{CandidateFile, Photo, MAX_PHOTOS};

/// Interval of the cosmetic progress simulation in synthetic mode.
const DEFAULT_SIM_TICK: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub simulated_tick: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { simulated_tick: DEFAULT_SIM_TICK }
    }
}

/// Lock-free observers handed to the presentation layer: toasts and
/// live job snapshots.
pub struct SessionChannels {
    pub notices: mpsc::UnboundedReceiver<Notice>,
    pub job: watch::Receiver<GenerationJob>,
}

/// Transient playback state; self-terminating, no effect on the job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewPlayback {
    pub preview_url: String,
    pub duration_seconds: u32,
}

#[derive(Debug, Clone)]
pub struct PreviewDownload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// The upload/generate orchestrator. Owns the staged photos, the
/// generation config and the lifecycle of the single in-flight job for
/// one editor view. All transitions run on the caller's task; the only
/// internal concurrency is the upload fan-out, which is never observed
/// partially.
pub struct EditorSession {
    photos: Vec<Photo>,
    config: GenerationConfig,
    job: GenerationJob,
    blobs: BlobStore,
    backend: Arc<dyn GenerationBackend>,
    notices: NoticeSender,
    job_tx: watch::Sender<GenerationJob>,
    options: SessionOptions,
}

impl EditorSession {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        options: SessionOptions,
    ) -> (Self, SessionChannels) {
        let (notices, notice_rx) = NoticeSender::channel();
        let job = GenerationJob::default();
        let (job_tx, job_rx) = watch::channel(job.clone());
        let session = Self {
            photos: Vec::new(),
            config: GenerationConfig::default(),
            job,
            blobs: BlobStore::new(),
            backend,
            notices,
            job_tx,
            options,
        };
        (session, SessionChannels { notices: notice_rx, job: job_rx })
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn job(&self) -> &GenerationJob {
        &self.job
    }

    /// Handle to the display-reference registry, for resolving the
    /// photos' `blob:` URLs without holding the session.
    pub fn blobs(&self) -> BlobStore {
        self.blobs.clone()
    }

    /// Admits a picker/drop batch. Non-image candidates are silently
    /// discarded; a batch that would push the collection past
    /// [`MAX_PHOTOS`] is rejected whole. Returns the number of photos
    /// actually added.
    pub fn ingest(&mut self, batch: Vec<CandidateFile>) -> Result<usize, EditorError> {
        let accepted: Vec<CandidateFile> =
            batch.into_iter().filter(CandidateFile::is_image).collect();

        if self.photos.len() + accepted.len() > MAX_PHOTOS {
            let err = EditorError::CapacityExceeded { attempted: accepted.len(), max: MAX_PHOTOS };
            self.notices.send(Notice::warning(err.to_string()));
            return Err(err);
        }

        let added = accepted.len();
        for file in accepted {
            let display_url = self.blobs.insert(file.bytes.clone());
            self.photos.push(Photo {
                id: Uuid::new_v4(),
                name: file.name,
                display_url,
                raw_data: Some(file.bytes),
                remote_ref: None,
            });
        }

        if added > 0 {
            self.notices.send(Notice::info(format!("added {added} photo(s)")));
        }
        Ok(added)
    }

    /// Removes one photo and releases its display reference. No-op if
    /// the id is unknown.
    pub fn remove(&mut self, photo_id: Uuid) {
        if let Some(pos) = self.photos.iter().position(|p| p.id == photo_id) {
            let photo = self.photos.remove(pos);
            self.blobs.revoke(&photo.display_url);
        }
    }

    pub fn update_config(&mut self, patch: ConfigPatch) {
        self.config.apply(patch);
    }

    /// Runs one end-to-end generation attempt: upload every photo that
    /// still lacks a remote reference (fan out, await all), then a
    /// single compose call. Any failure is terminal for the job and
    /// leaves the collection and config untouched; a terminal state
    /// always re-enables the trigger.
    pub async fn start_generation(&mut self) -> Result<ComposeResult, EditorError> {
        if self.job.is_active() {
            return Err(EditorError::JobActive);
        }
        if self.photos.is_empty() {
            self.notices.send(Notice::error(EditorError::EmptySubmission.to_string()));
            return Err(EditorError::EmptySubmission);
        }

        let job_id = Uuid::new_v4();
        self.apply(JobEvent::Start { job_id });
        info!(%job_id, photos = self.photos.len(), "generation started");

        if let Err(e) = self.upload_pending().await {
            warn!(%job_id, error = %e, "photo upload failed");
            self.fail_job(&e);
            return Err(EditorError::Upload(e));
        }
        self.apply(JobEvent::UploadsComplete);

        let entries: Vec<ComposeEntry> = self
            .photos
            .iter()
            .filter_map(|p| {
                p.remote_ref
                    .as_ref()
                    .map(|url| ComposeEntry { url: url.clone(), name: p.name.clone() })
            })
            .collect();

        let result = match self.compose(entries).await {
            Ok(result) => result,
            Err(e) => {
                warn!(%job_id, error = %e, "compose request failed");
                self.fail_job(&e);
                return Err(EditorError::Compose(e));
            }
        };

        self.apply(JobEvent::Done { result: result.clone() });
        self.notices.send(Notice::info("video ready"));
        info!(%job_id, preview_url = %result.preview_url, "generation succeeded");
        Ok(result)
    }

    /// Available only after a successful job; purely presentational.
    pub fn play_preview(&self) -> Option<PreviewPlayback> {
        if self.job.phase != JobPhase::Succeeded {
            return None;
        }
        let result = self.job.result.as_ref()?;
        Some(PreviewPlayback {
            preview_url: result.preview_url.clone(),
            duration_seconds: result.total_seconds,
        })
    }

    /// Exports the preview bytes under a generated filename. Silent
    /// (`None`) when there is no artifact or the fetch fails.
    pub async fn download_preview(&self) -> Option<PreviewDownload> {
        if self.job.phase != JobPhase::Succeeded {
            return None;
        }
        let result = self.job.result.as_ref()?;
        let job_id = self.job.job_id?;
        match self.backend.fetch_artifact(&result.preview_url).await {
            Ok(bytes) => {
                Some(PreviewDownload { file_name: format!("photomotion-{job_id}.png"), bytes })
            }
            Err(e) => {
                warn!(error = %e, "preview download failed");
                None
            }
        }
    }

    fn apply(&mut self, event: JobEvent) {
        self.job.apply(event);
        self.job_tx.send_replace(self.job.clone());
    }

    fn fail_job(&mut self, cause: &anyhow::Error) {
        self.apply(JobEvent::Error { message: cause.to_string() });
        self.notices.send(Notice::error("generation failed"));
    }

    /// Uploads every photo without a memoized remote reference. All
    /// uploads are issued at once; the first failure aborts the set and
    /// assigns nothing.
    async fn upload_pending(&mut self) -> anyhow::Result<()> {
        let backend = self.backend.clone();
        let pending: Vec<(usize, String, Bytes)> = self
            .photos
            .iter()
            .enumerate()
            .filter(|(_, p)| p.remote_ref.is_none())
            .map(|(idx, p)| (idx, p.name.clone(), p.raw_data.clone().unwrap_or_default()))
            .collect();

        let uploads = pending.into_iter().map(|(idx, name, bytes)| {
            let backend = backend.clone();
            async move {
                let url = backend.upload(&name, bytes).await?;
                Ok::<_, anyhow::Error>((idx, url))
            }
        });

        for (idx, url) in try_join_all(uploads).await? {
            let photo = &mut self.photos[idx];
            photo.remote_ref = Some(url);
            // The backend holds the bytes now.
            photo.raw_data = None;
        }
        Ok(())
    }

    async fn compose(&mut self, entries: Vec<ComposeEntry>) -> anyhow::Result<ComposeResult> {
        let backend = self.backend.clone();
        let config = self.config;

        if !backend.info().synthetic {
            return backend.compose(&entries, &config).await;
        }

        // Degraded mode: same state machine, but progress is advanced
        // on a fixed interval while the local render runs.
        let compose = async move { backend.compose(&entries, &config).await };
        tokio::pin!(compose);
        let mut ticker = tokio::time::interval(self.options.simulated_tick);
        ticker.tick().await; // first tick completes immediately
        loop {
            tokio::select! {
                result = &mut compose => return result,
                _ = ticker.tick() => self.apply(JobEvent::SimTick),
            }
        }
    }
}

impl Drop for EditorSession {
    /// Display references are process-local resources; tearing down the
    /// editor releases all of them.
    fn drop(&mut self) {
        self.blobs.clear();
    }
}
