use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc::error::TryRecvError;

use editor_core::backend::{BackendInfo, ComposeEntry, ComposeResult, GenerationBackend};
use editor_core::config::{AnimationStyle, ConfigPatch, FrameDuration, GenerationConfig, TransitionStyle};
use editor_core::error::EditorError;
use editor_core::job::JobPhase;
use editor_core::notice::{Notice, NoticeKind};
use editor_core::photo::CandidateFile;
use editor_core::session::{EditorSession, SessionChannels, SessionOptions};
use editor_core::synthetic::SyntheticBackend;

/// Programmable stand-in for the generation backend.
#[derive(Default)]
struct MockBackend {
    upload_calls: AtomicUsize,
    compose_calls: AtomicUsize,
    fail_uploads: AtomicBool,
    fail_compose: AtomicBool,
    /// Per-call delay; gives concurrent observers a chance to run
    /// between state transitions.
    pace_millis: AtomicUsize,
}

impl MockBackend {
    async fn pace(&self) {
        let millis = self.pace_millis.load(Ordering::SeqCst);
        if millis > 0 {
            tokio::time::sleep(Duration::from_millis(millis as u64)).await;
        }
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn upload(&self, _file_name: &str, _bytes: Bytes) -> anyhow::Result<String> {
        self.pace().await;
        let n = self.upload_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_uploads.load(Ordering::SeqCst) {
            anyhow::bail!("upload refused");
        }
        Ok(format!("https://x/{n}.png"))
    }

    async fn compose(
        &self,
        photos: &[ComposeEntry],
        config: &GenerationConfig,
    ) -> anyhow::Result<ComposeResult> {
        self.pace().await;
        self.compose_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_compose.load(Ordering::SeqCst) {
            anyhow::bail!("compose refused");
        }
        Ok(ComposeResult {
            preview_url: "https://x/out.png".to_string(),
            video_url: Some("https://x/out.mp4".to_string()),
            total_seconds: photos.len() as u32 * u32::from(config.frame_duration.seconds()),
        })
    }

    async fn fetch_artifact(&self, _artifact_url: &str) -> anyhow::Result<Bytes> {
        Ok(Bytes::from_static(b"preview-bytes"))
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn info(&self) -> BackendInfo {
        BackendInfo { name: "mock".to_string(), base_url: None, synthetic: false }
    }
}

fn new_session(backend: Arc<dyn GenerationBackend>) -> (EditorSession, SessionChannels) {
    EditorSession::new(backend, SessionOptions { simulated_tick: Duration::from_millis(1) })
}

fn image(name: &str) -> CandidateFile {
    CandidateFile {
        name: name.to_string(),
        media_type: "image/jpeg".to_string(),
        bytes: Bytes::from_static(&[0xFF, 0xD8, 0xFF]),
    }
}

fn text_file(name: &str) -> CandidateFile {
    CandidateFile {
        name: name.to_string(),
        media_type: "text/plain".to_string(),
        bytes: Bytes::from_static(b"not a photo"),
    }
}

fn drain(channels: &mut SessionChannels) -> Vec<Notice> {
    let mut notices = Vec::new();
    loop {
        match channels.notices.try_recv() {
            Ok(notice) => notices.push(notice),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => return notices,
        }
    }
}

#[test]
fn ingest_silently_discards_non_images() {
    let (mut session, mut channels) = new_session(Arc::new(MockBackend::default()));

    let added = session
        .ingest(vec![image("a.jpg"), text_file("notes.txt"), image("b.jpg")])
        .unwrap();
    assert_eq!(added, 2);
    assert_eq!(session.photos().len(), 2);

    let notices = drain(&mut channels);
    assert_eq!(notices, vec![Notice::info("added 2 photo(s)")]);
}

#[test]
fn capacity_is_all_or_nothing() {
    let (mut session, mut channels) = new_session(Arc::new(MockBackend::default()));

    assert_eq!(session.ingest(vec![image("a.jpg"), image("b.jpg")]).unwrap(), 2);

    // Two more would make four: the whole batch is rejected.
    let err = session.ingest(vec![image("c.jpg"), image("d.jpg")]).unwrap_err();
    assert!(matches!(err, EditorError::CapacityExceeded { attempted: 2, max: 3 }));
    assert_eq!(err.to_string(), "demo limit: max 3 photos");
    assert_eq!(session.photos().len(), 2);

    let removed = session.photos()[0].id;
    session.remove(removed);
    assert_eq!(session.photos().len(), 1);

    // Freed capacity admits the retried batch.
    assert_eq!(session.ingest(vec![image("c.jpg"), image("d.jpg")]).unwrap(), 2);
    assert_eq!(session.photos().len(), 3);

    let warnings: Vec<Notice> = drain(&mut channels)
        .into_iter()
        .filter(|n| n.kind == NoticeKind::Warning)
        .collect();
    assert_eq!(warnings, vec![Notice::warning("demo limit: max 3 photos")]);
}

#[test]
fn removal_preserves_ingestion_order() {
    let (mut session, _channels) = new_session(Arc::new(MockBackend::default()));

    session.ingest(vec![image("a.jpg"), image("b.jpg"), image("c.jpg")]).unwrap();
    let b = session.photos()[1].id;
    session.remove(b);
    // Unknown ids are a no-op.
    session.remove(b);
    session.ingest(vec![image("d.jpg")]).unwrap();

    let names: Vec<&str> = session.photos().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["a.jpg", "c.jpg", "d.jpg"]);
}

#[tokio::test]
async fn empty_submission_is_rejected_without_a_transition() {
    let (mut session, mut channels) = new_session(Arc::new(MockBackend::default()));

    let err = session.start_generation().await.unwrap_err();
    assert!(matches!(err, EditorError::EmptySubmission));
    assert_eq!(session.job().phase, JobPhase::Idle);
    assert_eq!(session.job().progress, 0);

    assert_eq!(drain(&mut channels), vec![Notice::error("add at least one photo")]);
}

#[tokio::test]
async fn successful_generation_reaches_one_hundred_percent() {
    let backend = Arc::new(MockBackend::default());
    let (mut session, mut channels) = new_session(backend.clone());

    session.ingest(vec![image("a.jpg")]).unwrap();
    session.update_config(ConfigPatch {
        frame_duration: Some(FrameDuration::new(5).unwrap()),
        animation: Some(AnimationStyle::Subtle),
        transition: Some(TransitionStyle::Fade),
    });

    let result = session.start_generation().await.unwrap();
    assert_eq!(result.preview_url, "https://x/out.png");
    assert_eq!(result.total_seconds, 5);

    let job = session.job();
    assert_eq!(job.phase, JobPhase::Succeeded);
    assert_eq!(job.progress, 100);
    assert_eq!(job.result.as_ref().unwrap().preview_url, "https://x/out.png");

    let photo = &session.photos()[0];
    assert_eq!(photo.remote_ref.as_deref(), Some("https://x/1.png"));
    assert!(photo.raw_data.is_none(), "byte source is dropped after upload");

    assert!(drain(&mut channels).contains(&Notice::info("video ready")));
}

#[tokio::test]
async fn upload_failure_fails_the_job_and_keeps_the_session_usable() {
    let backend = Arc::new(MockBackend::default());
    let (mut session, mut channels) = new_session(backend.clone());
    session.ingest(vec![image("a.jpg"), image("b.jpg")]).unwrap();

    backend.fail_uploads.store(true, Ordering::SeqCst);
    let err = session.start_generation().await.unwrap_err();
    assert!(matches!(err, EditorError::Upload(_)));

    let job = session.job();
    assert_eq!(job.phase, JobPhase::Failed);
    assert_eq!(job.progress, 0, "progress frozen before the upload checkpoint");
    assert!(job.result.is_none());
    // Nothing partial: no photo got a reference, byte sources are kept.
    assert!(session.photos().iter().all(|p| p.remote_ref.is_none()));
    assert!(session.photos().iter().all(|p| p.raw_data.is_some()));
    assert!(drain(&mut channels).contains(&Notice::error("generation failed")));

    // A terminal state re-enables the trigger.
    backend.fail_uploads.store(false, Ordering::SeqCst);
    session.start_generation().await.unwrap();
    assert_eq!(session.job().phase, JobPhase::Succeeded);
}

#[tokio::test]
async fn compose_failure_leaves_collection_and_config_unchanged() {
    let backend = Arc::new(MockBackend::default());
    let (mut session, _channels) = new_session(backend.clone());
    session.ingest(vec![image("a.jpg"), image("b.jpg")]).unwrap();
    let config_before = *session.config();

    backend.fail_compose.store(true, Ordering::SeqCst);
    let err = session.start_generation().await.unwrap_err();
    assert!(matches!(err, EditorError::Compose(_)));

    let job = session.job();
    assert_eq!(job.phase, JobPhase::Failed);
    assert_eq!(job.progress, 40, "progress frozen at the upload checkpoint");
    assert!(job.result.is_none());
    assert_eq!(session.photos().len(), 2);
    assert_eq!(*session.config(), config_before);

    // Retry succeeds and the memoized references skip the upload step.
    backend.fail_compose.store(false, Ordering::SeqCst);
    session.start_generation().await.unwrap();
    assert_eq!(session.job().phase, JobPhase::Succeeded);
    assert_eq!(backend.upload_calls.load(Ordering::SeqCst), 2);
    assert_eq!(backend.compose_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn uploads_are_idempotent_across_jobs() {
    let backend = Arc::new(MockBackend::default());
    let (mut session, _channels) = new_session(backend.clone());
    session.ingest(vec![image("a.jpg"), image("b.jpg")]).unwrap();

    session.start_generation().await.unwrap();
    assert_eq!(backend.upload_calls.load(Ordering::SeqCst), 2);

    // Only the photo added in between is uploaded on the next run.
    session.ingest(vec![image("c.jpg")]).unwrap();
    session.start_generation().await.unwrap();
    assert_eq!(backend.upload_calls.load(Ordering::SeqCst), 3);
    assert_eq!(backend.compose_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn job_watch_reports_milestones_in_order() {
    let backend = Arc::new(MockBackend::default());
    // The pacing delays put an await point after every transition, so
    // the collector observes each snapshot before the next one lands.
    backend.pace_millis.store(10, Ordering::SeqCst);
    let (mut session, channels) = new_session(backend);
    session.ingest(vec![image("a.jpg")]).unwrap();

    let mut job = channels.job;
    let collector = tokio::spawn(async move {
        let mut seen = Vec::new();
        loop {
            if job.changed().await.is_err() {
                break;
            }
            let snapshot = job.borrow().clone();
            let terminal = !snapshot.is_active() && snapshot.phase != JobPhase::Idle;
            seen.push((snapshot.phase, snapshot.progress));
            if terminal {
                break;
            }
        }
        seen
    });

    session.start_generation().await.unwrap();

    let seen = collector.await.unwrap();
    assert_eq!(
        seen,
        vec![
            (JobPhase::Uploading, 0),
            (JobPhase::Requesting, 40),
            (JobPhase::Succeeded, 100),
        ]
    );
    assert!(session.job().job_id.is_some());
}

#[test]
fn display_references_are_released_on_remove_and_teardown() {
    let (mut session, _channels) = new_session(Arc::new(MockBackend::default()));
    let blobs = session.blobs();

    session.ingest(vec![image("a.jpg"), image("b.jpg")]).unwrap();
    assert_eq!(blobs.len(), 2);
    let first = session.photos()[0].clone();
    assert!(blobs.resolve(&first.display_url).is_some());

    session.remove(first.id);
    assert_eq!(blobs.len(), 1);
    assert!(blobs.resolve(&first.display_url).is_none());

    drop(session);
    assert!(blobs.is_empty(), "teardown revokes every reference");
}

#[tokio::test]
async fn play_and_download_are_gated_on_success() {
    let backend = Arc::new(MockBackend::default());
    let (mut session, _channels) = new_session(backend);
    session.ingest(vec![image("a.jpg"), image("b.jpg")]).unwrap();

    assert!(session.play_preview().is_none());
    assert!(session.download_preview().await.is_none());

    session.start_generation().await.unwrap();

    let playback = session.play_preview().unwrap();
    assert_eq!(playback.preview_url, "https://x/out.png");
    assert_eq!(playback.duration_seconds, 10);

    let download = session.download_preview().await.unwrap();
    assert!(download.file_name.starts_with("photomotion-"));
    assert!(download.file_name.ends_with(".png"));
    assert_eq!(download.bytes, Bytes::from_static(b"preview-bytes"));
}

#[tokio::test]
async fn synthetic_backend_runs_the_same_state_machine() {
    let backend = Arc::new(SyntheticBackend::new());
    let (mut session, _channels) = new_session(backend.clone());
    session.ingest(vec![image("a.jpg")]).unwrap();

    let result = session.start_generation().await.unwrap();
    assert!(result.preview_url.starts_with("synthetic://videos/"));
    assert_eq!(session.job().phase, JobPhase::Succeeded);
    assert_eq!(session.job().progress, 100);

    let download = session.download_preview().await.unwrap();
    assert!(download.bytes.starts_with(&[0x89, b'P', b'N', b'G']));
}
