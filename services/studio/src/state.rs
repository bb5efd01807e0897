use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{watch, Mutex, RwLock};
use uuid::Uuid;

use editor_core::backend::GenerationBackend;
use editor_core::blobs::BlobStore;
use editor_core::job::GenerationJob;
use editor_core::notice::Notice;
use editor_core::session::{EditorSession, SessionOptions};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    pub backend: Arc<dyn GenerationBackend>,
    pub session_options: SessionOptions,
}

/// One live editor view. The session itself sits behind a lock that a
/// running generation holds end to end; the watch receiver, notice
/// buffer and blob handle stay readable throughout.
#[derive(Clone)]
pub struct SessionEntry {
    pub session: Arc<Mutex<EditorSession>>,
    pub job: watch::Receiver<GenerationJob>,
    pub notices: Arc<std::sync::Mutex<Vec<Notice>>>,
    pub blobs: BlobStore,
}

impl AppState {
    pub fn new(backend: Arc<dyn GenerationBackend>, session_options: SessionOptions) -> Self {
        Self { sessions: RwLock::new(HashMap::new()), backend, session_options }
    }

    pub async fn create_session(&self) -> Uuid {
        let (session, channels) =
            EditorSession::new(self.backend.clone(), self.session_options.clone());
        let id = Uuid::new_v4();

        let blobs = session.blobs();
        let notices = Arc::new(std::sync::Mutex::new(Vec::new()));

        // Drain toasts into a poll buffer; the task ends with the session.
        let buffer = notices.clone();
        let mut rx = channels.notices;
        tokio::spawn(async move {
            while let Some(notice) = rx.recv().await {
                buffer.lock().expect("notice buffer lock").push(notice);
            }
        });

        let entry = SessionEntry {
            session: Arc::new(Mutex::new(session)),
            job: channels.job,
            notices,
            blobs,
        };
        self.sessions.write().await.insert(id, entry);
        id
    }

    pub async fn session(&self, id: Uuid) -> Option<SessionEntry> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Drops the entry; the session's teardown releases its display
    /// references.
    pub async fn drop_session(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }
}
