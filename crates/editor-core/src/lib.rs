pub mod backend;
pub mod blobs;
pub mod config;
pub mod error;
pub mod job;
pub mod notice;
pub mod photo;
pub mod session;
pub mod synthetic;

pub use backend::{BackendInfo, ComposeEntry, ComposeResult, GenerationBackend};
pub use blobs::BlobStore;
pub use config::{AnimationStyle, ConfigPatch, FrameDuration, GenerationConfig, TransitionStyle};
pub use error::EditorError;
pub use job::{GenerationJob, JobEvent, JobPhase};
pub use notice::{Notice, NoticeKind};
pub use photo::{CandidateFile, Photo, MAX_PHOTOS};
pub use session::{EditorSession, PreviewDownload, PreviewPlayback, SessionChannels, SessionOptions};
pub use synthetic::SyntheticBackend;
