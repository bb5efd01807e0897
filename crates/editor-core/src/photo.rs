use bytes::Bytes;
use serde::Serialize;
use uuid::Uuid;

/// Hard product cap for the demo editor.
pub const MAX_PHOTOS: usize = 3;

/// Raw file handed over by the ingestion surface (picker or drop event).
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Bytes,
}

impl CandidateFile {
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// One staged photo. `raw_data` is kept only until the backend hands
/// back a storage reference; after that the bytes are dropped and
/// `remote_ref` makes re-submission skip the upload.
#[derive(Debug, Clone, Serialize)]
pub struct Photo {
    pub id: Uuid,
    pub name: String,
    /// `blob:<uuid>` reference, resolvable through the owning session's
    /// [`BlobStore`](crate::blobs::BlobStore) for the session lifetime only.
    pub display_url: String,
    #[serde(skip)]
    pub raw_data: Option<Bytes>,
    pub remote_ref: Option<String>,
}
