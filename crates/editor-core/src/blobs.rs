use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use uuid::Uuid;

/// Session-local registry backing `blob:<uuid>` display references.
///
/// Nothing reclaims an entry automatically: the owner must `revoke`
/// when the photo leaves the collection and `clear` on editor
/// teardown. Handles are cheap clones sharing the same registry, so a
/// presentation layer can resolve references without owning the
/// session.
#[derive(Debug, Clone, Default)]
pub struct BlobStore {
    inner: Arc<Mutex<HashMap<Uuid, Bytes>>>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the bytes and mints a `blob:<uuid>` display URL.
    pub fn insert(&self, bytes: Bytes) -> String {
        let id = Uuid::new_v4();
        self.inner.lock().expect("blob registry lock").insert(id, bytes);
        format!("blob:{id}")
    }

    /// Resolves a display URL while it is still registered.
    pub fn resolve(&self, url: &str) -> Option<Bytes> {
        let id = parse_blob_url(url)?;
        self.inner.lock().expect("blob registry lock").get(&id).cloned()
    }

    /// Releases one display URL. Returns whether it was registered.
    pub fn revoke(&self, url: &str) -> bool {
        match parse_blob_url(url) {
            Some(id) => self.inner.lock().expect("blob registry lock").remove(&id).is_some(),
            None => false,
        }
    }

    /// Releases every reference (editor teardown).
    pub fn clear(&self) {
        self.inner.lock().expect("blob registry lock").clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("blob registry lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn parse_blob_url(url: &str) -> Option<Uuid> {
    url.strip_prefix("blob:").and_then(|id| Uuid::parse_str(id).ok())
}
