use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerateVideoRequest {
    pub image_base64: String,
    pub mime_type: String,
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerateVideoResponse {
    pub video_id: Uuid,
    pub video_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UploadResponse {
    pub image_base64: String,
    pub mime_type: String,
    pub preview_id: Uuid,
    pub preview_url: String,
}

#[derive(Debug, Clone)]
pub struct StoredMedia {
    pub bytes: Bytes,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

/// In-process handle registry for binary payloads (uploaded previews and
/// generated videos). Entries live until explicitly revoked; a handle that
/// is never revoked holds its buffer for the life of the process.
#[derive(Default)]
pub struct MediaStore {
    entries: RwLock<HashMap<Uuid, StoredMedia>>,
}

impl MediaStore {
    pub fn insert(&self, bytes: Bytes, content_type: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        let media = StoredMedia {
            bytes,
            content_type: content_type.into(),
            created_at: Utc::now(),
        };
        self.entries.write().insert(id, media);
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<StoredMedia> {
        self.entries.read().get(id).cloned()
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        self.entries.write().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }
}
