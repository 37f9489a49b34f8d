use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, instrument, Instrument};

use super::{progress_percent, ImageStore, LocalImage, UploadEvent, UploadTask};

/// Object store kept in process memory.
///
/// Uploads are written chunk by chunk on a background task so that progress
/// arrives the same way it would from a remote store.
#[derive(Clone)]
pub struct InMemoryImageStore {
    base_url: String,
    chunk_size: usize,
    blobs: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl InMemoryImageStore {
    pub fn new(base_url: impl Into<String>, chunk_size: usize) -> Self {
        Self {
            base_url: base_url.into(),
            chunk_size: chunk_size.max(1),
            blobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Retrieval URL of an object key.
    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    pub async fn get(&self, key: &str) -> Option<Bytes> {
        self.blobs.read().await.get(key).cloned()
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    #[instrument(skip(self, image), fields(bytes = image.len()))]
    async fn upload(&self, key: &str, image: LocalImage) -> UploadTask {
        let (sender, receiver) = mpsc::channel(16);
        let key = key.to_string();
        let url = self.url_for(&key);
        let blobs = Arc::clone(&self.blobs);
        let chunk_size = self.chunk_size;

        tokio::spawn(
            async move {
                let total = image.len();
                let mut transferred = 0u64;
                let mut buffer = Vec::with_capacity(image.data.len());

                if image.is_empty() {
                    let _ = sender.send(UploadEvent::Progress(100)).await;
                }
                for chunk in image.data.chunks(chunk_size) {
                    buffer.extend_from_slice(chunk);
                    transferred += chunk.len() as u64;
                    let percent = progress_percent(transferred, total);
                    debug!(percent, "Chunk written");
                    // A gone receiver does not stop the upload.
                    let _ = sender.send(UploadEvent::Progress(percent)).await;
                    tokio::task::yield_now().await;
                }

                blobs.write().await.insert(key, Bytes::from(buffer));
                info!(url = %url, "Upload completed");
                let _ = sender.send(UploadEvent::Completed { url }).await;
            }
            .in_current_span(),
        );

        UploadTask::new(receiver)
    }
}
