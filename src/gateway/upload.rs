use std::path::Path;

use bytes::Bytes;
use tokio::sync::mpsc;

use super::UploadError;

/// A photo picked on the device, held locally until the editor submits.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalImage {
    pub name: String,
    pub data: Bytes,
}

impl LocalImage {
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| UploadError::LocalImage(format!("{}: {}", path.display(), e)))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::from_bytes(name, data))
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Events produced by a single upload. A well-formed upload emits any number
/// of `Progress` events followed by exactly one terminal event.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    Progress(u8),
    Completed { url: String },
    Failed(UploadError),
}

impl UploadEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, UploadEvent::Progress(_))
    }
}

/// Receiving end of one in-flight upload.
pub struct UploadTask {
    events: mpsc::Receiver<UploadEvent>,
}

impl UploadTask {
    pub fn new(events: mpsc::Receiver<UploadEvent>) -> Self {
        Self { events }
    }

    /// Next event, or `None` once the uploader has gone away.
    pub async fn next(&mut self) -> Option<UploadEvent> {
        self.events.recv().await
    }
}

/// Integer percentage of an upload, `floor(100 * transferred / total)`.
///
/// An empty payload is complete by definition.
pub fn progress_percent(bytes_transferred: u64, total_bytes: u64) -> u8 {
    if total_bytes == 0 {
        return 100;
    }
    let transferred = bytes_transferred.min(total_bytes) as u128;
    ((100 * transferred) / total_bytes as u128) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_floored() {
        assert_eq!(progress_percent(0, 3), 0);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 66);
        assert_eq!(progress_percent(3, 3), 100);
    }

    #[test]
    fn progress_handles_empty_and_overshoot() {
        assert_eq!(progress_percent(0, 0), 100);
        assert_eq!(progress_percent(10, 4), 100);
    }

    #[tokio::test]
    async fn missing_file_is_a_local_image_error() {
        let err = LocalImage::from_path("/definitely/not/here.jpg").await.unwrap_err();
        assert!(matches!(err, UploadError::LocalImage(_)));
    }
}
