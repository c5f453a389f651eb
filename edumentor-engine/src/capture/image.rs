use std::path::Path;

use anyhow::Context;
use edumentor_core::errors::{CameraError, ValidationError};
use edumentor_core::types::{DataUrl, ImageSource, mime_for_extension};

use crate::traits::{Camera, CameraStream, CapturedImage};

const FALLBACK_IMAGE_MIME: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Reads a picked or dropped file; the MIME type comes from the extension.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read image: {}", path.display()))?;
        let mime_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(mime_for_extension)
            .unwrap_or(FALLBACK_IMAGE_MIME);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".into());
        Ok(Self::new(name, mime_type, bytes))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    Idle,
    Streaming,
    Captured,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selection {
    File(ImageFile),
    Still(CapturedImage),
}

/// Image adapter. A picked file and a camera still both end up as the single
/// current selection, encoded the same way.
pub struct ImageCapture {
    selection: Option<Selection>,
    stream: Option<Box<dyn CameraStream>>,
    camera_state: CameraState,
}

impl Default for ImageCapture {
    fn default() -> Self {
        Self {
            selection: None,
            stream: None,
            camera_state: CameraState::Idle,
        }
    }
}

impl std::fmt::Debug for ImageCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCapture")
            .field("selection", &self.selection_label())
            .field("camera_state", &self.camera_state)
            .finish()
    }
}

impl ImageCapture {
    pub fn select_file(&mut self, file: ImageFile) {
        log::debug!("image selected: {} ({})", file.name, file.mime_type);
        self.selection = Some(Selection::File(file));
    }

    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    pub fn selection_label(&self) -> Option<String> {
        self.selection.as_ref().map(|s| match s {
            Selection::File(f) => f.name.clone(),
            Selection::Still(_) => "camera capture".to_string(),
        })
    }

    pub fn camera_state(&self) -> CameraState {
        self.camera_state
    }

    pub async fn start_camera(&mut self, camera: &dyn Camera) -> Result<(), CameraError> {
        self.release_stream();
        match camera.open().await {
            Ok(stream) => {
                self.stream = Some(stream);
                self.camera_state = CameraState::Streaming;
                Ok(())
            }
            Err(e) => {
                log::warn!("camera unavailable: {e}");
                self.camera_state = CameraState::Idle;
                Err(e)
            }
        }
    }

    /// Grabs one still and releases the camera whether or not that worked.
    pub async fn capture_still(&mut self) -> Result<(), CameraError> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| CameraError::Capture("camera is not streaming".into()))?;
        let result = stream.capture_still().await;
        self.release_stream();

        match result {
            Ok(still) => {
                self.selection = Some(Selection::Still(still));
                self.camera_state = CameraState::Captured;
                Ok(())
            }
            Err(e) => {
                self.camera_state = CameraState::Idle;
                Err(e)
            }
        }
    }

    pub fn stop_camera(&mut self) {
        self.release_stream();
        if self.camera_state == CameraState::Streaming {
            self.camera_state = CameraState::Idle;
        }
    }

    pub fn source(&self) -> Option<ImageSource> {
        match &self.selection {
            Some(Selection::File(_)) => Some(ImageSource::File),
            Some(Selection::Still(_)) => Some(ImageSource::Camera),
            None => None,
        }
    }

    pub fn encode(&self) -> Result<DataUrl, ValidationError> {
        match &self.selection {
            Some(Selection::File(f)) => Ok(DataUrl::encode(f.mime_type.clone(), &f.bytes)),
            Some(Selection::Still(s)) => Ok(DataUrl::encode(s.mime_type.clone(), &s.bytes)),
            None => Err(ValidationError::NoImageSelected),
        }
    }

    fn release_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
    }
}

impl Drop for ImageCapture {
    fn drop(&mut self) {
        self.release_stream();
    }
}
