// jokecam-core/src/capture.rs

//! Camera capture: permission handling, lens facing, and the preview/still toggle.
//!
//! [`CaptureComponent`] owns a [`Camera`] and reports what happened to its owner
//! as [`CaptureEvent`]s instead of calling back into it.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, info, warn};

use crate::errors::{JokeError, Result};

/// A captured image, base64-encoded and ready to drop into an image block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub media_type: String,
    pub data: String,
}

impl Photo {
    pub fn from_image_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(JokeError::capture("Image is empty"));
        }
        Ok(Self {
            media_type: sniff_media_type(bytes).to_string(),
            data: STANDARD.encode(bytes),
        })
    }

    pub fn from_base64(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    /// `data:` URI for displaying the still.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

fn sniff_media_type(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => "image/jpeg",
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LensFacing {
    #[default]
    Back,
    Front,
}

impl LensFacing {
    pub fn toggled(self) -> Self {
        match self {
            LensFacing::Back => LensFacing::Front,
            LensFacing::Front => LensFacing::Back,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PermissionState {
    #[default]
    Unknown,
    Granted,
    Denied,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CaptureView {
    #[default]
    Preview,
    Still(Photo),
}

/// What the capture component tells its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    PhotoTaken(Photo),
    Retake,
}

/// A device that can take pictures.
#[async_trait]
pub trait Camera: Send + Sync {
    /// Asks for permission to use the camera. `Ok(true)` means granted.
    async fn request_permission(&mut self) -> Result<bool>;

    /// Takes a picture with the given lens. `Ok(None)` means nothing was captured.
    async fn take_picture(&mut self, facing: LensFacing) -> Result<Option<Photo>>;
}

pub struct CaptureComponent<C: Camera> {
    camera: C,
    facing: LensFacing,
    permission: PermissionState,
    view: CaptureView,
}

impl<C: Camera> CaptureComponent<C> {
    pub fn new(camera: C) -> Self {
        Self {
            camera,
            facing: LensFacing::default(),
            permission: PermissionState::default(),
            view: CaptureView::default(),
        }
    }

    pub fn facing(&self) -> LensFacing {
        self.facing
    }

    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    pub fn view(&self) -> &CaptureView {
        &self.view
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    /// Requests permission if it has never been asked; otherwise returns the known state.
    pub async fn ensure_permission(&mut self) -> Result<PermissionState> {
        if self.permission == PermissionState::Unknown {
            self.request_permission_again().await?;
        }
        Ok(self.permission)
    }

    /// Asks the camera for permission regardless of the current state.
    pub async fn request_permission_again(&mut self) -> Result<PermissionState> {
        let granted = self.camera.request_permission().await?;
        self.permission = if granted {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        };
        info!(permission = ?self.permission, "Camera permission resolved.");
        Ok(self.permission)
    }

    pub fn toggle_facing(&mut self) -> LensFacing {
        self.facing = self.facing.toggled();
        debug!(facing = ?self.facing, "Flipped camera.");
        self.facing
    }

    /// Captures a still from the live preview.
    pub async fn take_photo(&mut self) -> Result<Option<CaptureEvent>> {
        if self.permission != PermissionState::Granted {
            return Err(JokeError::PermissionDenied);
        }
        if let CaptureView::Still(_) = self.view {
            warn!("take_photo called while showing a still; retake first.");
            return Ok(None);
        }
        match self.camera.take_picture(self.facing).await? {
            Some(photo) => {
                debug!(media_type = %photo.media_type, len = photo.data.len(), "Photo taken.");
                self.view = CaptureView::Still(photo.clone());
                Ok(Some(CaptureEvent::PhotoTaken(photo)))
            }
            None => {
                warn!("Camera returned no picture.");
                Ok(None)
            }
        }
    }

    /// Discards the still and goes back to the live preview.
    pub fn retake(&mut self) -> CaptureEvent {
        self.view = CaptureView::Preview;
        CaptureEvent::Retake
    }
}
