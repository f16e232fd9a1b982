// jokecam-cli/src/camera.rs
use std::path::{Path, PathBuf};

use dialoguer::{Confirm, theme::ColorfulTheme};
use jokecam_core::{Camera, JokeError, LensFacing, Photo, async_trait, errors::Result};
use tracing::{debug, info};

/// How `FileCamera` answers permission requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionPrompt {
    AutoGrant,
    Ask,
}

/// A "camera" that captures whatever image file it is pointed at.
#[derive(Debug, Clone)]
pub struct FileCamera {
    back: PathBuf,
    front: Option<PathBuf>,
    prompt: PermissionPrompt,
}

impl FileCamera {
    pub fn new(back: PathBuf, front: Option<PathBuf>, prompt: PermissionPrompt) -> Self {
        Self {
            back,
            front,
            prompt,
        }
    }

    pub fn path_for(&self, facing: LensFacing) -> &Path {
        match facing {
            LensFacing::Back => &self.back,
            LensFacing::Front => self.front.as_deref().unwrap_or(&self.back),
        }
    }
}

#[async_trait]
impl Camera for FileCamera {
    async fn request_permission(&mut self) -> Result<bool> {
        match self.prompt {
            PermissionPrompt::AutoGrant => Ok(true),
            PermissionPrompt::Ask => {
                let granted = Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt(
                        "jokecam needs your permission to use the camera. Grant permission?",
                    )
                    .default(true)
                    .interact()
                    .map_err(|e| {
                        JokeError::capture(format!("Failed to ask for permission: {}", e))
                    })?;
                info!(granted, "User answered camera permission prompt.");
                Ok(granted)
            }
        }
    }

    async fn take_picture(&mut self, facing: LensFacing) -> Result<Option<Photo>> {
        let path = self.path_for(facing);
        debug!(path = %path.display(), ?facing, "Reading picture.");
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| JokeError::capture(format!("Failed to read {}: {}", path.display(), e)))?;
        Photo::from_image_bytes(&bytes).map(Some)
    }
}
