// jokecam-core/src/lib.rs

#![doc = include_str!("../../README.md")]

pub mod api;
pub mod capture;
pub mod config;
pub mod errors;
pub mod models;
pub mod screens;
pub mod utils;

pub use api::{ApiClient, CompletionProvider};
pub use capture::{
    Camera, CaptureComponent, CaptureEvent, CaptureView, LensFacing, PermissionState, Photo,
};
pub use config::{ClientConfig, Credential, JokecamConfig};
pub use errors::JokeError;
pub use models::chat::{
    ChatMessage, CompletionRequest, CompletionResponse, ContentBlock, ImageSource, MessageContent,
    ResponseBlock, Role, Usage,
};
pub use screens::{JokeScreen, JokeState, JokeView, LandingScreen, Navigator, Route};

pub use async_trait::async_trait;
