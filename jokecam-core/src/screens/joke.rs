// jokecam-core/src/screens/joke.rs

//! The joke screen: turns a captured photo into exactly one completion request
//! and tracks what should be shown while it runs and after it finishes.

use tracing::{debug, error, info};

use crate::api::CompletionProvider;
use crate::capture::{CaptureEvent, Photo};
use crate::errors::{JokeError, Result};
use crate::models::chat::{ChatMessage, CompletionResponse, ContentBlock};
use crate::utils::truncate_string;

pub const JOKE_PROMPT: &str = "Please create a joke about the image. It should be very awkward and dry.\n\
Only output the joke. Do not output any other text. Add a number of laughing emojis (😂) at the end of the joke\n\
so that people know they're supposed to laugh.";

/// The single user message sent for a photo: the image first, then the instruction.
pub fn build_joke_messages(photo: &Photo, prompt: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::user_blocks(vec![
        ContentBlock::base64_image(photo.media_type.clone(), photo.data.clone()),
        ContentBlock::text(prompt),
    ])]
}

pub fn extract_joke(response: &CompletionResponse) -> Result<String> {
    response
        .first_text()
        .map(str::to_string)
        .ok_or(JokeError::EmptyResponse)
}

/// What the screen should render below the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JokeView<'a> {
    Idle,
    Loading,
    Joke(&'a str),
    Error(&'a str),
}

/// Per-screen state. Every change goes through one of the transition methods.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JokeState {
    pub photo: Option<Photo>,
    pub loading: bool,
    pub joke: Option<String>,
    pub error: Option<String>,
    /// Bumped on every photo and every retake; results tagged with an older cycle are dropped.
    pub cycle: u64,
}

impl JokeState {
    pub fn photo_taken(&mut self, photo: Photo) -> u64 {
        self.cycle += 1;
        self.photo = Some(photo);
        self.loading = true;
        self.joke = None;
        self.error = None;
        self.cycle
    }

    /// Returns false if the result belonged to an earlier cycle and was dropped.
    pub fn joke_ready(&mut self, cycle: u64, joke: String) -> bool {
        if cycle != self.cycle {
            debug!(cycle, current = self.cycle, "Dropping stale joke.");
            return false;
        }
        self.joke = Some(joke);
        self.loading = false;
        true
    }

    pub fn joke_failed(&mut self, cycle: u64, message: String) -> bool {
        if cycle != self.cycle {
            debug!(cycle, current = self.cycle, "Dropping stale error.");
            return false;
        }
        self.error = Some(message);
        self.loading = false;
        true
    }

    pub fn retake(&mut self) {
        self.cycle += 1;
        self.photo = None;
        self.loading = false;
        self.joke = None;
        self.error = None;
    }

    pub fn view(&self) -> JokeView<'_> {
        if self.loading {
            JokeView::Loading
        } else if let Some(joke) = &self.joke {
            JokeView::Joke(joke)
        } else if let Some(error) = &self.error {
            JokeView::Error(error)
        } else {
            JokeView::Idle
        }
    }
}

pub struct JokeScreen<P: CompletionProvider> {
    provider: P,
    prompt: String,
    state: JokeState,
}

impl<P: CompletionProvider> JokeScreen<P> {
    pub fn new(provider: P) -> Self {
        Self::with_prompt(provider, JOKE_PROMPT)
    }

    pub fn with_prompt(provider: P, prompt: impl Into<String>) -> Self {
        Self {
            provider,
            prompt: prompt.into(),
            state: JokeState::default(),
        }
    }

    pub fn state(&self) -> &JokeState {
        &self.state
    }

    /// Applies a capture event. A photo triggers one completion request, awaited to the end.
    pub async fn handle(&mut self, event: CaptureEvent) -> JokeView<'_> {
        match event {
            CaptureEvent::PhotoTaken(photo) => {
                let messages = build_joke_messages(&photo, &self.prompt);
                let cycle = self.state.photo_taken(photo);
                info!(cycle, provider = self.provider.name(), "Requesting joke.");

                let outcome = self
                    .provider
                    .complete(messages)
                    .await
                    .and_then(|response| extract_joke(&response));

                match outcome {
                    Ok(joke) => {
                        debug!(joke = %truncate_string(&joke, 60), "Joke received.");
                        self.state.joke_ready(cycle, joke);
                    }
                    Err(e) => {
                        error!(error = %e, "Joke request failed.");
                        self.state.joke_failed(cycle, e.to_string());
                    }
                }
            }
            CaptureEvent::Retake => self.state.retake(),
        }
        self.state.view()
    }
}
