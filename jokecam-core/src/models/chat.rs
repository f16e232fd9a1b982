// jokecam-core/src/models/chat.rs
//! Wire types for the Anthropic Messages API.

use serde::{Deserialize, Serialize};

pub const FALLBACK_JOKE: &str = "Why did the environment variable go to therapy?\n\n\
It was tired of being left undefined! 🛋️\n\n\
(Maybe set ANTHROPIC_API_KEY\nbefore I start charging for these dad jokes...)";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn in the conversation sent to the model.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Blocks(blocks),
        }
    }
}

/// Either a bare string or an ordered list of content blocks.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Image { source: ImageSource },
    Text { text: String },
}

impl ContentBlock {
    pub fn base64_image(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        ContentBlock::Image {
            source: ImageSource::Base64 {
                media_type: media_type.into(),
                data: data.into(),
            },
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ImageSource {
    Base64 { media_type: String, data: String },
}

/// Body of `POST /v1/messages`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResponseBlock {
    Text { text: String },
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    #[serde(default)]
    pub cache_creation_input_tokens: u32,
    #[serde(default)]
    pub cache_read_input_tokens: u32,
}

/// The API's answer to a `CompletionRequest`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub id: String,
    pub model: String,
    pub role: Role,
    #[serde(rename = "type", default = "default_message_type")]
    pub message_type: String,
    pub content: Vec<ResponseBlock>,
    pub stop_reason: String,
    pub stop_sequence: Option<String>,
    pub usage: Usage,
}

fn default_message_type() -> String {
    "message".to_string()
}

impl CompletionResponse {
    /// The canned response used when no credential is configured.
    pub fn fallback() -> Self {
        Self {
            id: "123".to_string(),
            model: crate::config::DEFAULT_MODEL.to_string(),
            role: Role::Assistant,
            message_type: default_message_type(),
            content: vec![ResponseBlock::Text {
                text: FALLBACK_JOKE.to_string(),
            }],
            stop_reason: "end_turn".to_string(),
            stop_sequence: None,
            usage: Usage::default(),
        }
    }

    /// Text of the first content block, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|block| match block {
            ResponseBlock::Text { text } => text.as_str(),
        })
    }
}
