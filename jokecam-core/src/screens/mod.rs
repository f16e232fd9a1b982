// jokecam-core/src/screens/mod.rs
//! Screen state for the landing and joke screens, independent of any renderer.

pub mod joke;
pub mod landing;

pub use joke::{build_joke_messages, extract_joke, JokeScreen, JokeState, JokeView, JOKE_PROMPT};
pub use landing::{LandingScreen, Navigator, Route};
