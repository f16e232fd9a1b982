// jokecam-cli/src/rendering.rs
use std::time::Duration;

use anyhow::Result;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use jokecam_core::utils::truncate_string;
use jokecam_core::{CaptureView, JokeView, LandingScreen, LensFacing, PermissionState};

pub fn print_landing(landing: &LandingScreen) {
    println!("\n{}\n", landing.title.cyan().bold());
}

pub fn print_capture_status(view: &CaptureView, facing: LensFacing, permission: PermissionState) {
    let lens = match facing {
        LensFacing::Back => "back",
        LensFacing::Front => "front",
    };
    match (permission, view) {
        (PermissionState::Denied, _) => {
            println!("{}", "We need your permission to show the camera".yellow());
        }
        (_, CaptureView::Preview) => {
            println!("{} {}", "[live preview]".dimmed(), format!("({} camera)", lens).dimmed());
        }
        (_, CaptureView::Still(photo)) => {
            println!(
                "{} {}",
                "[photo captured]".green(),
                truncate_string(&photo.data_uri(), 48).dimmed()
            );
        }
    }
}

/// Prints the joke or the error; nothing for idle/loading.
pub fn print_joke_view(view: JokeView<'_>) {
    match view {
        JokeView::Joke(joke) => {
            println!("\n{}\n", joke.bold());
        }
        JokeView::Error(message) => {
            eprintln!("\n{} {}\n", "Could not get a joke:".red(), message);
        }
        JokeView::Loading | JokeView::Idle => {}
    }
}

/// Spinner shown while a joke request is outstanding.
const SPINNER_TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "-"];

pub fn loading_spinner() -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")?
            .tick_strings(SPINNER_TICKS),
    );
    pb.set_message("Loading...");
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}
