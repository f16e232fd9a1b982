// jokecam-cli/src/main.rs
mod camera;
mod models;
mod rendering;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use colored::*;
use dialoguer::{Select, theme::ColorfulTheme};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Level, debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, time::LocalTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use jokecam_core::{
    ApiClient, CaptureComponent, CaptureView, ClientConfig, JokeScreen, JokeView, JokecamConfig,
    LandingScreen, Navigator, PermissionState, Route, config::CONFIG_FILENAME,
    screens::JOKE_PROMPT,
};

use crate::camera::{FileCamera, PermissionPrompt};
use crate::models::cli::{Cli, Commands};
use crate::rendering::{loading_spinner, print_capture_status, print_joke_view, print_landing};

const LOG_FILE_NAME: &str = "jokecam-app.log";

/// Settings resolved from `Jokecam.toml` (if any) and the environment.
struct Settings {
    client: ClientConfig,
    prompt: String,
}

/// Walks up from `start` looking for `Jokecam.toml`.
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let config_path = dir.join(CONFIG_FILENAME);
        if config_path.is_file() {
            return Some(config_path);
        }
        current = dir.parent();
    }
    None
}

fn load_settings(start: &Path) -> Result<Settings> {
    let config = match find_config_file(start) {
        Some(config_path) => {
            info!("Found configuration file at: {:?}", config_path);
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
            JokecamConfig::from_toml_str(&content)
                .context("Failed to parse or validate configuration content")?
        }
        None => {
            debug!("No {} found; using defaults.", CONFIG_FILENAME);
            JokecamConfig::default()
        }
    };
    let prompt = config
        .joke
        .prompt
        .clone()
        .unwrap_or_else(|| JOKE_PROMPT.to_string());
    let client = config.into_client_config(|key| env::var(key).ok());
    if !client.credential.is_present() {
        warn!(
            env_var = %client.api_key_env_var,
            "No API key configured; jokes will come from the built-in fallback."
        );
    }
    Ok(Settings { client, prompt })
}

fn build_api_client(config: ClientConfig) -> Result<ApiClient> {
    let http_client = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;
    Ok(ApiClient::new(config, http_client))
}

/// Captures one photo and returns the joke (or the error) for it.
async fn tell_one_joke(
    api_client: ApiClient,
    camera: FileCamera,
    prompt: &str,
) -> Result<String> {
    let mut capture = CaptureComponent::new(camera);
    if capture.ensure_permission().await? != PermissionState::Granted {
        return Err(anyhow!("Camera permission was not granted"));
    }
    let event = capture
        .take_photo()
        .await?
        .ok_or_else(|| anyhow!("The camera did not return a picture"))?;

    let mut screen = JokeScreen::with_prompt(api_client, prompt);
    let pb = loading_spinner()?;
    let view = screen.handle(event).await;
    pb.finish_and_clear();

    match view {
        JokeView::Joke(joke) => Ok(joke.to_string()),
        JokeView::Error(message) => Err(anyhow!("Could not get a joke: {}", message)),
        other => Err(anyhow!("Joke screen ended in unexpected state: {:?}", other)),
    }
}

fn menu(prompt: &str, items: &[&str]) -> Result<usize> {
    Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()
        .context("Failed to read menu selection")
}

enum CameraAction {
    TakePhoto,
    Flip,
    Retake,
    Back,
}

/// The joke screen. A fresh capture component and screen state on every visit.
async fn run_joke_screen(api_client: &ApiClient, camera: FileCamera, prompt: &str) -> Result<()> {
    let mut capture = CaptureComponent::new(camera);
    let mut screen = JokeScreen::with_prompt(api_client.clone(), prompt);

    loop {
        if let Err(e) = capture.ensure_permission().await {
            error!("Permission request failed: {}", e);
            eprintln!("{} {}", "Error:".red(), e);
            return Ok(());
        }
        print_capture_status(capture.view(), capture.facing(), capture.permission());

        if capture.permission() == PermissionState::Denied {
            match menu("Camera", &["Grant permission", "Back"])? {
                0 => {
                    capture.request_permission_again().await?;
                    continue;
                }
                _ => return Ok(()),
            }
        }

        let action = if matches!(capture.view(), CaptureView::Still(_)) {
            match menu("Photo", &["Retake", "Back"])? {
                0 => CameraAction::Retake,
                _ => CameraAction::Back,
            }
        } else {
            match menu("Camera", &["Take photo", "Flip camera", "Back"])? {
                0 => CameraAction::TakePhoto,
                1 => CameraAction::Flip,
                _ => CameraAction::Back,
            }
        };

        match action {
            CameraAction::TakePhoto => match capture.take_photo().await {
                Ok(Some(event)) => {
                    let pb = loading_spinner()?;
                    let view = screen.handle(event).await;
                    pb.finish_and_clear();
                    print_joke_view(view);
                }
                Ok(None) => println!("{}", "No picture was taken.".yellow()),
                Err(e) => {
                    error!("Capture failed: {}", e);
                    eprintln!("{} {}", "Error:".red(), e);
                }
            },
            CameraAction::Flip => {
                capture.toggle_facing();
            }
            CameraAction::Retake => {
                let event = capture.retake();
                screen.handle(event).await;
            }
            CameraAction::Back => return Ok(()),
        }
    }
}

async fn run_interactive(api_client: ApiClient, camera: FileCamera, prompt: &str) -> Result<()> {
    let landing = LandingScreen::default();
    let mut navigator = Navigator::new();

    loop {
        match navigator.current() {
            Route::Landing => {
                print_landing(&landing);
                match menu("Menu", &[landing.link_label, "Quit"])? {
                    0 => navigator.navigate(landing.link_target),
                    _ => break,
                }
            }
            Route::Joke => {
                run_joke_screen(&api_client, camera.clone(), prompt).await?;
                navigator.back();
            }
        }
    }

    println!("{}", "Bye.".cyan());
    Ok(())
}

fn init_logging(verbose: u8) -> Result<(WorkerGuard, Level, PathBuf)> {
    let default_level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(default_level.into()));

    let log_dir = dirs::cache_dir()
        .or_else(dirs::runtime_dir)
        .unwrap_or_else(env::temp_dir)
        .join("jokecam");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&log_dir, LOG_FILE_NAME);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let time_format_desc = time::format_description::parse(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]",
    )
    .context("Failed to parse log time format")?;
    let local_timer = LocalTime::new(time_format_desc);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .with_timer(local_timer.clone());

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_timer(local_timer)
        .with_target(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok((guard, default_level, log_dir.join(LOG_FILE_NAME)))
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // --- Logging Setup ---
    let _guard = match init_logging(cli.verbose) {
        Ok((guard, level, log_path)) => {
            info!(
                "Logging initialized. Level determined by RUST_LOG or -v flags (default: {}). Logging to stderr and {}",
                level,
                log_path.display()
            );
            guard
        }
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            return ExitCode::FAILURE;
        }
    };

    // --- Load Config ---
    let current_dir = match env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{} Failed to get current directory: {}", "Error:".red(), e);
            return ExitCode::FAILURE;
        }
    };
    let settings = match load_settings(&current_dir) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            eprintln!("{} Could not load '{}': {:#}", "Error:".red(), CONFIG_FILENAME, e);
            return ExitCode::FAILURE;
        }
    };

    let result = run(cli, settings).await;

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Operation failed: {:#}", e);
            eprintln!("{} {:#}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, settings: Settings) -> Result<()> {
    let back = cli
        .photo
        .clone()
        .ok_or_else(|| anyhow!("--photo <PATH> is required: it is what the camera sees"))?;
    let api_client = build_api_client(settings.client)?;

    match cli.command {
        Some(Commands::Joke) => {
            let camera = FileCamera::new(back, cli.front_photo, PermissionPrompt::AutoGrant);
            let joke = tell_one_joke(api_client, camera, &settings.prompt).await?;
            println!("{}", joke);
            Ok(())
        }
        None => {
            let prompt = if cli.yes {
                PermissionPrompt::AutoGrant
            } else {
                PermissionPrompt::Ask
            };
            let camera = FileCamera::new(back, cli.front_photo, prompt);
            run_interactive(api_client, camera, &settings.prompt).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use jokecam_core::models::chat::FALLBACK_JOKE;
    use serde_json::json;
    use tempfile::tempdir;

    const JPEG_BYTES: [u8; 6] = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

    fn write_photo(dir: &Path) -> PathBuf {
        let path = dir.join("photo.jpg");
        fs::write(&path, JPEG_BYTES).unwrap();
        path
    }

    #[test]
    fn test_find_config_file_walks_up() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "[api]\n").unwrap();

        let found = find_config_file(&nested).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILENAME));
    }

    #[test]
    fn test_load_settings_reads_prompt() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            "[api]\napi_key_env_var = \"JOKECAM_TEST_KEY_THAT_IS_NOT_SET\"\n[joke]\nprompt = \"Pun only.\"\n",
        )
        .unwrap();

        let settings = load_settings(dir.path()).unwrap();
        assert_eq!(settings.prompt, "Pun only.");
        assert_eq!(settings.client.api_key_env_var, "JOKECAM_TEST_KEY_THAT_IS_NOT_SET");
        assert!(!settings.client.credential.is_present());
    }

    #[test]
    fn test_load_settings_rejects_invalid_config() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "[api]\nmax_tokens = 0\n").unwrap();
        assert!(load_settings(dir.path()).is_err());
    }

    #[tokio::test]
    async fn test_one_shot_without_key_uses_fallback() {
        let dir = tempdir().unwrap();
        let camera = FileCamera::new(write_photo(dir.path()), None, PermissionPrompt::AutoGrant);
        let api_client = build_api_client(ClientConfig::default()).unwrap();

        let joke = tell_one_joke(api_client, camera, JOKE_PROMPT).await.unwrap();
        assert_eq!(joke, FALLBACK_JOKE);
    }

    #[tokio::test]
    async fn test_one_shot_against_mock_api() {
        let dir = tempdir().unwrap();
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/messages")
                    .header("x-api-key", "sk-test")
                    .body_contains("/9j/4AAQ");
                then.status(200).json_body(json!({
                    "id": "msg_1",
                    "type": "message",
                    "role": "assistant",
                    "model": "claude-3-5-sonnet-20241022",
                    "content": [{"type": "text", "text": "That is a photo. 😂"}],
                    "stop_reason": "end_turn",
                    "stop_sequence": null,
                    "usage": {"input_tokens": 1, "output_tokens": 1}
                }));
            })
            .await;

        let config = ClientConfig::default()
            .with_endpoint(server.url("/v1/messages"))
            .with_credential("sk-test");
        let camera = FileCamera::new(write_photo(dir.path()), None, PermissionPrompt::AutoGrant);
        let joke = tell_one_joke(build_api_client(config).unwrap(), camera, JOKE_PROMPT)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(joke, "That is a photo. 😂");
    }

    #[tokio::test]
    async fn test_one_shot_reports_api_error() {
        let dir = tempdir().unwrap();
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/messages");
                then.status(500);
            })
            .await;

        let config = ClientConfig::default()
            .with_endpoint(server.url("/v1/messages"))
            .with_credential("sk-test");
        let camera = FileCamera::new(write_photo(dir.path()), None, PermissionPrompt::AutoGrant);
        let err = tell_one_joke(build_api_client(config).unwrap(), camera, JOKE_PROMPT)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"), "unexpected error: {}", err);
    }
}
