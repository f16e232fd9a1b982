use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// jokecam: snap a photo, get an awkward joke about it.
/// Starts the interactive screens by default, or tells one joke with `joke`.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase message verbosity.
    ///
    /// Specify multiple times for more verbose output:
    ///  -v:  INFO level
    ///  -vv: DEBUG level
    ///  -vvv: TRACE level (most verbose)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Image the back camera "sees".
    #[arg(short, long, global = true)]
    pub photo: Option<PathBuf>,

    /// Image the front camera "sees". Defaults to --photo.
    #[arg(long, global = true)]
    pub front_photo: Option<PathBuf>,

    /// Grant camera permission without asking.
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Tell one joke about --photo and exit.
    Joke,
}
