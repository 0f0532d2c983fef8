//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Download course content from the Campus platform.
///
/// Authenticates through a real browser session, then collects and
/// downloads videos, lectures and quizzes the account has access to.
#[derive(Parser, Debug)]
#[command(name = "campus-dl")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Run the browser without a window (login is headed unless set)
    #[arg(long)]
    pub headless: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in interactively and persist the session
    Login,

    /// Forget the persisted session
    Logout,

    /// Fetch content metadata as JSON without downloading
    Fetch {
        /// A video, lecture, quiz or course URL
        url: String,
    },

    /// Download a unit or a whole course
    Download {
        /// A video, lecture, quiz or course URL
        url: String,

        /// Directory downloads land in
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Replace files that already exist
        #[arg(long)]
        overwrite: bool,
    },

    /// Import a JSON cookie export instead of logging in
    ImportCookies {
        /// Path to the cookie export file
        path: PathBuf,
    },
}
