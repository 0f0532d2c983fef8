//! CLI entry point for the Campus platform downloader.

use anyhow::Result;
use campus_dl::{DownloadOptions, Session, SessionConfig};
use clap::Parser;
use tracing::debug;

mod cli;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    // Interactive login needs a visible browser window; everything else
    // runs headless unless asked otherwise.
    let headless = match args.command {
        Command::Login => args.headless,
        _ => true,
    };

    let config = SessionConfig {
        headless,
        ..SessionConfig::default()
    };
    let mut session = Session::new(config);

    // Logout only touches the session file, no browser needed.
    if matches!(args.command, Command::Logout) {
        session.logout().await?;
        return Ok(());
    }

    session.start().await?;
    let outcome = run(&mut session, &args).await;
    session.stop().await;
    outcome
}

async fn run(session: &mut Session, args: &Args) -> Result<()> {
    match &args.command {
        Command::Login => {
            session.login().await?;
        }
        Command::Logout => unreachable!("handled before session start"),
        Command::Fetch { url } => match campus_dl::classify(url) {
            Some(campus_dl::ContentKind::Course) => {
                let course = session.fetch_course(url).await?;
                println!("{}", serde_json::to_string_pretty(&course)?);
            }
            Some(_) => {
                let unit = session.fetch_unit(url).await?;
                println!("{}", serde_json::to_string_pretty(&unit)?);
            }
            None => anyhow::bail!("not a platform content URL: {url}"),
        },
        Command::Download {
            url,
            output,
            overwrite,
        } => {
            let options = DownloadOptions {
                output_dir: output.clone(),
                overwrite: *overwrite,
                quiet: args.quiet,
            };
            session.download(url, &options).await?;
        }
        Command::ImportCookies { path } => {
            session.set_cookies(path).await?;
        }
    }
    Ok(())
}
