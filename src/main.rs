use add_events_core::time::parse_timezone;
use add_events_core::{submit_all, CalendarConfig, CredentialProvider, TimeContext};
use add_events_google::{AuthPaths, GoogleCredentialProvider, GoogleEventSink};
use anyhow::{Context, Result};
use chrono_tz::Tz;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "add-events")]
#[command(about = "Create the events described in a calendar YAML file on Google Calendar")]
struct Cli {
    /// Calendar YAML file (defaults + chunks of events)
    calendar_yaml: PathBuf,

    /// IANA timezone for timed events
    #[arg(long, default_value = "America/New_York", value_parser = parse_timezone)]
    timezone: Tz,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    let config = CalendarConfig::load(&cli.calendar_yaml)
        .with_context(|| format!("Failed to load {}", cli.calendar_yaml.display()))?;
    info!(events = config.event_count(), "Loaded calendar config");

    let credential = GoogleCredentialProvider::new(AuthPaths::from_env())
        .acquire()
        .await
        .context("Failed to authorize with Google Calendar")?;

    let sink = GoogleEventSink::new(credential);
    let time = TimeContext::current(cli.timezone);

    let mut stdout = std::io::stdout().lock();
    let summary = submit_all(&sink, &config, &time, &mut stdout).await?;

    writeln!(
        stdout,
        "Total: {} created, {} failed",
        summary.created,
        summary.failures.len()
    )?;

    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
