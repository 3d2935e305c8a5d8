//! Birthday Bot - Main Entry Point
//!
//! Congratulates everyone whose birthday is today, then exits.
//! Meant to be run once a day by cron or a CI schedule.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use birthday_bot::celebration::{self, RunReport};
use birthday_bot::config::{BIRTHDAY_DATE_FORMAT, BotSettings, FileDataSource};
use birthday_bot::telegram::BotApiClient;

/// Sends birthday congratulations to a Telegram chat.
#[derive(Parser, Debug)]
#[command(name = "birthday_bot")]
#[command(about = "Congratulate today's birthdays in a Telegram chat")]
#[command(version)]
struct Args {
    /// Path to the birthdays JSON file [default: data/birthdays.json or $BIRTHDAYS_PATH].
    #[arg(short, long)]
    birthdays: Option<PathBuf>,

    /// Path to the message templates JSON file [default: data/messages.json or $MESSAGES_PATH].
    #[arg(short, long)]
    messages: Option<PathBuf>,

    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Treat this date (YYYY-MM-DD) as today.
    #[arg(short, long, value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// Exit with a failure status if any message could not be delivered.
    #[arg(long)]
    strict: bool,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, BIRTHDAY_DATE_FORMAT)
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    let settings = BotSettings::from_env_with_defaults();
    let source = FileDataSource::new(
        args.birthdays.unwrap_or(settings.birthdays_path),
        args.messages.unwrap_or(settings.messages_path),
    );

    let today = args.date.unwrap_or_else(|| Local::now().date_naive());
    info!("Checking birthdays for {}", today);

    let mut rng = StdRng::from_entropy();

    let report = celebration::run(
        |key| std::env::var(key).ok(),
        &source,
        BotApiClient::new,
        today,
        &mut rng,
    )
    .await
    .context("Birthday run failed")?;

    print_report(&report);

    if args.strict && !report.all_delivered() {
        error!("{} message(s) could not be delivered", report.failed.len());
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn print_report(report: &RunReport) {
    println!("{}", report.to_string().trim_end());
}
