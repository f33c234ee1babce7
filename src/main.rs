use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mailpulse::application::ml::{HistoricalAverageModel, PredictionService};
use mailpulse::application::monitoring::performance_tracker::PerformanceTracker;
use mailpulse::config::Config;
use mailpulse::domain::performance::prediction_record::{PredictionType, format_timestamp};
use mailpulse::domain::repositories::PredictionLogRepository;
use mailpulse::infrastructure::persistence::CsvPredictionLog;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, debug};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Email engagement prediction log and accuracy metrics",
    long_about = None
)]
struct Args {
    /// Path to the prediction log CSV (overrides PREDICTION_LOG_PATH)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the prediction log if it does not exist yet
    Init,

    /// Record a prediction and print its timestamp
    Log {
        /// send_time or subject_line
        #[arg(long)]
        prediction_type: PredictionType,
        /// Description of the request that produced the prediction
        #[arg(long)]
        input: String,
        #[arg(long)]
        predicted_opens: f64,
        #[arg(long)]
        predicted_clicks: f64,
    },

    /// Attach actual results to a logged prediction
    Actual {
        /// Timestamp printed by `log`
        #[arg(long)]
        timestamp: String,
        #[arg(long)]
        actual_opens: f64,
        #[arg(long)]
        actual_clicks: f64,
    },

    /// Print aggregate accuracy over completed predictions
    Metrics,

    /// Print the most recent predictions, newest first
    History {
        /// Number of rows (defaults to HISTORY_LIMIT)
        #[arg(long)]
        limit: Option<usize>,
        /// Print the columnar chart view instead of full records
        #[arg(long)]
        chart: bool,
    },

    /// Predict engagement with the historical-average model and log it
    Predict {
        #[command(subcommand)]
        target: PredictTarget,
    },
}

#[derive(Subcommand, Debug)]
enum PredictTarget {
    /// Engagement for a send slot
    SendTime {
        /// Hour of day, 0-23
        #[arg(long)]
        hour: u32,
        /// Day of week, 0 = Monday
        #[arg(long)]
        day: u32,
    },

    /// Engagement for a subject line
    SubjectLine {
        #[arg(long)]
        subject: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays machine-readable
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with(stderr_layer)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;
    let log_path = args.log_file.unwrap_or(config.prediction_log_path);
    debug!("Using prediction log {:?}", log_path);

    let log = CsvPredictionLog::initialize(&log_path)
        .with_context(|| format!("Failed to initialize prediction log {:?}", log_path))?;
    let log: Arc<dyn PredictionLogRepository> = Arc::new(log);
    let tracker = Arc::new(PerformanceTracker::new(log.clone()));

    match args.command {
        Command::Init => print_json(&json!({ "log_file": log_path }))?,
        Command::Log {
            prediction_type,
            input,
            predicted_opens,
            predicted_clicks,
        } => {
            let timestamp = tracker.log_prediction(
                prediction_type,
                &input,
                predicted_opens,
                predicted_clicks,
            )?;
            print_json(&json!({ "timestamp": format_timestamp(&timestamp) }))?;
        }
        Command::Actual {
            timestamp,
            actual_opens,
            actual_clicks,
        } => {
            let outcome = tracker.log_actual_results_at(&timestamp, actual_opens, actual_clicks)?;
            print_json(&outcome)?;
        }
        Command::Metrics => print_json(&tracker.get_performance_metrics()?)?,
        Command::History { limit, chart } => {
            let limit = limit.unwrap_or(config.history_limit);
            if chart {
                print_json(&tracker.get_prediction_history(limit)?)?;
            } else {
                print_json(&tracker.get_recent_predictions(limit)?)?;
            }
        }
        Command::Predict { target } => {
            let service = PredictionService::new(
                Arc::new(HistoricalAverageModel::new(
                    PredictionType::SendTime,
                    log.clone(),
                )),
                Arc::new(HistoricalAverageModel::new(
                    PredictionType::SubjectLine,
                    log.clone(),
                )),
                tracker.clone(),
            );
            let outcome = match target {
                PredictTarget::SendTime { hour, day } => service.predict_send_time(hour, day)?,
                PredictTarget::SubjectLine { subject } => {
                    service.recommend_subject_line(&subject)?
                }
            };
            print_json(&outcome)?;
        }
    }

    Ok(())
}
