use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{Datelike, Local};
use clap::{ArgGroup, Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod category;
mod classify;
mod client;
mod config;
mod format;
mod import;
mod lenient;
mod message;
mod models;
mod performance;
mod report;
mod schedule;
mod screen;
mod subject_image;

use classify::ClassificationTable;
use client::PortalClient;
use config::PortalConfig;
use models::{PortalPayload, WeeklySchedule};
use performance::SubjectPerformance;
use screen::ErrorPolicy;

#[derive(Parser)]
#[command(name = "portal-insights")]
#[command(about = "Grade, feedback and schedule insights for the school portal", long_about = None)]
struct Cli {
    /// Path to a portal.toml configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("source")
        .args(["student", "payload"])
        .required(true)
        .multiple(false)
))]
struct PayloadSource {
    /// Fetch the portal payload for this student from the backend
    #[arg(long)]
    student: Option<String>,
    /// Read a saved portal payload JSON file instead
    #[arg(long)]
    payload: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank subjects by aggregate percentage
    Score {
        #[command(flatten)]
        source: PayloadSource,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Print the ranking as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown performance report
    Report {
        #[command(flatten)]
        source: PayloadSource,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// List recent teacher feedback, newest first
    Feedback {
        #[command(flatten)]
        source: PayloadSource,
        /// Only show one category (any spelling the backend uses)
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Compose the AI-assisted feedback message for one subject
    Message {
        #[command(flatten)]
        source: PayloadSource,
        #[arg(long)]
        subject: String,
    },
    /// Show the weekly timetable of a class
    #[command(group(
        ArgGroup::new("scope")
            .args(["class", "file"])
            .required(true)
            .multiple(false)
    ))]
    Schedule {
        #[arg(long)]
        class: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Rank subjects from a CSV of grade rows
    Import {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Print the active classification table
    Tiers,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

async fn fetch_guarded<T, F>(fetch: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: std::future::Future<Output = Result<T, client::PortalError>> + Send + 'static,
{
    let screen = screen::shared::<T>(ErrorPolicy::KeepPrevious);
    screen::spawn_fetch(&screen, fetch)
        .await
        .context("fetch task panicked")?;

    let mut state = screen::lock(&screen);
    let value = state.take_value();
    let error = state.error().map(str::to_string);
    state.unmount();

    if let Some(message) = error {
        bail!("{message}");
    }
    value.context("fetch finished without data")
}

async fn load_payload(source: &PayloadSource, config: &PortalConfig) -> anyhow::Result<PortalPayload> {
    if let Some(path) = &source.payload {
        return read_json(path);
    }

    let student = source
        .student
        .clone()
        .context("either --student or --payload is required")?;
    let client = PortalClient::new(&config.api)?;
    fetch_guarded(async move { client.fetch_portal(&student).await }).await
}

async fn load_schedule(
    class: Option<String>,
    file: Option<PathBuf>,
    config: &PortalConfig,
) -> anyhow::Result<WeeklySchedule> {
    if let Some(path) = file {
        return read_json(&path);
    }

    let class = class.context("either --class or --file is required")?;
    let client = PortalClient::new(&config.api)?;
    fetch_guarded(async move { client.fetch_schedule(&class).await }).await
}

fn print_ranking(ranked: &[SubjectPerformance], limit: usize) {
    if ranked.is_empty() {
        println!("No graded subjects found.");
        return;
    }

    println!("Top subjects by aggregate percentage:");
    for entry in ranked.iter().take(limit) {
        println!(
            "- {} ({}) {} {} across {} assessments",
            entry.subject_name,
            if entry.teacher.is_empty() { "-" } else { entry.teacher.as_str() },
            format::percentage(entry.summary.percentage),
            entry.summary.label,
            entry.graded_count
        );
    }
}

fn print_tiers(table: &ClassificationTable) {
    println!("Classification table {}:", table.version());
    for tier in table.tiers() {
        println!("- >= {:.1}: {} ({})", tier.min, tier.label, tier.color);
    }
    let fallback = table.fallback();
    println!("- otherwise: {} ({})", fallback.label, fallback.color);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = PortalConfig::load(cli.config.as_deref())?;
    let table = config.classification_table()?;
    info!(table = table.version(), api = %config.api.base_url, "configuration ready");

    match cli.command {
        Commands::Score {
            source,
            limit,
            json,
        } => {
            let payload = load_payload(&source, &config).await?;
            let ranked = performance::rank_subjects(&payload.subjects, &table);
            if json {
                println!("{}", serde_json::to_string_pretty(&ranked)?);
            } else {
                print_ranking(&ranked, limit);
            }
        }
        Commands::Report { source, out } => {
            let payload = load_payload(&source, &config).await?;
            let report = report::build_report(&payload, &table, Local::now().date_naive());
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Feedback {
            source,
            category: only,
            limit,
        } => {
            let payload = load_payload(&source, &config).await?;
            let items = report::collect_feedback(&payload);
            let wanted = only.as_deref().map(|raw| category::normalize(Some(raw)));
            let lines = report::feedback_lines(&items, wanted);

            if lines.is_empty() {
                println!("No feedback found.");
            }
            for line in lines.iter().take(limit) {
                println!("{line}");
            }
        }
        Commands::Message { source, subject } => {
            let payload = load_payload(&source, &config).await?;
            let Some(found) = payload.find_subject(&subject) else {
                bail!("subject {subject:?} is not part of this portal payload");
            };
            let composed = message::compose(&payload.student.name, found, &table);
            println!("{}", composed.text);
        }
        Commands::Schedule { class, file } => {
            let week = load_schedule(class, file, &config).await?;
            let days = schedule::group_by_day(&week);
            println!("Weekly schedule for {}:", week.class_name);
            for day in &days {
                println!("## {}", day.name());
                if day.entries.is_empty() {
                    println!("- لا توجد حصص");
                }
                for entry in &day.entries {
                    let start = entry.start_time.map(|t| t.format("%H:%M").to_string());
                    let end = entry.end_time.map(|t| t.format("%H:%M").to_string());
                    let mut line = format!(
                        "- {}-{} {}",
                        start.as_deref().unwrap_or("?"),
                        end.as_deref().unwrap_or("?"),
                        entry.subject
                    );
                    if let Some(teacher) = &entry.teacher_name {
                        line.push_str(&format!(" ({teacher})"));
                    }
                    if let Some(room) = &entry.room {
                        line.push_str(&format!(" [{room}]"));
                    }
                    println!("{line}");
                }
            }

            let now = Local::now();
            let today = format::weekday_index(now.weekday());
            match schedule::next_lesson(&week, today, now.time()) {
                Some(next) => println!("Next lesson today: {}", next.subject),
                None => println!("No more lessons today."),
            }
        }
        Commands::Import { csv, limit } => {
            let subjects = import::read_grades_file(&csv)?;
            let ranked = performance::rank_subjects(&subjects, &table);
            print_ranking(&ranked, limit);
            if let Some(summary) = performance::overall(&subjects, &table) {
                println!(
                    "Overall: {} {}",
                    format::percentage(summary.percentage),
                    summary.label
                );
            }
        }
        Commands::Tiers => print_tiers(&table),
    }

    Ok(())
}
