use std::future::Future;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use conference_archive::config::Settings;
use conference_archive::pipeline::{self, DiscoveryFailure, Failure, RetryReport};
use conference_archive::presidents::{conference_periods, presiding_at};

#[derive(Parser)]
#[command(name = "conference_archive", about = "Download general conference talks as text")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover every talk, checkpoint the list, then download all of them
    Run(Overrides),
    /// Discover every talk and write the checkpoint only
    Scout(Overrides),
    /// Download the talks listed in an existing checkpoint
    Download(Overrides),
    /// Show which president presided over each conference
    Presidents {
        #[arg(long, default_value = "1971")]
        from: i32,
        #[arg(long, default_value = "2019")]
        to: i32,
    },
}

#[derive(Args)]
struct Overrides {
    /// Root directory for downloaded talks
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Site to download from
    #[arg(long)]
    base_url: Option<String>,
    /// Requests in flight at once
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,
    /// Talk list snapshot written before downloading
    #[arg(long)]
    checkpoint: Option<PathBuf>,
}

impl Overrides {
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(output) = self.output {
            settings.output_dir = output;
        }
        if let Some(base_url) = self.base_url {
            settings.base_url = base_url;
        }
        if let Some(concurrency) = self.concurrency {
            settings.concurrency = concurrency.max(1);
        }
        if let Some(checkpoint) = self.checkpoint {
            settings.checkpoint_path = checkpoint;
        }
        settings
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match until_interrupted(execute(cli.command), tokio::signal::ctrl_c()).await {
        Some(result) => result,
        None => {
            warn!("Interrupted; in-flight downloads cancelled");
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Run `work` to completion unless `signal` fires first (`None`).
///
/// A signal listener that fails to install never cancels the work.
async fn until_interrupted<W, S>(work: W, signal: S) -> Option<W::Output>
where
    W: Future,
    S: Future<Output = std::io::Result<()>>,
{
    let interrupted = async {
        if let Err(e) = signal.await {
            warn!("Cannot listen for Ctrl-C, running uninterruptible: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        output = work => Some(output),
        _ = interrupted => None,
    }
}

async fn execute(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Run(overrides) => {
            let settings = load(overrides)?;
            info!("Downloading into {}", settings.output_dir.display());
            let report = pipeline::run(&settings).await?;
            print_discovery_failures(&report.discovery_failures);
            print_retry_report(&report.retry);
        }
        Commands::Scout(overrides) => {
            let settings = load(overrides)?;
            let report = pipeline::scout(&settings).await?;
            print_discovery_failures(&report.failures);
            println!(
                "Found {} talks; list written to {}",
                report.talks.len(),
                settings.checkpoint_path.display()
            );
        }
        Commands::Download(overrides) => {
            let settings = load(overrides)?;
            let report = pipeline::download(&settings, &settings.checkpoint_path)
                .await
                .with_context(|| {
                    format!("Failed to download from {}", settings.checkpoint_path.display())
                })?;
            print_retry_report(&report);
        }
        Commands::Presidents { from, to } => {
            for (year, month) in conference_periods(from, to) {
                match presiding_at(year, month) {
                    Some(p) => {
                        println!("{}{:02}  {} (age {})", year, month, p.name, p.age_at(year, month))
                    }
                    None => println!("{}{:02}  N/A", year, month),
                }
            }
        }
    }
    Ok(())
}

fn load(overrides: Overrides) -> anyhow::Result<Settings> {
    let settings = Settings::load().context("Failed to load settings")?;
    Ok(overrides.apply(settings))
}

fn print_discovery_failures(failures: &[DiscoveryFailure]) {
    if failures.is_empty() {
        return;
    }
    println!("Could not scout {} conferences:", failures.len());
    for f in failures {
        println!("  {}: {}", f.conference, f.error);
    }
}

fn print_retry_report(report: &RetryReport) {
    println!(
        "Saved {} of {} talks ({} needed a retry).",
        report.saved(),
        report.attempted,
        report.first_pass.failures.len()
    );
    let remaining = report.final_failures();
    if remaining.is_empty() {
        return;
    }
    println!("Failed to refetch these talks:");
    for Failure { talk, error } in remaining {
        println!(
            "  {}/{}/{} ({}): {}",
            talk.conference_dir, talk.session_title, talk.title, talk.link, error
        );
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn failed_signal_listener_does_not_cancel() {
        let work = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            7
        };
        let broken = async { Err(std::io::Error::other("no signal driver")) };
        assert_eq!(until_interrupted(work, broken).await, Some(7));
    }

    #[tokio::test]
    async fn delivered_signal_cancels() {
        let work = std::future::pending::<()>();
        let ctrl_c = async { Ok(()) };
        assert_eq!(until_interrupted(work, ctrl_c).await, None);
    }
}
