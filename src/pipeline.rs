//! Run orchestration: discover talks, checkpoint them, then save every talk
//! with exactly one retry pass over the failures.
//!
//! Conference scouting and talk saving fan out over a `JoinSet` capped by a
//! semaphore. Results come back tagged with their input index, so every list
//! in the reports stays in discovery order no matter which request finished
//! first. Dropping a run aborts whatever is still in flight.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::checkpoint::{read_checkpoint, write_checkpoint};
use crate::config::Settings;
use crate::error::{ArchiveError, Result};
use crate::fetch::PageFetcher;
use crate::models::Talk;
use crate::parser::conference::parse_conference_page;
use crate::parser::index::list_conferences;
use crate::paths::{derive_conference_dir, session_dir, ConferenceDir};
use crate::persist::{Persist, TalkWriter};
use crate::presidents::presiding_at;

/// A talk that could not be saved, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub talk: Talk,
    pub error: String,
}

/// A conference whose talks could not be discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryFailure {
    pub conference: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct DiscoveryReport {
    pub talks: Vec<Talk>,
    pub failures: Vec<DiscoveryFailure>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PassOutcome {
    pub saved: usize,
    pub failures: Vec<Failure>,
}

#[derive(Debug, Default)]
pub struct RetryReport {
    pub attempted: usize,
    pub first_pass: PassOutcome,
    pub retry_pass: PassOutcome,
}

impl RetryReport {
    /// Talks still missing after the retry pass.
    pub fn final_failures(&self) -> &[Failure] {
        &self.retry_pass.failures
    }

    pub fn saved(&self) -> usize {
        self.first_pass.saved + self.retry_pass.saved
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub discovery_failures: Vec<DiscoveryFailure>,
    pub retry: RetryReport,
}

/// Full pipeline: discover, checkpoint, save, retry once.
pub async fn run(settings: &Settings) -> Result<RunReport> {
    let fetcher = Arc::new(PageFetcher::new(settings)?);
    let discovery = scout_with(Arc::clone(&fetcher), settings).await?;

    let persister: Arc<dyn Persist> =
        Arc::new(TalkWriter::new(fetcher, settings.output_dir.clone()));
    let retry = persist_with_retry(persister, discovery.talks, settings.concurrency).await;

    Ok(RunReport {
        discovery_failures: discovery.failures,
        retry,
    })
}

/// Discovery only; leaves the checkpoint behind for a later `download`.
pub async fn scout(settings: &Settings) -> Result<DiscoveryReport> {
    let fetcher = Arc::new(PageFetcher::new(settings)?);
    scout_with(fetcher, settings).await
}

/// Save every talk listed in an existing checkpoint.
pub async fn download(settings: &Settings, checkpoint: &Path) -> Result<RetryReport> {
    let talks = read_checkpoint(checkpoint).await?;
    info!("Loaded {} talks from {}", talks.len(), checkpoint.display());

    let fetcher = Arc::new(PageFetcher::new(settings)?);
    let persister: Arc<dyn Persist> =
        Arc::new(TalkWriter::new(fetcher, settings.output_dir.clone()));
    Ok(persist_with_retry(persister, talks, settings.concurrency).await)
}

async fn scout_with(fetcher: Arc<PageFetcher>, settings: &Settings) -> Result<DiscoveryReport> {
    let discovery = discover(fetcher, settings).await?;
    write_checkpoint(&settings.checkpoint_path, &discovery.talks).await?;
    Ok(discovery)
}

/// Steps 1-3: list conferences, create their directories, collect every talk.
///
/// Only the index page is fatal. A conference with an unexpected URL or page
/// layout is recorded in the report and the rest carry on.
pub async fn discover(fetcher: Arc<PageFetcher>, settings: &Settings) -> Result<DiscoveryReport> {
    let links = list_conferences(&fetcher, &settings.index_url()).await?;

    let mut failures = Vec::new();
    let mut conferences = Vec::with_capacity(links.len());
    for href in links {
        match derive_conference_dir(&href) {
            Ok(dir) => conferences.push((href, dir)),
            Err(e) => {
                warn!("skipping conference: {}", e);
                failures.push(DiscoveryFailure {
                    conference: href,
                    error: e.to_string(),
                });
            }
        }
    }

    ensure_conference_dirs(&settings.output_dir, conferences.iter().map(|(_, dir)| dir)).await?;

    let progress = progress_bar(conferences.len(), "scouting");
    let root = settings.output_dir.clone();
    let results = fan_out(
        conferences.clone(),
        settings.concurrency,
        &progress,
        move |(href, dir)| {
            let fetcher = Arc::clone(&fetcher);
            let root = root.clone();
            async move { scout_conference(&fetcher, &root, &href, &dir).await }
        },
    )
    .await;
    progress.finish_and_clear();

    let mut talks = Vec::new();
    for ((href, dir), result) in conferences.into_iter().zip(results) {
        match result {
            Some(Ok(found)) => {
                let president = presiding_at(dir.year, dir.period).map_or("unknown", |p| p.name);
                info!(conference = %dir, president, talks = found.len(), "scouted");
                talks.extend(found);
            }
            Some(Err(e)) => {
                warn!("failed to scout {}: {}", href, e);
                failures.push(DiscoveryFailure {
                    conference: href,
                    error: e.to_string(),
                });
            }
            None => failures.push(DiscoveryFailure {
                conference: href,
                error: "scouting task aborted".to_string(),
            }),
        }
    }

    info!(
        "Discovered {} talks ({} conferences failed)",
        talks.len(),
        failures.len()
    );
    Ok(DiscoveryReport { talks, failures })
}

/// Create `<root>/<dir>` for every conference. Existing directories are fine.
pub async fn ensure_conference_dirs<'a>(
    root: &Path,
    dirs: impl IntoIterator<Item = &'a ConferenceDir>,
) -> Result<()> {
    for dir in dirs {
        let path = root.join(dir.to_string());
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| ArchiveError::io(&path, e))?;
    }
    Ok(())
}

/// Fetch one conference page, create its session directories, return its talks.
pub async fn scout_conference(
    fetcher: &PageFetcher,
    root: &Path,
    href: &str,
    dir: &ConferenceDir,
) -> Result<Vec<Talk>> {
    let url = fetcher.absolute_url(href)?;
    let body = fetcher.fetch_text(url.as_str()).await?;
    let sessions = parse_conference_page(&body, url.as_str(), dir)?;

    for session in &sessions {
        let path = session_dir(root, &dir.to_string(), &session.title);
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| ArchiveError::io(&path, e))?;
    }

    Ok(sessions.into_iter().flat_map(|s| s.talks).collect())
}

/// Pass 1 over every talk, then a single pass over whatever failed.
pub async fn persist_with_retry(
    persister: Arc<dyn Persist>,
    talks: Vec<Talk>,
    concurrency: usize,
) -> RetryReport {
    let attempted = talks.len();

    let first_pass = run_pass(Arc::clone(&persister), talks, concurrency, "pass 1").await;
    report_failures("failed to fetch these talks", &first_pass.failures);

    let retry: Vec<Talk> = first_pass.failures.iter().map(|f| f.talk.clone()).collect();
    info!("trying refetch of {} talks", retry.len());
    let retry_pass = run_pass(persister, retry, concurrency, "retry").await;
    report_failures("failed to refetch these talks", &retry_pass.failures);

    RetryReport {
        attempted,
        first_pass,
        retry_pass,
    }
}

/// Attempt every talk once. Never fails; failures come back in input order.
pub async fn run_pass(
    persister: Arc<dyn Persist>,
    talks: Vec<Talk>,
    concurrency: usize,
    label: &str,
) -> PassOutcome {
    let progress = progress_bar(talks.len(), label);
    let results = fan_out(talks.clone(), concurrency, &progress, move |talk| {
        let persister = Arc::clone(&persister);
        async move { persister.persist(&talk).await }
    })
    .await;
    progress.finish_and_clear();

    talks
        .into_iter()
        .zip(results)
        .fold(PassOutcome::default(), |mut outcome, (talk, result)| {
            match result {
                Some(Ok(_)) => outcome.saved += 1,
                Some(Err(e)) => {
                    warn!("failed to save {:?} because: {}", talk.title, e);
                    outcome.failures.push(Failure {
                        talk,
                        error: e.to_string(),
                    });
                }
                None => outcome.failures.push(Failure {
                    talk,
                    error: "save task aborted".to_string(),
                }),
            }
            outcome
        })
}

fn report_failures(heading: &str, failures: &[Failure]) {
    if failures.is_empty() {
        return;
    }
    warn!("{} ({}):", heading, failures.len());
    for f in failures {
        warn!(
            "  {} / {} / {}: {}",
            f.talk.conference_dir, f.talk.session_title, f.talk.title, f.error
        );
    }
}

/// Run `task` over `inputs` with at most `concurrency` in flight.
///
/// Slot `i` of the result belongs to input `i`; `None` means the task panicked
/// or was cancelled.
async fn fan_out<T, R, F, Fut>(
    inputs: Vec<T>,
    concurrency: usize,
    progress: &ProgressBar,
    task: F,
) -> Vec<Option<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut slots: Vec<Option<R>> = inputs.iter().map(|_| None).collect();
    let mut set = JoinSet::new();

    for (idx, input) in inputs.into_iter().enumerate() {
        let sem = Arc::clone(&semaphore);
        let fut = task(input);
        set.spawn(async move {
            let _permit = sem.acquire().await;
            (idx, fut.await)
        });
    }

    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, result)) => slots[idx] = Some(result),
            Err(e) => warn!("task did not complete: {}", e),
        }
        progress.inc(1);
    }

    slots
}

fn progress_bar(len: usize, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{msg:>10} [{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    pb.set_style(style);
    pb.set_message(label.to_string());
    pb
}
