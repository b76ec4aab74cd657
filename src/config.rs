use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;

pub const DEFAULT_BASE_URL: &str = "https://www.churchofjesuschrist.org";
pub const DEFAULT_LANGUAGE: &str = "eng";
pub const DEFAULT_CHECKPOINT: &str = "tmp/talks-list.json";
pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const CONFIG_FILE: &str = "conference_archive";
const ENV_PREFIX: &str = "GC";
const DOWNLOAD_DIR: &str = "conferences";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub language: String,
    pub output_dir: PathBuf,
    pub checkpoint_path: PathBuf,
    pub concurrency: usize,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Settings {
    /// Defaults, then `conference_archive.toml` if present, then `GC_*` env vars.
    pub fn load() -> Result<Self> {
        let mut settings: Settings = Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("language", DEFAULT_LANGUAGE)?
            .set_default("output_dir", default_output_dir())?
            .set_default("checkpoint_path", DEFAULT_CHECKPOINT)?
            .set_default("concurrency", DEFAULT_CONCURRENCY as u64)?
            .set_default("request_timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("user_agent", default_user_agent())?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        settings.concurrency = settings.concurrency.max(1);
        Ok(settings)
    }

    /// Settings pointing at `base_url` with every other key at its default,
    /// ignoring config files and the environment.
    ///
    /// For embedding and tests against a local mirror; the binary uses [`Settings::load`].
    pub fn with_base_url(base_url: &str, output_dir: PathBuf) -> Self {
        Settings {
            base_url: base_url.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            checkpoint_path: output_dir.join(DEFAULT_CHECKPOINT),
            output_dir,
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }

    pub fn index_url(&self) -> String {
        format!(
            "{}/general-conference/conferences?lang={}",
            self.base_url.trim_end_matches('/'),
            self.language
        )
    }
}

fn default_output_dir() -> String {
    dirs::home_dir()
        .map(|home| home.join(DOWNLOAD_DIR))
        .unwrap_or_else(|| PathBuf::from(DOWNLOAD_DIR))
        .to_string_lossy()
        .into_owned()
}

fn default_user_agent() -> String {
    format!("conference_archive/{}", env!("CARGO_PKG_VERSION"))
}
