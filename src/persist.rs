use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ArchiveError, Result};
use crate::fetch::PageFetcher;
use crate::models::Talk;
use crate::parser::article::article_text;
use crate::paths::talk_path;

/// Saves one talk somewhere. Errors are returned, never retried here.
#[async_trait]
pub trait Persist: Send + Sync {
    async fn persist(&self, talk: &Talk) -> Result<PathBuf>;
}

/// Fetches a talk's detail page and writes its article text under `output_root`.
pub struct TalkWriter {
    fetcher: Arc<PageFetcher>,
    output_root: PathBuf,
}

impl TalkWriter {
    pub fn new(fetcher: Arc<PageFetcher>, output_root: PathBuf) -> Self {
        Self {
            fetcher,
            output_root,
        }
    }
}

#[async_trait]
impl Persist for TalkWriter {
    async fn persist(&self, talk: &Talk) -> Result<PathBuf> {
        let url = self.fetcher.absolute_url(&talk.link)?;
        let body = self.fetcher.fetch_text(url.as_str()).await?;
        let text = article_text(&body, url.as_str())?;

        let path = talk_path(&self.output_root, talk);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ArchiveError::io(parent, e))?;
        }
        tokio::fs::write(&path, text)
            .await
            .map_err(|e| ArchiveError::io(&path, e))?;

        debug!("wrote {}", path.display());
        Ok(path)
    }
}
