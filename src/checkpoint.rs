use std::path::Path;

use tokio::fs;
use tracing::info;

use crate::error::{ArchiveError, Result};
use crate::models::Talk;

/// Snapshot the full talk list before any text is fetched.
pub async fn write_checkpoint(path: &Path, talks: &[Talk]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ArchiveError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(talks)
        .map_err(|e| ArchiveError::Parse(format!("encoding checkpoint: {}", e)))?;
    fs::write(path, json)
        .await
        .map_err(|e| ArchiveError::io(path, e))?;
    info!("Wrote {} talks to {}", talks.len(), path.display());
    Ok(())
}

pub async fn read_checkpoint(path: &Path) -> Result<Vec<Talk>> {
    let json = fs::read_to_string(path)
        .await
        .map_err(|e| ArchiveError::io(path, e))?;
    serde_json::from_str(&json)
        .map_err(|e| ArchiveError::Parse(format!("checkpoint {}: {}", path.display(), e)))
}
