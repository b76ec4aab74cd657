use serde::{Deserialize, Serialize};

/// A single talk as discovered on a conference page.
///
/// Serialized as-is into the checkpoint file, so field names are part of the
/// on-disk format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Talk {
    pub title: String,
    /// Detail page href, usually relative to the site root.
    pub link: String,
    /// Raw tile text; not trimmed.
    pub author: String,
    /// Used verbatim as a directory name.
    pub session_title: String,
    pub conference_dir: String,
}
