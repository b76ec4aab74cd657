use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ArchiveError, Result};
use crate::models::Talk;

// Conference links end in /<year>/<period>, e.g. /general-conference/1971/04?lang=eng
static CONFERENCE_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|/)(?P<year>\d{4})/(?P<period>\d{2})/?$").unwrap()
});

// Titles carry "!&()*,-.:;?[] —’“”…" and non-breaking spaces; keep only the plain ones.
static DISALLOWED_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9 ,-]").unwrap());

const TEXT_EXTENSION: &str = "txt";

/// Year and period of a conference, rendered as `YYYY_PP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConferenceDir {
    pub year: i32,
    pub period: u32,
}

impl fmt::Display for ConferenceDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}_{:02}", self.year, self.period)
    }
}

pub fn derive_conference_dir(href: &str) -> Result<ConferenceDir> {
    let malformed = || ArchiveError::MalformedConferenceUrl(href.to_string());

    let path = href.split(['?', '#']).next().unwrap_or(href);
    let caps = CONFERENCE_PATH_RE.captures(path).ok_or_else(malformed)?;

    Ok(ConferenceDir {
        year: caps["year"].parse().map_err(|_| malformed())?,
        period: caps["period"].parse().map_err(|_| malformed())?,
    })
}

/// Strip everything outside `[A-Za-z0-9 ,-]`. May return an empty string.
pub fn sanitize_file_name(title: &str) -> String {
    DISALLOWED_FILENAME_CHARS.replace_all(title, "").into_owned()
}

/// `<root>/<conference_dir>/<session_title>`, always inside `root`.
///
/// Both names are used verbatim except for root, drive, `.` and `..`
/// components, which are dropped.
pub fn session_dir(root: &Path, conference_dir: &str, session_title: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    path.extend(contained(conference_dir));
    path.extend(contained(session_title));
    path
}

/// `<root>/<conference_dir>/<session_title>/<sanitized title>.txt`
pub fn talk_path(root: &Path, talk: &Talk) -> PathBuf {
    session_dir(root, &talk.conference_dir, &talk.session_title)
        .join(format!("{}.{}", sanitize_file_name(&talk.title), TEXT_EXTENSION))
}

fn contained(segment: &str) -> impl Iterator<Item = Component<'_>> {
    Path::new(segment)
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
}
