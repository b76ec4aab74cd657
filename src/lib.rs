//! Download general conference talks as plain text.
//!
//! The index page lists conferences, each conference page lists sessions and
//! talks, and each talk page carries the text in a single `article`. Talks are
//! written to `<output>/<YYYY_PP>/<session>/<title>.txt`.

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod parser;
pub mod paths;
pub mod persist;
pub mod pipeline;
pub mod presidents;

pub use error::{ArchiveError, Result};
pub use models::Talk;
