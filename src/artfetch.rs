//! Cover art cache kept in sync with the playing track.
//!
//! The [`Watcher`] runs one fetch-and-save cycle at startup and one per
//! player change event, strictly one after another. Each cycle leaves the
//! cache file holding either the current track's art or the default image.

mod art_error;
mod cache;
mod extract;
mod watcher;

pub use art_error::{ExtractionError, FallbackError, WatchError};
pub use cache::{ArtCache, ArtOutcome};
pub use extract::{ArtExtractor, extractor_for};
pub use watcher::{WatchEvent, Watcher};

#[cfg(test)]
mod tests;
