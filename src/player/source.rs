use std::path::PathBuf;

use crate::config::{SourceBackend, SourceSettings};

use super::SourceError;
use super::model::Snapshot;
use super::mpd::{MpdFeed, MpdSource};
use super::mpris::{MprisFeed, MprisSource};

/// Produces a fresh [`Snapshot`] on demand.
pub trait PlayerSource {
    fn snapshot(&mut self) -> Result<Snapshot, SourceError>;
}

/// Resolves the media file of the currently playing track.
///
/// `Ok(None)` means the player is reachable but has no local file to offer
/// (stopped, streaming, or an unresolvable location).
pub trait TrackLocator {
    fn current_location(&mut self) -> Result<Option<PathBuf>, SourceError>;
}

impl<T: TrackLocator + ?Sized> TrackLocator for Box<T> {
    fn current_location(&mut self) -> Result<Option<PathBuf>, SourceError> {
        (**self).current_location()
    }
}

/// Unblocks a pending [`ChangeFeed::wait_for_change`] from another thread,
/// which then returns an error.
pub type FeedStopper = Box<dyn FnOnce() + Send>;

/// Blocking feed of player-state change notifications.
pub trait ChangeFeed: Send {
    /// Block until the player reports a relevant change.
    fn wait_for_change(&mut self) -> Result<(), SourceError>;

    /// Interrupt handle for a blocked wait. `None` when the backend cannot be
    /// interrupted; such a feed is released when the process exits.
    fn stopper(&self) -> Option<FeedStopper> {
        None
    }
}

/// Build the configured snapshot source. Connections are opened lazily,
/// once per call.
pub fn player_source(settings: &SourceSettings) -> Box<dyn PlayerSource> {
    match settings.backend {
        SourceBackend::Mpd => Box::new(MpdSource::new(&settings.mpd_address, None)),
        SourceBackend::Mpris => Box::new(MprisSource::new(&settings.mpris_player)),
    }
}

/// Build the configured track locator. MPD paths are relative to
/// `library_dir`.
pub fn track_locator(
    settings: &SourceSettings,
    library_dir: Option<PathBuf>,
) -> Box<dyn TrackLocator + Send> {
    match settings.backend {
        SourceBackend::Mpd => Box::new(MpdSource::new(&settings.mpd_address, library_dir)),
        SourceBackend::Mpris => Box::new(MprisSource::new(&settings.mpris_player)),
    }
}

/// Connect the configured change feed. Fails if the player is unreachable.
pub fn change_feed(settings: &SourceSettings) -> Result<Box<dyn ChangeFeed>, SourceError> {
    match settings.backend {
        SourceBackend::Mpd => Ok(Box::new(MpdFeed::connect(&settings.mpd_address)?)),
        SourceBackend::Mpris => Ok(Box::new(MprisFeed::connect(&settings.mpris_player)?)),
    }
}
