use std::sync::mpsc::Receiver;

use tracing::{debug, error, info};

use crate::player::{SourceError, TrackLocator};

use super::{ArtCache, ArtExtractor, ArtOutcome, WatchError};

/// Messages delivered to the watcher, in arrival order.
#[derive(Debug)]
pub enum WatchEvent {
    /// The player reported a state change.
    Changed,
    /// The change feed failed and could not be re-established.
    FeedLost(SourceError),
    /// Stop after the current cycle.
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Idle,
    Watching,
    Fetching,
    Stopped,
}

/// Sequential consumer of [`WatchEvent`]s that keeps the art cache current.
pub struct Watcher<L, X> {
    locator: L,
    extractor: X,
    cache: ArtCache,
    state: WatcherState,
    cycles: u64,
}

impl<L, X> Watcher<L, X>
where
    L: TrackLocator,
    X: ArtExtractor,
{
    pub fn new(locator: L, extractor: X, cache: ArtCache) -> Self {
        Self {
            locator,
            extractor,
            cache,
            state: WatcherState::Idle,
            cycles: 0,
        }
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    /// Completed fetch-and-save cycles, including the startup one.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run the startup cycle, then one cycle per `Changed` event until a
    /// `Shutdown` arrives. Events queue in the channel while a cycle runs.
    pub fn run(&mut self, events: Receiver<WatchEvent>) -> Result<(), WatchError> {
        self.state = WatcherState::Watching;
        info!(cache = %self.cache.cache_path().display(), "watching for track changes");
        self.cycle();

        let result = loop {
            match events.recv() {
                Ok(WatchEvent::Changed) => self.cycle(),
                Ok(WatchEvent::Shutdown) => {
                    info!("shutdown requested");
                    break Ok(());
                }
                Ok(WatchEvent::FeedLost(e)) => {
                    error!("giving up on the player: {e}");
                    break Err(WatchError::FeedLost(e));
                }
                Err(_) => break Err(WatchError::ChannelClosed),
            }
        };

        self.state = WatcherState::Stopped;
        result
    }

    /// One fetch-and-save cycle. Failures are logged and never stop the
    /// watcher.
    fn cycle(&mut self) {
        self.state = WatcherState::Fetching;
        match self.cache.fetch_and_save(&mut self.locator, &self.extractor) {
            Ok(ArtOutcome::Extracted) => debug!("cycle {} saved track art", self.cycles + 1),
            Ok(ArtOutcome::Fallback) => debug!("cycle {} used the default image", self.cycles + 1),
            Err(e) => error!("save art error: {e}"),
        }
        self.cycles += 1;
        self.state = WatcherState::Watching;
    }
}
