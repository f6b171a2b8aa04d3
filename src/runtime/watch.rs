use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::artfetch::{ArtCache, WatchError, WatchEvent, Watcher, extractor_for};
use crate::config::Settings;
use crate::player::{self, ChangeFeed, FeedStopper, SourceError};

use super::signals::SignalHandler;

/// Run the art watcher until a termination signal arrives.
///
/// `library_dir` overrides `art.library_dir`. Failing to reach the player
/// here is fatal.
pub fn run(settings: &Settings, library_dir: Option<PathBuf>) -> Result<(), WatchError> {
    let feed = player::change_feed(&settings.source).map_err(WatchError::Startup)?;
    info!(backend = ?settings.source.backend, "connected to player");

    let library_dir = library_dir.or_else(|| settings.art.library_dir.clone());
    let locator = player::track_locator(&settings.source, library_dir);
    let extractor = extractor_for(&settings.art);
    let cache = ArtCache::from_settings(&settings.art);

    let (tx, rx) = mpsc::channel::<WatchEvent>();
    let signals = SignalHandler::start(tx.clone()).map_err(WatchError::Setup)?;

    let source_settings = settings.source.clone();
    let pump = spawn_feed_pump(feed, move || player::change_feed(&source_settings), tx)
        .map_err(WatchError::Setup)?;

    let mut watcher = Watcher::new(locator, extractor, cache);
    let result = watcher.run(rx);
    signals.close();
    pump.stop();
    info!(cycles = watcher.cycles(), state = ?watcher.state(), "watcher stopped");
    result
}

/// Background thread forwarding change notifications to the watcher.
pub(super) struct FeedPump {
    control: Arc<PumpControl>,
    thread: JoinHandle<()>,
}

impl FeedPump {
    /// Interrupt the feed and wait for the thread. A feed without a stopper
    /// stays blocked and is left to the process exit.
    pub fn stop(self) {
        if self.control.stop() || self.thread.is_finished() {
            let _ = self.thread.join();
        } else {
            debug!("change feed cannot be interrupted, leaving it to process exit");
        }
    }

    #[cfg(test)]
    pub fn join(self) -> thread::Result<()> {
        self.thread.join()
    }
}

#[derive(Default)]
struct PumpControl {
    stopping: AtomicBool,
    stopper: Mutex<Option<FeedStopper>>,
}

impl PumpControl {
    /// Remember how to interrupt the feed now in use.
    fn install(&self, feed: &dyn ChangeFeed) {
        if let Ok(mut slot) = self.stopper.lock() {
            *slot = feed.stopper();
        }
    }

    /// Returns whether a blocked wait was interrupted.
    fn stop(&self) -> bool {
        self.stopping.store(true, Ordering::SeqCst);
        let stopper = self.stopper.lock().ok().and_then(|mut slot| slot.take());
        match stopper {
            Some(stop) => {
                stop();
                true
            }
            None => false,
        }
    }

    fn stopping(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }
}

/// Forward change notifications from `feed` into `tx` on a background
/// thread. A failed feed gets one reconnect attempt; if that fails too the
/// watcher is told via [`WatchEvent::FeedLost`].
pub(super) fn spawn_feed_pump<R>(
    feed: Box<dyn ChangeFeed>,
    reconnect: R,
    tx: Sender<WatchEvent>,
) -> std::io::Result<FeedPump>
where
    R: Fn() -> Result<Box<dyn ChangeFeed>, SourceError> + Send + 'static,
{
    let control = Arc::new(PumpControl::default());
    control.install(&*feed);

    let shared = control.clone();
    let thread = thread::Builder::new()
        .name("change-feed".to_string())
        .spawn(move || pump(feed, reconnect, tx, &shared))?;

    Ok(FeedPump { control, thread })
}

fn pump<R>(
    mut feed: Box<dyn ChangeFeed>,
    reconnect: R,
    tx: Sender<WatchEvent>,
    control: &PumpControl,
) where
    R: Fn() -> Result<Box<dyn ChangeFeed>, SourceError>,
{
    loop {
        let event = match feed.wait_for_change() {
            Ok(()) => WatchEvent::Changed,
            Err(_) if control.stopping() => return,
            Err(e) => {
                warn!("change feed failed, reconnecting once: {e}");
                match reconnect() {
                    Ok(fresh) => {
                        feed = fresh;
                        control.install(&*feed);
                        if control.stopping() {
                            return;
                        }
                        // Anything may have changed while disconnected.
                        WatchEvent::Changed
                    }
                    Err(e) => {
                        let _ = tx.send(WatchEvent::FeedLost(e));
                        return;
                    }
                }
            }
        };

        if tx.send(event).is_err() {
            return;
        }
    }
}
