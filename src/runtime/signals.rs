use std::io;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use signal_hook::low_level;
use tracing::{info, warn};

use crate::artfetch::WatchEvent;

/// Turns the first termination signal into a [`WatchEvent::Shutdown`]. Any
/// later one gets the signal's default action.
pub struct SignalHandler {
    handle: Handle,
    thread: JoinHandle<()>,
}

impl SignalHandler {
    pub fn start(tx: Sender<WatchEvent>) -> io::Result<Self> {
        let mut signals = Signals::new([SIGHUP, SIGTERM, SIGINT, SIGQUIT])?;
        let handle = signals.handle();

        let thread = thread::Builder::new()
            .name("signals".to_string())
            .spawn(move || {
                for (seen, signal) in signals.forever().enumerate() {
                    match response(seen) {
                        Response::Shutdown => {
                            info!(signal, "received signal, shutting down");
                            let _ = tx.send(WatchEvent::Shutdown);
                        }
                        Response::DefaultAction => {
                            warn!(signal, "repeated signal, exiting immediately");
                            let _ = low_level::emulate_default_handler(signal);
                        }
                    }
                }
            })?;

        Ok(Self { handle, thread })
    }

    pub fn close(self) {
        self.handle.close();
        let _ = self.thread.join();
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(super) enum Response {
    Shutdown,
    DefaultAction,
}

/// Reaction to a signal after `previous` earlier ones.
pub(super) fn response(previous: usize) -> Response {
    if previous == 0 {
        Response::Shutdown
    } else {
        Response::DefaultAction
    }
}
