use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("could not connect to {target}: {reason}")]
    Connection { target: String, reason: String },
    #[error("mpd error: {0}")]
    Mpd(#[from] ::mpd::error::Error),
    #[error("d-bus error: {0}")]
    Dbus(#[from] zbus::Error),
    #[error("change feed closed")]
    FeedClosed,
}
