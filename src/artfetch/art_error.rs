use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::player::SourceError;

/// Why the current track's art could not be produced. Always recovered by
/// installing the default image.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("could not locate the current track: {0}")]
    Locate(#[from] SourceError),
    #[error("no local file for the current track")]
    NoLocation,
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {status} for {path}")]
    ToolFailed {
        program: String,
        status: ExitStatus,
        path: PathBuf,
    },
    #[error("failed to read tags from {path}: {source}")]
    Tags {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },
    #[error("{0} has no embedded picture")]
    NoPicture(PathBuf),
    #[error("extractor produced no image data")]
    EmptyOutput,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// The default image could not be installed; the previous cache file is
/// left as it was.
#[derive(Error, Debug)]
#[error("could not install default image {default_image} at {cache_path}: {source}")]
pub struct FallbackError {
    pub default_image: PathBuf,
    pub cache_path: PathBuf,
    #[source]
    pub source: io::Error,
}

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("could not start watching the player: {0}")]
    Startup(SourceError),
    #[error("failed to set up the watcher: {0}")]
    Setup(#[source] io::Error),
    #[error("lost connection to the player: {0}")]
    FeedLost(SourceError),
    #[error("event channel closed without a shutdown request")]
    ChannelClosed,
}
