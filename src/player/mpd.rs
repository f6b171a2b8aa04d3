//! MPD backend, speaking the daemon's TCP protocol through the `mpd` crate.

use std::net::{Shutdown, TcpStream};
use std::path::{Path, PathBuf};
use std::time::Duration;

use ::mpd::{Client, Idle, Song, Subsystem};
use tracing::debug;

use super::SourceError;
use super::model::{Snapshot, Track};
use super::source::{ChangeFeed, FeedStopper, PlayerSource, TrackLocator};

fn connect(address: &str) -> Result<Client<TcpStream>, SourceError> {
    Client::connect(address).map_err(|e| SourceError::Connection {
        target: format!("mpd at {address}"),
        reason: e.to_string(),
    })
}

/// One-connection-per-query MPD client.
pub struct MpdSource {
    address: String,
    library_dir: Option<PathBuf>,
}

impl MpdSource {
    pub fn new(address: &str, library_dir: Option<PathBuf>) -> Self {
        Self {
            address: address.to_string(),
            library_dir,
        }
    }
}

impl PlayerSource for MpdSource {
    fn snapshot(&mut self) -> Result<Snapshot, SourceError> {
        let mut conn = connect(&self.address)?;

        let queue = conn.queue()?;
        let status = conn.status()?;

        let tracks: Vec<Track> = queue.iter().map(track_from_song).collect();
        let current_index = status.song.map(|place| place.pos as usize).unwrap_or(0);
        let elapsed_secs = status.elapsed.map(|d| d.as_secs_f64()).unwrap_or(0.0);

        debug!(tracks = tracks.len(), current_index, elapsed_secs, "mpd snapshot");

        Ok(Snapshot {
            tracks,
            current_index,
            elapsed_secs,
        })
    }
}

impl TrackLocator for MpdSource {
    fn current_location(&mut self) -> Result<Option<PathBuf>, SourceError> {
        let mut conn = connect(&self.address)?;
        let song = conn.currentsong()?;
        Ok(song.and_then(|s| library_path(self.library_dir.as_deref(), &s.file)))
    }
}

/// Persistent connection parked in `idle player`.
pub struct MpdFeed {
    conn: Client<TcpStream>,
    // Second handle on the client's socket, shut down to break out of `idle`.
    socket: TcpStream,
}

impl MpdFeed {
    pub fn connect(address: &str) -> Result<Self, SourceError> {
        let unreachable = |e: std::io::Error| SourceError::Connection {
            target: format!("mpd at {address}"),
            reason: e.to_string(),
        };
        let stream = TcpStream::connect(address).map_err(unreachable)?;
        let socket = stream.try_clone().map_err(unreachable)?;
        Ok(Self {
            conn: Client::new(stream)?,
            socket,
        })
    }
}

impl ChangeFeed for MpdFeed {
    fn wait_for_change(&mut self) -> Result<(), SourceError> {
        let changed = self.conn.wait(&[Subsystem::Player])?;
        debug!(?changed, "mpd idle returned");
        Ok(())
    }

    fn stopper(&self) -> Option<FeedStopper> {
        let socket = self.socket.try_clone().ok()?;
        Some(Box::new(move || {
            let _ = socket.shutdown(Shutdown::Both);
        }))
    }
}

fn track_from_song(song: &Song) -> Track {
    let tags: Vec<(&str, &str)> = song
        .tags
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    track_from_fields(
        &song.file,
        song.title.as_deref(),
        song.artist.as_deref(),
        song.duration,
        &tags,
    )
}

/// Assemble a [`Track`] from the typed song fields plus the free-form tag list.
///
/// `tags` holds every line the `mpd` crate did not map to a typed field, so
/// `Title`, `Artist` and `Time` never appear there.
pub(super) fn track_from_fields(
    file: &str,
    title: Option<&str>,
    artist: Option<&str>,
    duration: Option<Duration>,
    tags: &[(&str, &str)],
) -> Track {
    // The `mpd` crate keeps only the last `Artist` line of a song.
    let artists: Vec<String> = artist
        .filter(|a| !a.is_empty())
        .map(|a| vec![a.to_string()])
        .unwrap_or_default();

    // `duration` is fractional; `Time` (the typed field) is rounded.
    let length_secs = match tag(tags, "duration") {
        "" => duration.map(|d| d.as_secs_f64()).unwrap_or(0.0),
        raw => parse_seconds(raw),
    };

    let year = match tag(tags, "OriginalDate") {
        "" => tag(tags, "Date"),
        y => y,
    };

    Track {
        title: title
            .map(str::to_string)
            .unwrap_or_else(|| tag(tags, "Title").to_string()),
        album: tag(tags, "Album").to_string(),
        artists,
        genres: tag_values(tags, "Genre").map(str::to_string).collect(),
        track_number: leading_int(tag(tags, "Track")),
        disc_number: leading_int(tag(tags, "Disc")),
        year: year.to_string(),
        length_secs,
        art_url: None,
        location: (!file.is_empty()).then(|| file.to_string()),
    }
}

/// First value of `key`, or `""` when absent.
pub(super) fn tag<'a>(tags: &[(&'a str, &'a str)], key: &str) -> &'a str {
    tag_values(tags, key).next().unwrap_or("")
}

pub(super) fn tag_values<'a, 'k>(
    tags: &'k [(&'a str, &'a str)],
    key: &'k str,
) -> impl Iterator<Item = &'a str> + 'k
where
    'a: 'k,
{
    tags.iter()
        .filter(move |(k, v)| *k == key && !v.is_empty())
        .map(|(_, v)| *v)
}

/// Leading integer of a tag such as `"3/12"`, or 0.
pub(super) fn leading_int(raw: &str) -> i64 {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

pub(super) fn parse_seconds(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|s| s.is_finite() && *s >= 0.0)
        .unwrap_or(0.0)
}

/// Absolute path of an MPD `file` entry. Relative entries need a library root.
pub(super) fn library_path(library_dir: Option<&Path>, file: &str) -> Option<PathBuf> {
    if file.is_empty() || file.contains("://") {
        return None;
    }
    let file = Path::new(file);
    match library_dir {
        Some(root) => Some(root.join(file)),
        None if file.is_absolute() => Some(file.to_path_buf()),
        None => None,
    }
}
