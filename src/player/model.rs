use std::path::PathBuf;

/// Metadata for one playlist entry.
///
/// Empty strings and empty lists mean "unknown"; the renderer skips them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub title: String,
    pub album: String,
    pub artists: Vec<String>,
    pub genres: Vec<String>,
    pub track_number: i64,
    pub disc_number: i64,
    pub year: String,
    /// Track duration in seconds, 0 when unknown.
    pub length_secs: f64,
    /// Cover art the player advertises itself (MPRIS `mpris:artUrl`).
    pub art_url: Option<String>,
    /// Source-specific media location (MPD `file`, MPRIS `xesam:url`).
    pub location: Option<String>,
}

impl Track {
    /// Artists joined by a single space.
    pub fn artist_line(&self) -> String {
        self.artists.join(" ")
    }

    /// Genres joined by a single space.
    pub fn genre_line(&self) -> String {
        self.genres.join(" ")
    }

    /// Local file behind `art_url`, if it is a `file://` URL.
    pub fn art_path(&self) -> Option<PathBuf> {
        self.art_url
            .as_deref()
            .and_then(super::mpris::file_url_to_path)
    }
}

/// Point-in-time view of the player, built once per render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Playlist in play order.
    pub tracks: Vec<Track>,
    /// Offset of the playing track; only meaningful when `tracks` is non-empty.
    pub current_index: usize,
    /// Playback position within the current track, in seconds.
    pub elapsed_secs: f64,
}

impl Snapshot {
    /// The "no data" state.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Track> {
        self.tracks.get(self.current_index)
    }

    /// Tracks strictly after the current one, or nothing when there is no
    /// current track.
    pub fn upcoming(&self) -> &[Track] {
        if self.current_index < self.tracks.len() {
            &self.tracks[self.current_index + 1..]
        } else {
            &[]
        }
    }
}
