use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/conky-nowplaying/config.toml` or
/// `~/.config/conky-nowplaying/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `NOWPLAYING__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub render: RenderSettings,
    pub art: ArtSettings,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceBackend {
    Mpd,
    #[serde(alias = "dbus")]
    Mpris,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Which player protocol to query.
    pub backend: SourceBackend,
    /// `host:port` of the MPD server.
    pub mpd_address: String,
    /// Well-known bus name of the MPRIS player,
    /// e.g. `org.mpris.MediaPlayer2.clementine`.
    pub mpris_player: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            backend: SourceBackend::Mpd,
            mpd_address: "127.0.0.1:6600".to_string(),
            mpris_player: "org.mpris.MediaPlayer2.mpd".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Text shown above the first `${hr}`.
    pub header_text: String,
    /// Visible runes per value before it starts to scroll.
    pub width: usize,
    /// Inserted between repetitions of scrolling text.
    pub separator: String,
    /// Emit a `Genres:` line.
    pub show_genres: bool,
    /// Emit an `${image}` line pointing at the art cache.
    pub show_art: bool,
    /// Position and size arguments of the `${image}` token.
    pub art_geometry: String,
    /// Vertical offset after the image, in pixels.
    pub art_offset: u32,
    /// Maximum number of upcoming tracks listed. The count line always
    /// reports every remaining track.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upcoming_limit: Option<usize>,
    /// Truncate upcoming-track lines to this many runes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upcoming_width: Option<usize>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            header_text: "M P D".to_string(),
            width: 20,
            separator: " | ".to_string(),
            show_genres: false,
            show_art: false,
            art_geometry: "-p 0,135 -s 200x200".to_string(),
            art_offset: 200,
            upcoming_limit: None,
            upcoming_width: None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractorKind {
    /// Run ffmpeg and copy the attached picture stream.
    Ffmpeg,
    /// Read the embedded picture from the file's tags.
    #[serde(alias = "tags", alias = "lofty")]
    Embedded,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ArtSettings {
    /// Where the current cover art is kept.
    pub cache_path: PathBuf,
    /// Copied over `cache_path` whenever extraction fails.
    pub default_image: PathBuf,
    /// Root of the MPD music library. MPD reports paths relative to it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_dir: Option<PathBuf>,
    pub extractor: ExtractorKind,
    /// ffmpeg executable, looked up on `PATH` when not absolute.
    pub ffmpeg_program: String,
}

impl Default for ArtSettings {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from("/tmp/mpd-albumart.jpg"),
            default_image: PathBuf::from("/usr/local/albumart.jpeg"),
            library_dir: None,
            extractor: ExtractorKind::Ffmpeg,
            ffmpeg_program: "ffmpeg".to_string(),
        }
    }
}
