//! Conky text for the "now playing" and "upcoming" sections.
//!
//! Each section is built by a small pure function and the results are
//! concatenated in display order. Rendering never fails: a snapshot without
//! a current track renders as the empty string, and empty fields simply drop
//! their line.

use std::path::Path;

use crate::config::RenderSettings;
use crate::marquee::{progress_bar, progress_ratio, scroll, timecode, truncate};
use crate::player::{Snapshot, Track};

const ALIGN_RIGHT: &str = "${alignr}";
const RULE: &str = "${hr}";
const BULLET: &str = "•";

/// Render `snapshot` as conky markup. `tick` drives marquee scrolling and is
/// normally the current unix time in seconds. `art_path` is the cached cover,
/// shown when `settings.show_art` is on and the track has no local art of its
/// own.
pub fn render(
    snapshot: &Snapshot,
    settings: &RenderSettings,
    art_path: &Path,
    tick: u64,
) -> String {
    let Some(current) = snapshot.current() else {
        return String::new();
    };

    let mut out = header(settings);
    if settings.show_art {
        let own_art = current.art_path();
        out.push_str(&art_line(own_art.as_deref().unwrap_or(art_path), settings));
    }
    out.push_str(&current_track(current, snapshot.elapsed_secs, settings, tick));
    out.push_str(&progress_line(snapshot.elapsed_secs, current.length_secs));
    out.push_str(&upcoming(snapshot.upcoming(), settings));
    out
}

fn header(settings: &RenderSettings) -> String {
    format!("\n{}\n{RULE}\n", settings.header_text)
}

fn art_line(art_path: &Path, settings: &RenderSettings) -> String {
    format!(
        "${{image {} {}}}${{voffset {}}}\n",
        art_path.display(),
        settings.art_geometry,
        settings.art_offset
    )
}

/// One `Label:${alignr}value` line, or nothing for an empty value.
pub(crate) fn labelled_line(
    label: &str,
    value: &str,
    settings: &RenderSettings,
    tick: u64,
) -> String {
    if value.is_empty() {
        return String::new();
    }
    format!(
        "{label}:{ALIGN_RIGHT}{}\n",
        scroll(value, settings.width, tick, &settings.separator)
    )
}

fn current_track(
    track: &Track,
    elapsed_secs: f64,
    settings: &RenderSettings,
    tick: u64,
) -> String {
    let playtime = format!("{} / {}", timecode(elapsed_secs), timecode(track.length_secs));

    let mut out = String::new();
    out.push_str(&labelled_line("Title", &track.title, settings, tick));
    out.push_str(&labelled_line("Artists", &track.artist_line(), settings, tick));
    out.push_str(&labelled_line("Album", &track.album, settings, tick));
    if settings.show_genres {
        out.push_str(&labelled_line("Genres", &track.genre_line(), settings, tick));
    }
    out.push_str(&labelled_line("Playtime", &playtime, settings, tick));
    out
}

fn progress_line(elapsed_secs: f64, length_secs: f64) -> String {
    format!("{}\n", progress_bar(progress_ratio(elapsed_secs, length_secs)))
}

fn upcoming(tracks: &[Track], settings: &RenderSettings) -> String {
    let mut out = format!("{RULE}\n{} Songs left, next up...\n", tracks.len());
    let listed = settings.upcoming_limit.unwrap_or(tracks.len());
    for track in tracks.iter().take(listed) {
        out.push_str(&compact_line(track, settings.upcoming_width));
    }
    out
}

/// `•title | artists` for the upcoming list.
pub(crate) fn compact_line(track: &Track, width: Option<usize>) -> String {
    let line = format!("{} | {}", track.title, track.artist_line());
    let line = match width {
        Some(w) => truncate(&line, w),
        None => line,
    };
    format!("{BULLET}{line}\n")
}
