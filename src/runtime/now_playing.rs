use std::io::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

use crate::config::Settings;
use crate::player::{self, Snapshot};
use crate::render::render;

/// Current unix time in whole seconds; drives the marquee.
fn wall_clock_tick() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// One-shot render. Player errors are logged and produce empty output.
pub fn run(settings: &Settings) -> io::Result<()> {
    let mut source = player::player_source(&settings.source);
    let snapshot = source.snapshot().unwrap_or_else(|e| {
        warn!("could not read player state: {e}");
        Snapshot::empty()
    });

    let text = render(
        &snapshot,
        &settings.render,
        &settings.art.cache_path,
        wall_clock_tick(),
    );

    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()
}
