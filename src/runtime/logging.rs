use tracing_subscriber::EnvFilter;

use super::Mode;

pub const LOG_ENV: &str = "NOWPLAYING_LOG";

/// Install the stderr subscriber. Stdout belongs to conky, so nothing is
/// ever logged there.
pub fn init(mode: &Mode) {
    let default_level = match mode {
        Mode::Render => "warn",
        Mode::Watch { .. } | Mode::PrintConfig => "info",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .unwrap_or_default();
}
