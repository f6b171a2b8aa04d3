use std::env;
use std::path::PathBuf;

use tracing::debug;

mod logging;
mod now_playing;
mod settings;
mod signals;
mod watch;

/// What the process was asked to do, from the first positional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Print the conky text once and exit.
    Render,
    /// Keep the cover art cache in sync until signalled.
    Watch { library_dir: Option<PathBuf> },
    /// Print the effective settings as TOML.
    PrintConfig,
}

impl Mode {
    pub fn from_args(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        match args.next().as_deref() {
            None | Some("render") => Ok(Self::Render),
            Some("watch") => Ok(Self::Watch {
                library_dir: args.next().map(PathBuf::from),
            }),
            Some("config") => Ok(Self::PrintConfig),
            Some(other) => Err(format!(
                "unknown mode {other:?}, expected one of: render, watch [LIBRARY_DIR], config"
            )),
        }
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mode = Mode::from_args(env::args().skip(1))?;
    logging::init(&mode);
    debug!(?mode, "starting");

    let settings = settings::load_settings();

    match mode {
        Mode::Render => {
            now_playing::run(&settings)?;
        }
        Mode::Watch { library_dir } => {
            watch::run(&settings, library_dir)?;
        }
        Mode::PrintConfig => {
            print!("{}", toml::to_string(&settings)?);
        }
    }
    Ok(())
}
