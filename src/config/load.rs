use std::{env, path::PathBuf};

use super::schema::{Settings, SourceBackend};

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then environment variables
/// (prefix `NOWPLAYING__`), and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("NOWPLAYING")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        match self.source.backend {
            SourceBackend::Mpd if self.source.mpd_address.trim().is_empty() => {
                return Err("source.mpd_address must not be empty".to_string());
            }
            SourceBackend::Mpris if self.source.mpris_player.trim().is_empty() => {
                return Err("source.mpris_player must not be empty".to_string());
            }
            _ => {}
        }
        if self.art.cache_path == self.art.default_image {
            return Err("art.cache_path must differ from art.default_image".to_string());
        }
        if self.art.cache_path.file_name().is_none() {
            return Err("art.cache_path must name a file".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `NOWPLAYING_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("NOWPLAYING_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under
/// `$XDG_CONFIG_HOME/conky-nowplaying/config.toml` or
/// `~/.config/conky-nowplaying/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("conky-nowplaying").join("config.toml"))
}
