use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_explicit_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("NOWPLAYING_CONFIG_PATH", "/tmp/nowplaying-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        PathBuf::from("/tmp/nowplaying-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    assert_eq!(
        default_config_path().unwrap(),
        PathBuf::from("/tmp/xdg-config-home")
            .join("conky-nowplaying")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_config_path().unwrap(),
        PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("conky-nowplaying")
            .join("config.toml")
    );
}

#[test]
fn defaults_match_the_classic_conky_setup() {
    let s = Settings::default();
    assert_eq!(s.source.backend, SourceBackend::Mpd);
    assert_eq!(s.source.mpd_address, "127.0.0.1:6600");
    assert_eq!(s.render.width, 20);
    assert_eq!(s.render.header_text, "M P D");
    assert_eq!(s.art.cache_path, PathBuf::from("/tmp/mpd-albumart.jpg"));
    assert_eq!(s.art.default_image, PathBuf::from("/usr/local/albumart.jpeg"));
    assert_eq!(s.art.extractor, ExtractorKind::Ffmpeg);
    assert!(s.validate().is_ok());
}

#[test]
fn settings_load_from_config_file_with_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[source]
backend = "dbus"
mpris_player = "org.mpris.MediaPlayer2.clementine"

[render]
header_text = "C L E M E N T I N E"
width = 24
separator = " / "
show_genres = true
show_art = true
upcoming_limit = 5
upcoming_width = 30

[art]
cache_path = "/tmp/test-art.jpg"
default_image = "/tmp/test-default.jpg"
library_dir = "/srv/music"
extractor = "lofty"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("NOWPLAYING_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("NOWPLAYING__RENDER__WIDTH");

    let s = Settings::load().unwrap();
    assert_eq!(s.source.backend, SourceBackend::Mpris);
    assert_eq!(s.source.mpris_player, "org.mpris.MediaPlayer2.clementine");
    assert_eq!(s.source.mpd_address, "127.0.0.1:6600");
    assert_eq!(s.render.header_text, "C L E M E N T I N E");
    assert_eq!(s.render.width, 24);
    assert_eq!(s.render.separator, " / ");
    assert!(s.render.show_genres);
    assert!(s.render.show_art);
    assert_eq!(s.render.upcoming_limit, Some(5));
    assert_eq!(s.render.upcoming_width, Some(30));
    assert_eq!(s.art.cache_path, PathBuf::from("/tmp/test-art.jpg"));
    assert_eq!(s.art.library_dir, Some(PathBuf::from("/srv/music")));
    assert_eq!(s.art.extractor, ExtractorKind::Embedded);
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[render]
width = 30
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("NOWPLAYING_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("NOWPLAYING__RENDER__WIDTH", "12");

    let s = Settings::load().unwrap();
    assert_eq!(s.render.width, 12);
}

#[test]
fn validate_rejects_cache_overwriting_default_image() {
    let mut s = Settings::default();
    s.art.cache_path = s.art.default_image.clone();
    assert!(s.validate().is_err());
}

#[test]
fn validate_rejects_blank_player_address() {
    let mut s = Settings::default();
    s.source.mpd_address = "  ".to_string();
    assert!(s.validate().is_err());

    // Only the active backend's address matters.
    s.source.backend = SourceBackend::Mpris;
    assert!(s.validate().is_ok());
}

#[test]
fn settings_serialize_to_toml_sections() {
    let out = toml::to_string(&Settings::default()).unwrap();
    assert!(out.contains("[source]"));
    assert!(out.contains("[render]"));
    assert!(out.contains("[art]"));
    assert!(out.contains("backend = \"mpd\""));
    assert!(!out.contains("upcoming_limit"));
}
