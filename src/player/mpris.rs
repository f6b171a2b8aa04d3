//! MPRIS backend over the D-Bus session bus.
//!
//! Metadata arrives as an untyped `a{sv}` map, so every field is read through
//! a defaulting accessor that yields an empty value instead of failing when a
//! key is missing or carries an unexpected type.

use std::collections::HashMap;
use std::path::PathBuf;
use std::pin::Pin;

use async_io::block_on;
use futures_util::StreamExt;
use tracing::{debug, warn};
use zbus::proxy::{CacheProperties, PropertyStream};
use zbus::{Connection, proxy};
use zvariant::{OwnedObjectPath, OwnedValue, Value};

use super::SourceError;
use super::model::{Snapshot, Track};
use super::source::{ChangeFeed, PlayerSource, TrackLocator};

type Metadata = HashMap<String, OwnedValue>;

#[proxy(
    interface = "org.mpris.MediaPlayer2.Player",
    default_path = "/org/mpris/MediaPlayer2",
    gen_blocking = false
)]
trait Player {
    #[zbus(property)]
    fn metadata(&self) -> zbus::Result<HashMap<String, OwnedValue>>;

    #[zbus(property)]
    fn position(&self) -> zbus::Result<i64>;
}

#[proxy(
    interface = "org.mpris.MediaPlayer2.TrackList",
    default_path = "/org/mpris/MediaPlayer2",
    gen_blocking = false
)]
trait TrackList {
    fn get_tracks_metadata(
        &self,
        track_ids: &[OwnedObjectPath],
    ) -> zbus::Result<Vec<HashMap<String, OwnedValue>>>;

    #[zbus(property)]
    fn tracks(&self) -> zbus::Result<Vec<OwnedObjectPath>>;
}

async fn session(player: &str) -> Result<Connection, SourceError> {
    Connection::session()
        .await
        .map_err(|e| SourceError::Connection {
            target: format!("session bus for {player}"),
            reason: e.to_string(),
        })
}

async fn player_proxy(
    conn: &Connection,
    player: &str,
    cache: CacheProperties,
) -> Result<PlayerProxy<'static>, SourceError> {
    let proxy = PlayerProxy::builder(conn)
        .destination(player.to_string())?
        .cache_properties(cache)
        .build()
        .await?;
    Ok(proxy)
}

/// Queries an MPRIS player, one session-bus connection per call.
pub struct MprisSource {
    player: String,
}

impl MprisSource {
    pub fn new(player: &str) -> Self {
        Self {
            player: player.to_string(),
        }
    }

    async fn read_snapshot(&self) -> Result<Snapshot, SourceError> {
        let conn = session(&self.player).await?;
        let proxy = player_proxy(&conn, &self.player, CacheProperties::No).await?;

        let current = proxy.metadata().await?;
        let elapsed_secs = seconds_from_micros(proxy.position().await.unwrap_or(0));

        let playlist = match self.read_track_list(&conn).await {
            Ok(list) => list,
            Err(e) => {
                debug!(player = %self.player, "no usable track list: {e}");
                Vec::new()
            }
        };

        Ok(snapshot_from_metadata(&current, playlist, elapsed_secs))
    }

    async fn read_track_list(&self, conn: &Connection) -> Result<Vec<Metadata>, SourceError> {
        let proxy = TrackListProxy::builder(conn)
            .destination(self.player.clone())?
            .cache_properties(CacheProperties::No)
            .build()
            .await?;
        let ids = proxy.tracks().await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(proxy.get_tracks_metadata(&ids).await?)
    }
}

impl PlayerSource for MprisSource {
    fn snapshot(&mut self) -> Result<Snapshot, SourceError> {
        block_on(self.read_snapshot())
    }
}

impl TrackLocator for MprisSource {
    fn current_location(&mut self) -> Result<Option<PathBuf>, SourceError> {
        block_on(async {
            let conn = session(&self.player).await?;
            let proxy = player_proxy(&conn, &self.player, CacheProperties::No).await?;
            let meta = proxy.metadata().await?;
            Ok(file_url_to_path(&text(&meta, "xesam:url")))
        })
    }
}

/// Signal subscription on the player's `Metadata` property.
pub struct MprisFeed {
    // Keeps the match rule registered for the lifetime of the stream.
    _proxy: PlayerProxy<'static>,
    changes: Pin<Box<PropertyStream<'static, HashMap<String, OwnedValue>>>>,
}

impl MprisFeed {
    pub fn connect(player: &str) -> Result<Self, SourceError> {
        block_on(async {
            let conn = session(player).await?;
            let proxy = player_proxy(&conn, player, CacheProperties::Yes).await?;
            let changes = Box::pin(proxy.receive_metadata_changed().await);
            Ok(Self {
                _proxy: proxy,
                changes,
            })
        })
    }
}

impl ChangeFeed for MprisFeed {
    fn wait_for_change(&mut self) -> Result<(), SourceError> {
        match block_on(self.changes.next()) {
            Some(_) => Ok(()),
            None => {
                warn!("mpris metadata stream ended");
                Err(SourceError::FeedClosed)
            }
        }
    }
}

/// Build a snapshot from the current track's metadata and an optional
/// track list. Without a list the snapshot holds the current track alone.
pub(super) fn snapshot_from_metadata(
    current: &Metadata,
    playlist: Vec<Metadata>,
    elapsed_secs: f64,
) -> Snapshot {
    let current_track = track_from_metadata(current);
    if current.is_empty() || (current_track.title.is_empty() && current_track.location.is_none()) {
        return Snapshot::empty();
    }

    let current_id = text(current, "mpris:trackid");
    let current_index = playlist
        .iter()
        .position(|m| !current_id.is_empty() && text(m, "mpris:trackid") == current_id);

    match current_index {
        Some(current_index) => Snapshot {
            tracks: playlist.iter().map(track_from_metadata).collect(),
            current_index,
            elapsed_secs,
        },
        None => Snapshot {
            tracks: vec![current_track],
            current_index: 0,
            elapsed_secs,
        },
    }
}

pub(super) fn track_from_metadata(meta: &Metadata) -> Track {
    let art_url = text(meta, "mpris:artUrl");
    let url = text(meta, "xesam:url");
    let year = text(meta, "xesam:contentCreated").chars().take(4).collect();

    Track {
        title: text(meta, "xesam:title"),
        album: text(meta, "xesam:album"),
        artists: text_list(meta, "xesam:artist"),
        genres: text_list(meta, "xesam:genre"),
        track_number: integer(meta, "xesam:trackNumber"),
        disc_number: integer(meta, "xesam:discNumber"),
        year,
        length_secs: seconds_from_micros(integer(meta, "mpris:length")),
        art_url: (!art_url.is_empty()).then_some(art_url),
        location: (!url.is_empty()).then_some(url),
    }
}

fn value_text(value: &Value<'_>) -> Option<String> {
    match value {
        Value::Str(s) => Some(s.as_str().to_string()),
        Value::ObjectPath(p) => Some(p.as_str().to_string()),
        Value::Value(inner) => value_text(inner),
        _ => None,
    }
}

fn value_integer(value: &Value<'_>) -> Option<i64> {
    match value {
        Value::U8(n) => Some(i64::from(*n)),
        Value::I16(n) => Some(i64::from(*n)),
        Value::U16(n) => Some(i64::from(*n)),
        Value::I32(n) => Some(i64::from(*n)),
        Value::U32(n) => Some(i64::from(*n)),
        Value::I64(n) => Some(*n),
        Value::U64(n) => i64::try_from(*n).ok(),
        Value::F64(f) if f.is_finite() => Some(*f as i64),
        Value::Value(inner) => value_integer(inner),
        _ => None,
    }
}

/// String field, `""` when absent or not a string.
pub(super) fn text(meta: &Metadata, key: &str) -> String {
    meta.get(key)
        .and_then(|v| value_text(v))
        .unwrap_or_default()
}

/// String-list field. A bare string is accepted as a one-element list.
pub(super) fn text_list(meta: &Metadata, key: &str) -> Vec<String> {
    let Some(value) = meta.get(key) else {
        return Vec::new();
    };
    let items = match &**value {
        Value::Array(items) => items.iter().filter_map(value_text).collect(),
        other => value_text(other).into_iter().collect::<Vec<_>>(),
    };
    items.into_iter().filter(|s| !s.is_empty()).collect()
}

/// Integer field of any width, 0 when absent.
pub(super) fn integer(meta: &Metadata, key: &str) -> i64 {
    meta.get(key).and_then(|v| value_integer(v)).unwrap_or(0)
}

pub(super) fn seconds_from_micros(micros: i64) -> f64 {
    (micros.max(0) as f64) / 1_000_000.0
}

/// Local path of a `file://` URL, percent-decoded.
pub(super) fn file_url_to_path(url: &str) -> Option<PathBuf> {
    let rest = url.strip_prefix("file://")?;
    let rest = rest.strip_prefix("localhost").unwrap_or(rest);
    if !rest.starts_with('/') {
        return None;
    }
    let decoded = urlencoding::decode(rest).ok()?;
    Some(PathBuf::from(decoded.into_owned()))
}
