use super::*;
use super::extract::{EmbeddedExtractor, FfmpegExtractor};
use super::watcher::WatcherState;
use crate::player::{SourceError, TrackLocator};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tempfile::{TempDir, tempdir};

const DEFAULT_BYTES: &[u8] = b"default-image-bytes";

struct Fixture {
    dir: TempDir,
    cache: ArtCache,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let default_image = dir.path().join("albumart.jpeg");
        fs::write(&default_image, DEFAULT_BYTES).unwrap();
        let cache = ArtCache::new(dir.path().join("cache.jpg"), default_image);
        Self { dir, cache }
    }

    fn cached(&self) -> Vec<u8> {
        fs::read(self.cache.cache_path()).unwrap()
    }
}

/// Hands out a fixed sequence of locations, repeating the last one.
struct ScriptedLocator {
    answers: VecDeque<Result<Option<PathBuf>, SourceError>>,
}

impl ScriptedLocator {
    fn always(path: &str) -> Self {
        Self {
            answers: VecDeque::from([Ok(Some(PathBuf::from(path)))]),
        }
    }
}

impl TrackLocator for ScriptedLocator {
    fn current_location(&mut self) -> Result<Option<PathBuf>, SourceError> {
        if self.answers.len() > 1 {
            return self.answers.pop_front().unwrap();
        }
        match self.answers.front() {
            Some(Ok(p)) => Ok(p.clone()),
            Some(Err(_)) => Err(SourceError::FeedClosed),
            None => Ok(None),
        }
    }
}

/// Writes the source path as the "image" so tests can tell tracks apart.
struct EchoExtractor;

impl ArtExtractor for EchoExtractor {
    fn extract(&self, source: &Path, dest: &Path) -> Result<(), ExtractionError> {
        fs::write(dest, source.to_string_lossy().as_bytes())?;
        Ok(())
    }
}

struct FailingExtractor;

impl ArtExtractor for FailingExtractor {
    fn extract(&self, source: &Path, _dest: &Path) -> Result<(), ExtractionError> {
        Err(ExtractionError::NoPicture(source.to_path_buf()))
    }
}

struct EmptyExtractor;

impl ArtExtractor for EmptyExtractor {
    fn extract(&self, _source: &Path, dest: &Path) -> Result<(), ExtractionError> {
        fs::write(dest, b"")?;
        Ok(())
    }
}

#[test]
fn extraction_failure_leaves_default_image_in_cache() {
    let fx = Fixture::new();
    fs::write(fx.cache.cache_path(), b"stale art from the previous track").unwrap();

    let outcome = fx
        .cache
        .fetch_and_save(&mut ScriptedLocator::always("/music/a.flac"), &FailingExtractor)
        .unwrap();

    assert_eq!(outcome, ArtOutcome::Fallback);
    assert_eq!(fx.cached(), DEFAULT_BYTES);
    assert!(!fx.cache.staging_path().exists());
}

#[test]
fn successful_extraction_replaces_cache() {
    let fx = Fixture::new();

    let outcome = fx
        .cache
        .fetch_and_save(&mut ScriptedLocator::always("/music/a.flac"), &EchoExtractor)
        .unwrap();

    assert_eq!(outcome, ArtOutcome::Extracted);
    assert_eq!(fx.cached(), b"/music/a.flac");
    assert!(!fx.cache.staging_path().exists());
}

#[test]
fn missing_location_falls_back() {
    let fx = Fixture::new();
    let mut locator = ScriptedLocator {
        answers: VecDeque::from([Ok(None)]),
    };

    let outcome = fx.cache.fetch_and_save(&mut locator, &EchoExtractor).unwrap();
    assert_eq!(outcome, ArtOutcome::Fallback);
    assert_eq!(fx.cached(), DEFAULT_BYTES);
}

#[test]
fn unreachable_player_falls_back() {
    let fx = Fixture::new();
    let mut locator = ScriptedLocator {
        answers: VecDeque::from([Err(SourceError::Connection {
            target: "mpd at 127.0.0.1:1".to_string(),
            reason: "refused".to_string(),
        })]),
    };

    let outcome = fx.cache.fetch_and_save(&mut locator, &EchoExtractor).unwrap();
    assert_eq!(outcome, ArtOutcome::Fallback);
    assert_eq!(fx.cached(), DEFAULT_BYTES);
}

#[test]
fn empty_extractor_output_is_treated_as_failure() {
    let fx = Fixture::new();
    let outcome = fx
        .cache
        .fetch_and_save(&mut ScriptedLocator::always("/music/a.flac"), &EmptyExtractor)
        .unwrap();
    assert_eq!(outcome, ArtOutcome::Fallback);
    assert_eq!(fx.cached(), DEFAULT_BYTES);
}

#[test]
fn failed_fallback_keeps_previous_cache_file() {
    let dir = tempdir().unwrap();
    let cache = ArtCache::new(dir.path().join("cache.jpg"), dir.path().join("missing.jpeg"));
    fs::write(cache.cache_path(), b"previous").unwrap();

    let err = cache
        .fetch_and_save(&mut ScriptedLocator::always("/music/a.flac"), &FailingExtractor)
        .unwrap_err();

    assert_eq!(err.default_image, dir.path().join("missing.jpeg"));
    assert_eq!(fs::read(cache.cache_path()).unwrap(), b"previous");
    assert!(!cache.staging_path().exists());
}

#[test]
fn staging_path_is_a_hidden_sibling_with_the_same_extension() {
    let cache = ArtCache::new("/tmp/mpd-albumart.jpg", "/usr/local/albumart.jpeg");
    assert_eq!(cache.staging_path(), PathBuf::from("/tmp/.mpd-albumart.jpg"));
}

#[test]
fn ffmpeg_extractor_reports_missing_program() {
    let fx = Fixture::new();
    let extractor = FfmpegExtractor::new("definitely-not-an-installed-program-4c1d");
    let err = extractor
        .extract(Path::new("/music/a.flac"), &fx.dir.path().join("out.jpg"))
        .unwrap_err();
    assert!(matches!(err, ExtractionError::Spawn { .. }));
}

#[test]
fn ffmpeg_extractor_reports_non_zero_exit() {
    let fx = Fixture::new();
    let extractor = FfmpegExtractor::new("false");
    let err = extractor
        .extract(Path::new("/music/a.flac"), &fx.dir.path().join("out.jpg"))
        .unwrap_err();
    assert!(matches!(err, ExtractionError::ToolFailed { .. }));
}

#[test]
fn embedded_extractor_rejects_non_audio_files() {
    let fx = Fixture::new();
    let bogus = fx.dir.path().join("notes.mp3");
    fs::write(&bogus, b"not really an mp3").unwrap();

    let err = EmbeddedExtractor
        .extract(&bogus, &fx.dir.path().join("out.jpg"))
        .unwrap_err();
    assert!(matches!(
        err,
        ExtractionError::Tags { .. } | ExtractionError::NoPicture(_)
    ));
}

/// Records how many extractions overlap and in which order tracks ran.
#[derive(Clone, Default)]
struct ProbeExtractor {
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<PathBuf>>>,
}

impl ArtExtractor for ProbeExtractor {
    fn extract(&self, source: &Path, dest: &Path) -> Result<(), ExtractionError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(2));
        self.seen.lock().unwrap().push(source.to_path_buf());
        fs::write(dest, source.to_string_lossy().as_bytes())?;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn watcher_processes_every_queued_event_one_at_a_time() {
    const EVENTS: usize = 25;
    let fx = Fixture::new();

    let answers = (0..=EVENTS)
        .map(|i| Ok(Some(PathBuf::from(format!("/music/{i}.flac")))))
        .collect();
    let probe = ProbeExtractor::default();
    let mut watcher = Watcher::new(ScriptedLocator { answers }, probe.clone(), fx.cache.clone());
    assert_eq!(watcher.state(), WatcherState::Idle);

    let (tx, rx) = mpsc::channel();
    let producer = thread::spawn(move || {
        for _ in 0..EVENTS {
            tx.send(WatchEvent::Changed).unwrap();
        }
        tx.send(WatchEvent::Shutdown).unwrap();
    });

    watcher.run(rx).unwrap();
    producer.join().unwrap();

    assert_eq!(watcher.cycles(), EVENTS as u64 + 1);
    assert_eq!(watcher.state(), WatcherState::Stopped);
    assert_eq!(probe.max_in_flight.load(Ordering::SeqCst), 1);

    let seen = probe.seen.lock().unwrap();
    assert_eq!(seen.len(), EVENTS + 1);
    assert_eq!(seen.last().unwrap(), &PathBuf::from(format!("/music/{EVENTS}.flac")));
    assert_eq!(fx.cached(), format!("/music/{EVENTS}.flac").as_bytes());
}

#[test]
fn watcher_populates_cache_before_the_first_event() {
    let fx = Fixture::new();
    let mut watcher = Watcher::new(
        ScriptedLocator::always("/music/first.flac"),
        EchoExtractor,
        fx.cache.clone(),
    );

    let (tx, rx) = mpsc::channel();
    tx.send(WatchEvent::Shutdown).unwrap();
    watcher.run(rx).unwrap();

    assert_eq!(watcher.cycles(), 1);
    assert_eq!(fx.cached(), b"/music/first.flac");
}

#[test]
fn watcher_survives_failing_cycles() {
    let dir = tempdir().unwrap();
    let cache = ArtCache::new(dir.path().join("cache.jpg"), dir.path().join("missing.jpeg"));
    let mut watcher = Watcher::new(
        ScriptedLocator::always("/music/a.flac"),
        FailingExtractor,
        cache,
    );

    let (tx, rx) = mpsc::channel();
    for _ in 0..3 {
        tx.send(WatchEvent::Changed).unwrap();
    }
    tx.send(WatchEvent::Shutdown).unwrap();

    watcher.run(rx).unwrap();
    assert_eq!(watcher.cycles(), 4);
}

#[test]
fn watcher_stops_when_the_feed_is_lost() {
    let fx = Fixture::new();
    let mut watcher = Watcher::new(
        ScriptedLocator::always("/music/a.flac"),
        EchoExtractor,
        fx.cache.clone(),
    );

    let (tx, rx) = mpsc::channel();
    tx.send(WatchEvent::Changed).unwrap();
    tx.send(WatchEvent::FeedLost(SourceError::FeedClosed)).unwrap();
    tx.send(WatchEvent::Changed).unwrap();

    let err = watcher.run(rx).unwrap_err();
    assert!(matches!(err, WatchError::FeedLost(SourceError::FeedClosed)));
    assert_eq!(watcher.cycles(), 2);
    assert_eq!(watcher.state(), WatcherState::Stopped);
}

#[test]
fn watcher_reports_a_closed_channel() {
    let fx = Fixture::new();
    let mut watcher = Watcher::new(
        ScriptedLocator::always("/music/a.flac"),
        EchoExtractor,
        fx.cache.clone(),
    );

    let (tx, rx) = mpsc::channel::<WatchEvent>();
    drop(tx);
    assert!(matches!(watcher.run(rx), Err(WatchError::ChannelClosed)));
}
