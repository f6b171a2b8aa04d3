use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::ArtSettings;
use crate::player::TrackLocator;

use super::{ArtExtractor, ExtractionError, FallbackError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtOutcome {
    /// The cache now holds the current track's own art.
    Extracted,
    /// Extraction failed and the default image was installed instead.
    Fallback,
}

/// The well-known cover art file and its fallback image.
///
/// Every write goes to a hidden sibling first and is then renamed into
/// place, so readers see either the old file or the new one.
#[derive(Debug, Clone)]
pub struct ArtCache {
    cache_path: PathBuf,
    default_image: PathBuf,
}

impl ArtCache {
    pub fn new(cache_path: impl Into<PathBuf>, default_image: impl Into<PathBuf>) -> Self {
        Self {
            cache_path: cache_path.into(),
            default_image: default_image.into(),
        }
    }

    pub fn from_settings(settings: &ArtSettings) -> Self {
        Self::new(&settings.cache_path, &settings.default_image)
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Same directory and extension as the cache file, so extension-driven
    /// tools pick the right output format.
    pub(crate) fn staging_path(&self) -> PathBuf {
        let name = self
            .cache_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "albumart".to_string());
        self.cache_path.with_file_name(format!(".{name}"))
    }

    /// Run one fetch-and-save cycle.
    ///
    /// Any failure to locate or extract the art installs the default image.
    /// Only a failure of that fallback is returned.
    pub fn fetch_and_save<L, X>(
        &self,
        locator: &mut L,
        extractor: &X,
    ) -> Result<ArtOutcome, FallbackError>
    where
        L: TrackLocator + ?Sized,
        X: ArtExtractor + ?Sized,
    {
        match self.try_extract(locator, extractor) {
            Ok(()) => {
                info!(cache = %self.cache_path.display(), "saved cover art");
                Ok(ArtOutcome::Extracted)
            }
            Err(e) => {
                warn!("art extraction failed, installing default image: {e}");
                self.install_default()?;
                Ok(ArtOutcome::Fallback)
            }
        }
    }

    fn try_extract<L, X>(&self, locator: &mut L, extractor: &X) -> Result<(), ExtractionError>
    where
        L: TrackLocator + ?Sized,
        X: ArtExtractor + ?Sized,
    {
        let source = locator
            .current_location()?
            .ok_or(ExtractionError::NoLocation)?;
        info!(path = %source.display(), "current song path");

        let staging = self.staging_path();
        let _ = fs::remove_file(&staging);

        let result = extractor.extract(&source, &staging).and_then(|()| {
            let len = fs::metadata(&staging)?.len();
            if len == 0 {
                return Err(ExtractionError::EmptyOutput);
            }
            fs::rename(&staging, &self.cache_path)?;
            Ok(())
        });

        if result.is_err() {
            let _ = fs::remove_file(&staging);
        }
        result
    }

    /// Replace the cache file with a copy of the default image.
    pub fn install_default(&self) -> Result<(), FallbackError> {
        let staging = self.staging_path();
        let result = fs::copy(&self.default_image, &staging)
            .and_then(|_| fs::rename(&staging, &self.cache_path));

        result.map_err(|source| {
            let _ = fs::remove_file(&staging);
            FallbackError {
                default_image: self.default_image.clone(),
                cache_path: self.cache_path.clone(),
                source,
            }
        })
    }
}
