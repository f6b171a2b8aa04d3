use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use lofty::file::TaggedFileExt;
use lofty::picture::PictureType;
use tracing::debug;

use crate::config::{ArtSettings, ExtractorKind};

use super::ExtractionError;

/// Writes the cover art of the media file at `source` to `dest`.
pub trait ArtExtractor {
    fn extract(&self, source: &Path, dest: &Path) -> Result<(), ExtractionError>;
}

impl<T: ArtExtractor + ?Sized> ArtExtractor for Box<T> {
    fn extract(&self, source: &Path, dest: &Path) -> Result<(), ExtractionError> {
        (**self).extract(source, dest)
    }
}

pub fn extractor_for(settings: &ArtSettings) -> Box<dyn ArtExtractor + Send> {
    match settings.extractor {
        ExtractorKind::Ffmpeg => Box::new(FfmpegExtractor::new(&settings.ffmpeg_program)),
        ExtractorKind::Embedded => Box::new(EmbeddedExtractor),
    }
}

/// Copies the attached-picture stream out with ffmpeg. The output format
/// follows the extension of `dest`.
pub struct FfmpegExtractor {
    program: String,
}

impl FfmpegExtractor {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

impl ArtExtractor for FfmpegExtractor {
    fn extract(&self, source: &Path, dest: &Path) -> Result<(), ExtractionError> {
        debug!(program = %self.program, source = %source.display(), "running extractor");
        let status = Command::new(&self.program)
            .arg("-y")
            .arg("-i")
            .arg(source)
            .args(["-an", "-vcodec", "copy"])
            .arg(dest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| ExtractionError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ExtractionError::ToolFailed {
                program: self.program.clone(),
                status,
                path: source.to_path_buf(),
            });
        }
        Ok(())
    }
}

/// Reads the picture straight out of the file's tags, preferring the front
/// cover.
pub struct EmbeddedExtractor;

impl ArtExtractor for EmbeddedExtractor {
    fn extract(&self, source: &Path, dest: &Path) -> Result<(), ExtractionError> {
        let tagged = lofty::read_from_path(source).map_err(|e| ExtractionError::Tags {
            path: source.to_path_buf(),
            source: e,
        })?;

        let pictures: Vec<_> = tagged
            .tags()
            .iter()
            .flat_map(|tag| tag.pictures())
            .collect();
        let picture = pictures
            .iter()
            .find(|p| p.pic_type() == PictureType::CoverFront)
            .or_else(|| pictures.first())
            .ok_or_else(|| ExtractionError::NoPicture(source.to_path_buf()))?;

        fs::write(dest, picture.data())?;
        Ok(())
    }
}
