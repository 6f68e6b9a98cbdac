//! # Rendering with ISiS
//!
//! Writes a score file next to the requested output and runs ISiS on it:
//!
//! ```text
//! isis.sh -m <output>.isis_score -o <output> [flags...]
//! ```
//!
//! ISiS runs synchronously with inherited stdio, without timeout. A failing
//! run is reported as [`IsisError::ExternalTool`] unless the converter is
//! told to ignore exit codes.
//!
//! ## ISiS Location
//! The executable defaults to [`ISIS_PATH`](crate::constants::ISIS_PATH).
//! Call [`set_isis_path`] once at startup to change it for the whole
//! process, or set [`RenderSettings::isis_path`] per converter.
//!
//! Two conversions writing the same output path at the same time clobber
//! each other's score file; use distinct paths.

use crate::constants::{ISIS_PATH, SCORE_FILE_SUFFIX};
use crate::error::IsisError;
use crate::event::{Event, RenderSettings};
use crate::extract::{AttributeExtractor, FieldExtractor};
use crate::score_file::IsisScoreConverter;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;
use tracing::{info, warn};

static ISIS_EXECUTABLE: OnceLock<PathBuf> = OnceLock::new();

/// Set the process-wide ISiS executable.
///
/// Only the first call wins, and only if [`isis_path`] hasn't been read yet.
/// Returns the rejected path otherwise.
pub fn set_isis_path(path: impl Into<PathBuf>) -> Result<(), PathBuf> {
    ISIS_EXECUTABLE.set(path.into())
}

/// The process-wide ISiS executable
pub fn isis_path() -> &'static Path {
    ISIS_EXECUTABLE.get_or_init(|| PathBuf::from(ISIS_PATH))
}

/// `<path>.isis_score`
pub fn score_file_path(path: &Path) -> PathBuf {
    let mut score_path = OsString::from(path.as_os_str());
    score_path.push(".");
    score_path.push(SCORE_FILE_SUFFIX);
    PathBuf::from(score_path)
}

/// Renders events to audio files by calling ISiS
#[derive(Debug, Clone)]
pub struct IsisConverter<X = AttributeExtractor> {
    score_converter: IsisScoreConverter<X>,
    settings: RenderSettings,
}

impl<X: FieldExtractor> IsisConverter<X> {
    pub fn new(score_converter: IsisScoreConverter<X>, settings: RenderSettings) -> Self {
        Self {
            score_converter,
            settings,
        }
    }

    pub fn score_converter(&self) -> &IsisScoreConverter<X> {
        &self.score_converter
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// The executable this converter runs
    pub fn program(&self) -> &Path {
        // closure, so the process-wide `&'static Path` shortens to `&self`
        self.settings.isis_path.as_deref().unwrap_or_else(|| isis_path())
    }

    /// Build the ISiS invocation for a score file and an output path
    pub fn command(&self, score_path: &Path, path: &Path) -> Command {
        let mut command = Command::new(self.program());
        command
            .arg("-m")
            .arg(score_path)
            .arg("-o")
            .arg(path)
            .args(&self.settings.flags);
        command
    }

    /// Render `event` into the audio file at `path`.
    ///
    /// The score file is removed afterwards if configured, also when ISiS
    /// fails.
    ///
    /// # Errors
    /// - [`IsisError::UnsupportedShape`] for polyphonic events (nothing is written or run)
    /// - [`IsisError::Io`] if the score file can't be written or removed
    /// - [`IsisError::Launch`] if ISiS can't be started
    /// - [`IsisError::ExternalTool`] if ISiS exits unsuccessfully
    pub fn convert(&self, event: &Event, path: impl AsRef<Path>) -> Result<(), IsisError> {
        let path = path.as_ref();
        let score_path = score_file_path(path);
        self.score_converter.convert(event, &score_path)?;

        let program = self.program().to_path_buf();
        info!(
            program = %program.display(),
            output = %path.display(),
            beats = event.duration(),
            "rendering with ISiS"
        );
        let status = self.command(&score_path, path).status();

        if self.settings.remove_score_file {
            fs::remove_file(&score_path).map_err(|e| IsisError::io(&score_path, e))?;
        }

        let status = status.map_err(|source| IsisError::Launch {
            program: program.clone(),
            source,
        })?;

        if !status.success() {
            if self.settings.ignore_exit_status {
                warn!(%status, program = %program.display(), "ignoring failed ISiS run");
            } else {
                return Err(IsisError::ExternalTool { program, status });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ScoreSettings;

    fn converter(settings: RenderSettings) -> IsisConverter {
        IsisConverter::new(IsisScoreConverter::new(ScoreSettings::default()), settings)
    }

    #[test]
    fn test_score_file_path() {
        assert_eq!(
            score_file_path(Path::new("out/song.wav")),
            PathBuf::from("out/song.wav.isis_score")
        );
    }

    #[test]
    fn test_command_line() {
        let converter = converter(RenderSettings {
            flags: vec!["--quiet".to_string(), "--seed".to_string(), "7".to_string()],
            isis_path: Some(PathBuf::from("/opt/isis/isis.sh")),
            ..RenderSettings::default()
        });
        let command = converter.command(Path::new("a.wav.isis_score"), Path::new("a.wav"));
        assert_eq!(command.get_program(), "/opt/isis/isis.sh");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(
            args,
            vec!["-m", "a.wav.isis_score", "-o", "a.wav", "--quiet", "--seed", "7"]
        );
    }

    #[test]
    fn test_default_program() {
        let converter = converter(RenderSettings::default());
        assert_eq!(converter.program(), isis_path());
    }
}
