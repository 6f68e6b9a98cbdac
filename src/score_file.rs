//! # ISiS Score Files
//!
//! Writes extracted records as an ISiS score file: two sections of
//! colon-delimited keys.
//!
//! ```text
//! [lyrics]
//! xsampa: t a _ t a
//!
//! [score]
//! globalTransposition: 0
//! tempo: 60
//! midiNotes: 60, 0, 60
//! rhythm: 2, 7, 2
//! loud_accents: 0.5, 0, 0.5
//!
//! ```
//!
//! `xsampa` lists the phonemes of every record, consonants first. The three
//! lists of the score section hold exactly one entry per record.
//!
//! Nothing is escaped; [`crate::validate`] rejects tokens that would break
//! the format.

use crate::constants::{SECTION_LYRIC_NAME, SECTION_SCORE_NAME};
use crate::error::IsisError;
use crate::event::{Event, ScoreSettings};
use crate::extract::{extract, AttributeExtractor, ExtractedFields, FieldExtractor};
use std::fs;
use std::path::Path;
use tracing::info;

/// Converts events to ISiS score files
#[derive(Debug, Clone)]
pub struct IsisScoreConverter<X = AttributeExtractor> {
    settings: ScoreSettings,
    extractor: X,
}

impl IsisScoreConverter {
    pub fn new(settings: ScoreSettings) -> Self {
        Self::with_extractor(settings, AttributeExtractor)
    }
}

impl Default for IsisScoreConverter {
    fn default() -> Self {
        Self::new(ScoreSettings::default())
    }
}

impl<X: FieldExtractor> IsisScoreConverter<X> {
    pub fn with_extractor(settings: ScoreSettings, extractor: X) -> Self {
        Self {
            settings,
            extractor,
        }
    }

    pub fn settings(&self) -> &ScoreSettings {
        &self.settings
    }

    /// Render the score file text for an event.
    ///
    /// # Errors
    /// [`IsisError::UnsupportedShape`] for polyphonic events.
    pub fn to_score_file(&self, event: &Event) -> Result<String, IsisError> {
        let records = extract(event, &self.extractor)?;
        Ok(format_score_file(&records, &self.settings))
    }

    /// Write the score file for an event to `path`, replacing any existing file.
    ///
    /// Nothing is written if the event can't be converted.
    pub fn convert(&self, event: &Event, path: impl AsRef<Path>) -> Result<(), IsisError> {
        let path = path.as_ref();
        let text = self.to_score_file(event)?;
        fs::write(path, text).map_err(|e| IsisError::io(path, e))?;
        info!(path = %path.display(), "wrote ISiS score file");
        Ok(())
    }
}

/// Format records as score file text
pub fn format_score_file(records: &[ExtractedFields], settings: &ScoreSettings) -> String {
    let mut out = String::new();
    write_section(&mut out, SECTION_LYRIC_NAME, &lyric_section(records));
    write_section(&mut out, SECTION_SCORE_NAME, &score_section(records, settings));
    out
}

fn lyric_section(records: &[ExtractedFields]) -> Vec<(&'static str, String)> {
    let xsampa = records
        .iter()
        .flat_map(|record| record.phonemes())
        .collect::<Vec<_>>()
        .join(" ");
    vec![("xsampa", xsampa)]
}

fn score_section(
    records: &[ExtractedFields],
    settings: &ScoreSettings,
) -> Vec<(&'static str, String)> {
    vec![
        (
            "globalTransposition",
            settings.global_transposition.to_string(),
        ),
        ("tempo", settings.tempo.to_string()),
        (
            "midiNotes",
            join_list(records, |r| r.pitch.midi_pitch_number()),
        ),
        ("rhythm", join_list(records, |r| r.duration)),
        ("loud_accents", join_list(records, |r| r.volume.amplitude())),
    ]
}

fn join_list(records: &[ExtractedFields], value: impl Fn(&ExtractedFields) -> f64) -> String {
    records
        .iter()
        .map(|record| value(record).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_section(out: &mut String, name: &str, entries: &[(&str, String)]) {
    out.push_str(&format!("[{}]\n", name));
    for (key, value) in entries {
        out.push_str(&format!("{}: {}\n", key, value));
    }
    out.push('\n');
}
