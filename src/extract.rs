//! # Field Extraction
//!
//! Turns an [`Event`] into the per-syllable records written to the score file.
//!
//! ## Pipeline
//! 1. Flatten nested sequential events, rejecting simultaneous voices
//! 2. Merge adjacent rests (see [`crate::tie`])
//! 3. Extract consonants, vowel, pitch and volume from each event, in that order
//!
//! ## Rest Fallback
//! Extraction is all-or-nothing. If the event is a rest, or if any single
//! field is missing, the record becomes [`ExtractedFields::rest`]: silent
//! vowel `_`, no consonants, [`Pitch::REST`] and zero volume. The duration
//! always survives.
//!
//! ## Custom Extractors
//! [`FieldExtractor`] has a default for every field, so a custom extractor
//! only overrides what it needs:
//!
//! ```rust
//! use isis_score::{FieldExtractor, MissingAttribute, SimpleEvent};
//!
//! /// Sings every syllable on "a" unless told otherwise
//! struct DefaultVowel;
//!
//! impl FieldExtractor for DefaultVowel {
//!     fn vowel(&self, event: &SimpleEvent) -> Result<String, MissingAttribute> {
//!         Ok(event.vowel.clone().unwrap_or_else(|| "a".to_string()))
//!     }
//! }
//! ```

use crate::error::IsisError;
use crate::event::{Event, Pitch, SimpleEvent, Volume};
use crate::tie::merge_rests;
use thiserror::Error;
use tracing::debug;

/// An extraction function found nothing to extract
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("missing attribute '{0}'")]
pub struct MissingAttribute(pub &'static str);

/// Reads score fields out of simple events.
///
/// The defaults read the attributes of [`SimpleEvent`] directly.
pub trait FieldExtractor {
    fn consonants(&self, event: &SimpleEvent) -> Result<Vec<String>, MissingAttribute> {
        event
            .consonants
            .clone()
            .ok_or(MissingAttribute("consonants"))
    }

    fn vowel(&self, event: &SimpleEvent) -> Result<String, MissingAttribute> {
        event.vowel.clone().ok_or(MissingAttribute("vowel"))
    }

    /// Only the first pitch is sung
    fn pitch(&self, event: &SimpleEvent) -> Result<Pitch, MissingAttribute> {
        event
            .pitch_list
            .as_ref()
            .and_then(|pitches| pitches.first().copied())
            .ok_or(MissingAttribute("pitch_list"))
    }

    fn volume(&self, event: &SimpleEvent) -> Result<Volume, MissingAttribute> {
        event.volume.ok_or(MissingAttribute("volume"))
    }

    fn is_rest(&self, event: &SimpleEvent) -> bool {
        event
            .pitch_list
            .as_ref()
            .map_or(true, |pitches| pitches.is_empty())
    }
}

/// Extractor reading the event attributes as they are
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeExtractor;

impl FieldExtractor for AttributeExtractor {}

/// Everything the score file needs to know about one syllable
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFields {
    pub duration: f64,
    pub consonants: Vec<String>,
    pub vowel: String,
    pub pitch: Pitch,
    pub volume: Volume,
}

impl ExtractedFields {
    pub const REST_VOWEL: &'static str = "_";

    /// The silent record ISiS sings for rests
    pub fn rest(duration: f64) -> Self {
        Self {
            duration,
            consonants: Vec::new(),
            vowel: Self::REST_VOWEL.to_string(),
            pitch: Pitch::REST,
            volume: Volume::SILENT,
        }
    }

    /// Consonants followed by the vowel
    pub fn phonemes(&self) -> impl Iterator<Item = &str> {
        self.consonants
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.vowel.as_str()))
    }
}

/// Outcome of extracting a single event
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Sung(ExtractedFields),
    Rest { duration: f64 },
}

impl Extraction {
    pub fn into_fields(self) -> ExtractedFields {
        match self {
            Extraction::Sung(fields) => fields,
            Extraction::Rest { duration } => ExtractedFields::rest(duration),
        }
    }
}

/// Extract one event, falling back to a rest if anything is missing
pub fn extract_event<X: FieldExtractor + ?Sized>(
    event: &SimpleEvent,
    extractor: &X,
) -> Extraction {
    let duration = event.duration;
    if extractor.is_rest(event) {
        return Extraction::Rest { duration };
    }
    match extract_fields(event, extractor) {
        Ok(fields) => Extraction::Sung(fields),
        Err(missing) => {
            debug!(duration, %missing, "singing event as rest");
            Extraction::Rest { duration }
        }
    }
}

fn extract_fields<X: FieldExtractor + ?Sized>(
    event: &SimpleEvent,
    extractor: &X,
) -> Result<ExtractedFields, MissingAttribute> {
    let consonants = extractor.consonants(event)?;
    let vowel = extractor.vowel(event)?;
    let pitch = extractor.pitch(event)?;
    let volume = extractor.volume(event)?;
    Ok(ExtractedFields {
        duration: event.duration,
        consonants,
        vowel,
        pitch,
        volume,
    })
}

/// Flatten an event into the order its simple events are sung.
///
/// # Errors
/// Returns [`IsisError::UnsupportedShape`] if the event contains simultaneous
/// voices anywhere. ISiS is a monophonic synthesizer.
pub fn flatten(event: &Event) -> Result<Vec<&SimpleEvent>, IsisError> {
    let mut out = Vec::new();
    flatten_into(event, &mut out)?;
    Ok(out)
}

fn flatten_into<'a>(event: &'a Event, out: &mut Vec<&'a SimpleEvent>) -> Result<(), IsisError> {
    match event {
        Event::Simple(simple) => out.push(simple),
        Event::Sequential(events) => {
            for event in events {
                flatten_into(event, out)?;
            }
        }
        Event::Simultaneous(_) => {
            return Err(IsisError::UnsupportedShape(
                "polyphonic input; ISiS is a monophonic synthesizer and can't \
                 sing simultaneous voices"
                    .to_string(),
            ))
        }
    }
    Ok(())
}

/// Run the whole extraction pipeline: flatten, merge rests, extract
pub fn extract<X: FieldExtractor + ?Sized>(
    event: &Event,
    extractor: &X,
) -> Result<Vec<ExtractedFields>, IsisError> {
    let flat = flatten(event)?;
    let merged = merge_rests(flat, extractor);
    Ok(merged
        .iter()
        .map(|event| extract_event(event, extractor).into_fields())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(duration: f64) -> SimpleEvent {
        SimpleEvent::new(duration)
            .with_pitch(Pitch::from_midi(60.0))
            .with_volume(Volume::Amplitude(0.5))
            .with_consonants(["t"])
            .with_vowel("a")
    }

    #[test]
    fn test_extract_note() {
        let fields = extract_event(&note(2.0), &AttributeExtractor).into_fields();
        assert_eq!(fields.duration, 2.0);
        assert_eq!(fields.consonants, vec!["t"]);
        assert_eq!(fields.vowel, "a");
        assert_eq!(fields.pitch, Pitch::from_midi(60.0));
        assert_eq!(fields.volume, Volume::Amplitude(0.5));
    }

    #[test]
    fn test_only_first_pitch_is_sung() {
        let event = note(1.0).with_pitches(vec![Pitch::from_midi(64.0), Pitch::from_midi(67.0)]);
        let fields = extract_event(&event, &AttributeExtractor).into_fields();
        assert_eq!(fields.pitch, Pitch::from_midi(64.0));
    }

    #[test]
    fn test_bare_event_is_rest() {
        let extraction = extract_event(&SimpleEvent::new(3.0), &AttributeExtractor);
        assert_eq!(extraction, Extraction::Rest { duration: 3.0 });
        assert_eq!(extraction.into_fields(), ExtractedFields::rest(3.0));
    }

    #[test]
    fn test_empty_pitch_list_is_rest() {
        let event = note(3.0).with_pitches(vec![]);
        assert_eq!(
            extract_event(&event, &AttributeExtractor),
            Extraction::Rest { duration: 3.0 }
        );
    }

    #[test]
    fn test_missing_field_falls_back_to_rest() {
        let mut event = note(1.5);
        event.volume = None;
        assert_eq!(
            extract_event(&event, &AttributeExtractor),
            Extraction::Rest { duration: 1.5 }
        );

        let mut event = note(1.5);
        event.consonants = None;
        assert_eq!(
            extract_event(&event, &AttributeExtractor),
            Extraction::Rest { duration: 1.5 }
        );
    }

    #[test]
    fn test_rest_record() {
        let rest = ExtractedFields::rest(2.0);
        assert_eq!(rest.phonemes().collect::<Vec<_>>(), vec!["_"]);
        assert_eq!(rest.pitch.midi_pitch_number(), 0.0);
        assert_eq!(rest.volume.amplitude(), 0.0);
    }

    #[test]
    fn test_custom_extractor() {
        struct Loud;
        impl FieldExtractor for Loud {
            fn volume(&self, _: &SimpleEvent) -> Result<Volume, MissingAttribute> {
                Ok(Volume::Amplitude(1.0))
            }
        }

        let mut event = note(1.0);
        event.volume = None;
        let fields = extract_event(&event, &Loud).into_fields();
        assert_eq!(fields.volume, Volume::Amplitude(1.0));
        assert_eq!(fields.vowel, "a");
    }

    #[test]
    fn test_extraction_order() {
        use std::cell::RefCell;

        #[derive(Default)]
        struct Recording(RefCell<Vec<&'static str>>);
        impl FieldExtractor for Recording {
            fn consonants(&self, _: &SimpleEvent) -> Result<Vec<String>, MissingAttribute> {
                self.0.borrow_mut().push("consonants");
                Ok(vec![])
            }
            fn vowel(&self, _: &SimpleEvent) -> Result<String, MissingAttribute> {
                self.0.borrow_mut().push("vowel");
                Ok("a".to_string())
            }
            fn pitch(&self, _: &SimpleEvent) -> Result<Pitch, MissingAttribute> {
                self.0.borrow_mut().push("pitch");
                Err(MissingAttribute("pitch"))
            }
            fn volume(&self, _: &SimpleEvent) -> Result<Volume, MissingAttribute> {
                self.0.borrow_mut().push("volume");
                Ok(Volume::SILENT)
            }
            fn is_rest(&self, _: &SimpleEvent) -> bool {
                false
            }
        }

        let extractor = Recording::default();
        let extraction = extract_event(&SimpleEvent::new(1.0), &extractor);
        assert_eq!(extraction, Extraction::Rest { duration: 1.0 });
        assert_eq!(*extractor.0.borrow(), vec!["consonants", "vowel", "pitch"]);
    }

    #[test]
    fn test_flatten_nested() {
        let event = Event::Sequential(vec![
            note(1.0).into(),
            Event::Sequential(vec![note(2.0).into(), note(3.0).into()]),
        ]);
        let flat = flatten(&event).unwrap();
        assert_eq!(flat.iter().map(|e| e.duration).collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_flatten_rejects_polyphony() {
        let event = Event::Sequential(vec![
            note(1.0).into(),
            Event::Simultaneous(vec![note(1.0).into(), note(1.0).into()]),
        ]);
        assert!(matches!(flatten(&event), Err(IsisError::UnsupportedShape(_))));
    }

    #[test]
    fn test_extract_merges_rests() {
        let event: Event = vec![
            note(2.0),
            SimpleEvent::new(4.0),
            SimpleEvent::new(3.0).with_pitches(vec![]),
            note(2.0),
        ]
        .into_iter()
        .collect();
        let records = extract(&event, &AttributeExtractor).unwrap();
        let durations: Vec<f64> = records.iter().map(|r| r.duration).collect();
        assert_eq!(durations, vec![2.0, 7.0, 2.0]);
        assert_eq!(records[1], ExtractedFields::rest(7.0));
    }
}
