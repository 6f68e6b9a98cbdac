//! # Event Model
//!
//! This module defines the musical input of the converter and the settings
//! that travel with it.
//!
//! ## Type Hierarchy
//! ```text
//! Score
//!   ├── ScoreSettings (tempo, global transposition, loudness, events per line)
//!   ├── RenderSettings (ISiS flags, score file cleanup, ISiS path)
//!   └── Event
//!         ├── Simple(SimpleEvent)
//!         │     ├── duration: f64 (beats)
//!         │     ├── pitch_list: Option<Vec<Pitch>>
//!         │     ├── volume: Option<Volume>
//!         │     ├── vowel: Option<String>
//!         │     └── consonants: Option<Vec<String>>
//!         ├── Sequential(Vec<Event>)
//!         └── Simultaneous(Vec<Event>)
//! ```
//!
//! ## Key Concepts
//!
//! ### Attributes
//! Every attribute of a [`SimpleEvent`] except its duration is optional.
//! `None` means the attribute is absent, which is how a bare rest is written.
//! The extractor decides what an absent attribute means (see [`crate::extract`]).
//!
//! ### Rests
//! An event without pitches (no pitch list, or an empty one) is a rest.
//! Rests are sung as the silent vowel `_` on [`Pitch::REST`] with zero volume.
//!
//! ### Pitches
//! Pitches are MIDI pitch numbers and may be fractional. Western pitch names
//! (`c4`, `f#3`, `bb5`, `c-1`) are converted with middle C = `c4` = 60.
//!
//! ## Related Modules
//! - `parser` - Creates these types from YAML source
//! - `semantic` - Validates durations and phoneme tokens
//! - `extract` - Reads the attributes back out for the score file

use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

/// A pitch as understood by ISiS: a (possibly fractional) MIDI note number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pitch {
    midi_pitch_number: f64,
}

impl Pitch {
    /// Placeholder pitch of rests: `c-1`, the lowest MIDI note.
    pub const REST: Pitch = Pitch {
        midi_pitch_number: 0.0,
    };

    pub fn from_midi(midi_pitch_number: f64) -> Self {
        Self { midi_pitch_number }
    }

    pub fn midi_pitch_number(&self) -> f64 {
        self.midi_pitch_number
    }

    /// Parse a Western pitch name like "c4", "f#3", "bb", "ef2" or "c-1".
    ///
    /// Sharps are written `#` or `s`, flats `b` or `f`; accidentals may be
    /// doubled. The octave defaults to 4 when omitted.
    ///
    /// ```
    /// # use isis_score::Pitch;
    /// assert_eq!(Pitch::from_name("a4").unwrap().midi_pitch_number(), 69.0);
    /// assert_eq!(Pitch::from_name("c-1"), Some(Pitch::REST));
    /// assert_eq!(Pitch::from_name("h2"), None);
    /// ```
    pub fn from_name(s: &str) -> Option<Self> {
        let trimmed = s.trim().to_ascii_lowercase();
        let mut chars = trimmed.chars();

        let pitch_class: i32 = match chars.next()? {
            'c' => 0,
            'd' => 2,
            'e' => 4,
            'f' => 5,
            'g' => 7,
            'a' => 9,
            'b' => 11,
            _ => return None,
        };

        let rest = chars.as_str();
        let octave_start = rest
            .find(|c: char| c == '-' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (accidentals, octave) = rest.split_at(octave_start);

        let mut alteration = 0;
        for c in accidentals.chars() {
            alteration += match c {
                '#' | 's' => 1,
                'b' | 'f' => -1,
                _ => return None,
            };
        }

        let octave: i32 = if octave.is_empty() {
            4
        } else {
            octave.parse().ok()?
        };

        let midi = octave
            .checked_add(1)?
            .checked_mul(12)?
            .checked_add(pitch_class + alteration)?;
        Some(Self::from_midi(f64::from(midi)))
    }
}

/// Loudness of an event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Volume {
    /// Linear amplitude, 0 is silence
    Amplitude(f64),
    /// Decibels relative to full scale
    Decibel(f64),
}

impl Volume {
    pub const SILENT: Volume = Volume::Amplitude(0.0);

    pub fn amplitude(&self) -> f64 {
        match *self {
            Volume::Amplitude(amplitude) => amplitude,
            Volume::Decibel(decibel) => 10f64.powf(decibel / 20.0),
        }
    }
}

/// A single sung syllable (or a rest)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimpleEvent {
    pub duration: f64,
    pub pitch_list: Option<Vec<Pitch>>,
    pub volume: Option<Volume>,
    pub vowel: Option<String>,
    pub consonants: Option<Vec<String>>,
}

impl SimpleEvent {
    /// An event with only a duration. Without further attributes it is a rest.
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    pub fn with_pitch(self, pitch: Pitch) -> Self {
        self.with_pitches(vec![pitch])
    }

    pub fn with_pitches(mut self, pitches: Vec<Pitch>) -> Self {
        self.pitch_list = Some(pitches);
        self
    }

    pub fn with_volume(mut self, volume: Volume) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn with_vowel(mut self, vowel: impl Into<String>) -> Self {
        self.vowel = Some(vowel.into());
        self
    }

    pub fn with_consonants<I, S>(mut self, consonants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.consonants = Some(consonants.into_iter().map(Into::into).collect());
        self
    }
}

/// An event tree. ISiS only sings one voice, so `Simultaneous` is accepted
/// here but rejected on conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Simple(SimpleEvent),
    Sequential(Vec<Event>),
    Simultaneous(Vec<Event>),
}

impl Event {
    /// Total length in beats. Simultaneous voices last as long as the longest one.
    pub fn duration(&self) -> f64 {
        match self {
            Event::Simple(simple) => simple.duration,
            Event::Sequential(events) => events.iter().map(Event::duration).sum(),
            Event::Simultaneous(events) => events
                .iter()
                .map(Event::duration)
                .fold(0.0, f64::max),
        }
    }

    /// All simple events in depth-first order, including those of
    /// simultaneous voices.
    pub fn simple_events(&self) -> Vec<&SimpleEvent> {
        let mut out = Vec::new();
        self.collect_simple_events(&mut out);
        out
    }

    fn collect_simple_events<'a>(&'a self, out: &mut Vec<&'a SimpleEvent>) {
        match self {
            Event::Simple(simple) => out.push(simple),
            Event::Sequential(events) | Event::Simultaneous(events) => {
                for event in events {
                    event.collect_simple_events(out);
                }
            }
        }
    }
}

impl From<SimpleEvent> for Event {
    fn from(simple: SimpleEvent) -> Self {
        Event::Simple(simple)
    }
}

impl FromIterator<SimpleEvent> for Event {
    fn from_iter<I: IntoIterator<Item = SimpleEvent>>(iter: I) -> Self {
        Event::Sequential(iter.into_iter().map(Event::Simple).collect())
    }
}

/// Global parameters of the `[score]` section
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSettings {
    /// Beats per minute
    pub tempo: f64,
    /// Semitones, applied by ISiS itself
    pub global_transposition: i32,
    /// Kept for callers; not written to the score file
    pub default_sentence_loudness: Option<f64>,
    /// Formatting hint only, does not change the written data
    pub events_per_line: usize,
}

impl Default for ScoreSettings {
    fn default() -> Self {
        Self {
            tempo: 60.0,
            global_transposition: 0,
            default_sentence_loudness: None,
            events_per_line: 5,
        }
    }
}

/// How the ISiS executable gets called
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderSettings {
    /// Extra command line flags, appended in order after `-m` and `-o`
    pub flags: Vec<String>,
    pub remove_score_file: bool,
    /// Overrides the process-wide path from [`crate::render::isis_path`]
    pub isis_path: Option<PathBuf>,
    /// Treat a failing ISiS run as success (logged as a warning)
    pub ignore_exit_status: bool,
}

/// A parsed score source: settings plus the event to sing
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub settings: ScoreSettings,
    pub render: RenderSettings,
    pub event: Event,
}

/// Raw score document for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawScore {
    pub tempo: Option<f64>,
    pub global_transposition: Option<i32>,
    pub default_sentence_loudness: Option<f64>,
    pub events_per_line: Option<usize>,
    #[serde(default)]
    pub flags: Vec<String>,
    pub remove_score_file: Option<bool>,
    pub isis_path: Option<PathBuf>,
    pub ignore_exit_status: Option<bool>,
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

/// Raw event: a nested sequence, a set of voices or a simple event
#[derive(Debug)]
pub enum RawEvent {
    Sequential(RawSequential),
    Simultaneous(RawSimultaneous),
    Simple(RawSimpleEvent),
}

// Picks the variant by key so field errors (unknown or missing keys) are
// reported for the event they belong to.
impl<'de> Deserialize<'de> for RawEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_yaml::Value::deserialize(deserializer)?;
        let has_key = |key: &str| {
            value
                .as_mapping()
                .map_or(false, |mapping| mapping.contains_key(key))
        };
        let sequential = has_key("sequential");
        let simultaneous = has_key("simultaneous");

        let event = if sequential {
            RawSequential::deserialize(value).map(RawEvent::Sequential)
        } else if simultaneous {
            RawSimultaneous::deserialize(value).map(RawEvent::Simultaneous)
        } else {
            RawSimpleEvent::deserialize(value).map(RawEvent::Simple)
        };
        event.map_err(serde::de::Error::custom)
    }
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct RawSequential {
    pub sequential: Vec<RawEvent>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct RawSimultaneous {
    pub simultaneous: Vec<RawEvent>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawSimpleEvent {
    pub duration: f64,
    pub pitch: Option<RawPitchList>,
    pub volume: Option<RawVolume>,
    pub vowel: Option<String>,
    pub consonants: Option<Vec<String>>,
}

/// One pitch or a list of pitches
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum RawPitchList {
    One(RawPitch),
    Many(Vec<RawPitch>),
}

/// A pitch given as MIDI number (`60`, `61.5`) or name (`"c4"`)
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum RawPitch {
    Midi(f64),
    Name(String),
}

/// A volume given as amplitude (`0.5`) or in decibels (`{ decibel: -6 }`)
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum RawVolume {
    Amplitude(f64),
    Decibel { decibel: f64 },
}
