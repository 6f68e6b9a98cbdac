//! # Semantic Validation Module
//!
//! Checks a parsed [`Score`] for values ISiS cannot read back.
//!
//! ## Validation Rules
//!
//! ### Durations
//! - Every simple event must last a positive, finite number of beats
//!
//! ### Pitches and Volumes
//! - MIDI pitch numbers and amplitudes must be finite (a decibel volume of
//!   `-.inf` is silence and allowed)
//!
//! ### Phoneme Tokens
//! - The score file is not escaped, so vowels and consonants must not contain
//!   `:`, `,` or whitespace
//! - Consonants must not be empty (an empty vowel is allowed, it is how some
//!   rests are written)
//!
//! ### Settings
//! - Tempo must be positive and finite
//! - At least one event per line
//!
//! Polyphony is not checked here; conversion rejects it on its own.
//!
//! ## Example
//! ```rust
//! use isis_score::{parse, validate};
//!
//! let score = parse("events: [{ duration: 1, pitch: c4, consonants: [l], vowel: a }]")?;
//! validate(&score)?;
//! # Ok::<(), isis_score::IsisError>(())
//! ```

use crate::error::IsisError;
use crate::event::{Score, ScoreSettings, SimpleEvent};

/// Validate a score for semantic correctness
pub fn validate(score: &Score) -> Result<(), IsisError> {
    validate_settings(&score.settings)?;
    for (index, event) in score.event.simple_events().into_iter().enumerate() {
        validate_event(event, index)?;
    }
    Ok(())
}

fn validate_settings(settings: &ScoreSettings) -> Result<(), IsisError> {
    if !(settings.tempo.is_finite() && settings.tempo > 0.0) {
        return Err(IsisError::Metadata(format!(
            "tempo must be a positive number, got {}",
            settings.tempo
        )));
    }
    if settings.events_per_line == 0 {
        return Err(IsisError::Metadata(
            "events-per-line must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_event(event: &SimpleEvent, index: usize) -> Result<(), IsisError> {
    if !(event.duration.is_finite() && event.duration > 0.0) {
        return Err(IsisError::InvalidEvent {
            index,
            message: format!("duration must be positive, got {}", event.duration),
        });
    }

    for pitch in event.pitch_list.iter().flatten() {
        if !pitch.midi_pitch_number().is_finite() {
            return Err(IsisError::InvalidEvent {
                index,
                message: format!("pitch must be finite, got {}", pitch.midi_pitch_number()),
            });
        }
    }

    if let Some(volume) = event.volume {
        if !volume.amplitude().is_finite() {
            return Err(IsisError::InvalidEvent {
                index,
                message: format!("volume must be finite, got {:?}", volume),
            });
        }
    }

    if let Some(vowel) = &event.vowel {
        check_token(vowel, "vowel", index)?;
    }

    for consonant in event.consonants.iter().flatten() {
        if consonant.is_empty() {
            return Err(IsisError::InvalidEvent {
                index,
                message: "consonants must not be empty".to_string(),
            });
        }
        check_token(consonant, "consonant", index)?;
    }

    Ok(())
}

fn check_token(token: &str, kind: &str, index: usize) -> Result<(), IsisError> {
    if let Some(c) = token
        .chars()
        .find(|c| *c == ':' || *c == ',' || c.is_whitespace())
    {
        return Err(IsisError::InvalidEvent {
            index,
            message: format!("{} '{}' contains forbidden character {:?}", kind, token, c),
        });
    }
    Ok(())
}
