//! # Score Source Parser
//!
//! Reads a YAML score source into a [`Score`].
//!
//! ## Source Format
//! ```yaml
//! tempo: 90
//! global-transposition: -2
//! flags: [--quiet]
//! remove-score-file: true
//! events:
//!   - { duration: 1, pitch: c4, volume: 0.5, consonants: [t], vowel: a }
//!   - { duration: 1 }                 # rest
//!   - sequential:
//!       - { duration: 0.5, pitch: [e4, g4], volume: { decibel: -6 }, vowel: o }
//! ```
//!
//! Every key is optional except `duration`. Keys left out of an event are
//! absent attributes, so `{ duration: 1 }` is a rest. The top level `events`
//! list forms one sequential event.

use crate::error::IsisError;
use crate::event::*;

/// Parse a YAML score source
pub fn parse(source: &str) -> Result<Score, IsisError> {
    let raw: RawScore =
        serde_yaml::from_str(source).map_err(|e| IsisError::Metadata(e.to_string()))?;

    let defaults = ScoreSettings::default();
    let settings = ScoreSettings {
        tempo: raw.tempo.unwrap_or(defaults.tempo),
        global_transposition: raw
            .global_transposition
            .unwrap_or(defaults.global_transposition),
        default_sentence_loudness: raw.default_sentence_loudness,
        events_per_line: raw.events_per_line.unwrap_or(defaults.events_per_line),
    };

    let render = RenderSettings {
        flags: raw.flags,
        remove_score_file: raw.remove_score_file.unwrap_or(false),
        isis_path: raw.isis_path,
        ignore_exit_status: raw.ignore_exit_status.unwrap_or(false),
    };

    let events = raw
        .events
        .into_iter()
        .map(convert_event)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Score {
        settings,
        render,
        event: Event::Sequential(events),
    })
}

fn convert_event(raw: RawEvent) -> Result<Event, IsisError> {
    match raw {
        RawEvent::Sequential(RawSequential { sequential }) => Ok(Event::Sequential(
            sequential
                .into_iter()
                .map(convert_event)
                .collect::<Result<_, _>>()?,
        )),
        RawEvent::Simultaneous(RawSimultaneous { simultaneous }) => Ok(Event::Simultaneous(
            simultaneous
                .into_iter()
                .map(convert_event)
                .collect::<Result<_, _>>()?,
        )),
        RawEvent::Simple(simple) => Ok(Event::Simple(convert_simple_event(simple)?)),
    }
}

fn convert_simple_event(raw: RawSimpleEvent) -> Result<SimpleEvent, IsisError> {
    let pitch_list = match raw.pitch {
        None => None,
        Some(RawPitchList::One(pitch)) => Some(vec![convert_pitch(pitch)?]),
        Some(RawPitchList::Many(pitches)) => Some(
            pitches
                .into_iter()
                .map(convert_pitch)
                .collect::<Result<_, _>>()?,
        ),
    };

    let volume = raw.volume.map(|volume| match volume {
        RawVolume::Amplitude(amplitude) => Volume::Amplitude(amplitude),
        RawVolume::Decibel { decibel } => Volume::Decibel(decibel),
    });

    Ok(SimpleEvent {
        duration: raw.duration,
        pitch_list,
        volume,
        vowel: raw.vowel,
        consonants: raw.consonants,
    })
}

fn convert_pitch(raw: RawPitch) -> Result<Pitch, IsisError> {
    match raw {
        RawPitch::Midi(midi) => Ok(Pitch::from_midi(midi)),
        RawPitch::Name(name) => Pitch::from_name(&name)
            .ok_or_else(|| IsisError::Metadata(format!("Invalid pitch: {}", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let score = parse("events: []").unwrap();
        assert_eq!(score.settings, ScoreSettings::default());
        assert_eq!(score.render, RenderSettings::default());
        assert_eq!(score.event, Event::Sequential(vec![]));
    }

    #[test]
    fn test_settings() {
        let source = r#"
tempo: 90.5
global-transposition: -3
default-sentence-loudness: 0.8
events-per-line: 8
flags: [--quiet, --seed]
remove-score-file: true
isis-path: /opt/isis/isis.sh
ignore-exit-status: true
"#;
        let score = parse(source).unwrap();
        assert_eq!(score.settings.tempo, 90.5);
        assert_eq!(score.settings.global_transposition, -3);
        assert_eq!(score.settings.default_sentence_loudness, Some(0.8));
        assert_eq!(score.settings.events_per_line, 8);
        assert_eq!(score.render.flags, vec!["--quiet", "--seed"]);
        assert!(score.render.remove_score_file);
        assert_eq!(
            score.render.isis_path.as_deref(),
            Some(std::path::Path::new("/opt/isis/isis.sh"))
        );
        assert!(score.render.ignore_exit_status);
    }

    #[test]
    fn test_simple_events() {
        let source = r#"
events:
  - { duration: 2, pitch: c4, volume: 0.5, consonants: [t], vowel: a }
  - { duration: 1 }
  - { duration: 0.5, pitch: [e4, 67], volume: { decibel: -6 }, vowel: o }
"#;
        let score = parse(source).unwrap();
        let events = score.event.simple_events();
        assert_eq!(events.len(), 3);

        assert_eq!(
            *events[0],
            SimpleEvent::new(2.0)
                .with_pitch(Pitch::from_midi(60.0))
                .with_volume(Volume::Amplitude(0.5))
                .with_consonants(["t"])
                .with_vowel("a")
        );
        assert_eq!(*events[1], SimpleEvent::new(1.0));
        assert_eq!(
            events[2].pitch_list,
            Some(vec![Pitch::from_midi(64.0), Pitch::from_midi(67.0)])
        );
        assert_eq!(events[2].volume, Some(Volume::Decibel(-6.0)));
        assert_eq!(events[2].consonants, None);
    }

    #[test]
    fn test_nested_events() {
        let source = r#"
events:
  - sequential:
      - { duration: 1 }
      - { duration: 2 }
  - simultaneous:
      - { duration: 1 }
      - sequential:
          - { duration: 3 }
"#;
        let score = parse(source).unwrap();
        let Event::Sequential(events) = &score.event else {
            panic!("top level must be sequential");
        };
        assert!(matches!(events[0], Event::Sequential(ref inner) if inner.len() == 2));
        assert!(matches!(events[1], Event::Simultaneous(ref inner) if inner.len() == 2));
    }

    #[test]
    fn test_empty_pitch_list() {
        let score = parse("events: [{ duration: 3, pitch: [], vowel: '' }]").unwrap();
        let events = score.event.simple_events();
        assert_eq!(events[0].pitch_list, Some(vec![]));
        assert_eq!(events[0].vowel.as_deref(), Some(""));
    }

    #[test]
    fn test_invalid_pitch() {
        let result = parse("events: [{ duration: 1, pitch: h4 }]");
        assert!(matches!(result, Err(IsisError::Metadata(ref m)) if m == "Invalid pitch: h4"));

        let result = parse("events: [{ duration: 1, pitch: c999999999 }]");
        assert!(
            matches!(result, Err(IsisError::Metadata(ref m)) if m == "Invalid pitch: c999999999")
        );
    }

    fn metadata_error(source: &str) -> String {
        match parse(source) {
            Err(IsisError::Metadata(message)) => message,
            other => panic!("expected a metadata error, got {:?}", other),
        }
    }

    #[test]
    fn test_event_field_errors_are_named() {
        let message = metadata_error("events: [{ duration: 1, vowl: a }]");
        assert!(message.contains("unknown field `vowl`"), "{}", message);

        let message = metadata_error("events: [{ sequential: [{ pitch: c4 }] }]");
        assert!(message.contains("missing field `duration`"), "{}", message);

        let message = metadata_error("events: [{ sequential: [], vowel: a }]");
        assert!(message.contains("unknown field `vowel`"), "{}", message);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(parse("tempo: [fast"), Err(IsisError::Metadata(_))));
        assert!(matches!(parse("tempi: 60"), Err(IsisError::Metadata(_))));
        assert!(matches!(
            parse("events: [{ pitch: c4 }]"),
            Err(IsisError::Metadata(_))
        ));
    }
}
