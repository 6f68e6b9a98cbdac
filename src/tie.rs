//! Rest merging
//!
//! ISiS can't sing two rests in a row, so adjacent rests are tied into one
//! rest lasting as long as the whole run. The first rest of a run carries
//! the merged duration; its remaining attributes don't matter because rests
//! are always sung as the silent record.

use crate::extract::FieldExtractor;
use crate::event::SimpleEvent;
use tracing::debug;

/// Tie adjacent rests together, returning a new sequence.
///
/// Rests are detected with [`FieldExtractor::is_rest`]. Merging a sequence
/// without adjacent rests returns an identical sequence.
pub fn merge_rests<'a, I, X>(events: I, extractor: &X) -> Vec<SimpleEvent>
where
    I: IntoIterator<Item = &'a SimpleEvent>,
    X: FieldExtractor + ?Sized,
{
    let mut merged: Vec<SimpleEvent> = Vec::new();
    let mut previous_is_rest = false;

    for event in events {
        let is_rest = extractor.is_rest(event);
        let tie_target = if is_rest && previous_is_rest {
            merged.last_mut()
        } else {
            None
        };
        match tie_target {
            Some(last) => {
                last.duration += event.duration;
                debug!(duration = last.duration, "tied adjacent rests");
            }
            None => merged.push(event.clone()),
        }
        previous_is_rest = is_rest;
    }

    merged
}
