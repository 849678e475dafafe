//! Splitting sustained pitches into tied note-heads.

use itertools::Itertools;

use super::Score;
use crate::primitives::{fraction_tools::head_lengths, Meter, Rational};

/// Note-head lengths of a sound from `begin` to `end`.
///
/// Sound is cut at every barline inside, and every measured segment is
/// split into the largest heads with up to `max_dots` dots. Lengths sum
/// to `end - begin`.
///
/// # Example
/// ```
/// # use rat_score::{dom::tie_lengths, primitives::{Meter, Rational, TimeSignature}};
/// let mut meter = Meter::new();
/// meter.put(Rational::ONE, TimeSignature::new(4, 4));
/// let r = |n, d| Rational::new(n, d).unwrap();
/// assert_eq!(
///     tie_lengths(&meter, r(4, 1), r(8, 1), 1),
///     vec![r(1, 1), r(3, 1)]
/// );
/// assert_eq!(
///     tie_lengths(&meter, r(1, 1), r(11, 1), 0),
///     vec![r(4, 1), r(4, 1), r(2, 1)]
/// );
/// ```
pub fn tie_lengths(
    meter: &Meter,
    begin: Rational,
    end: Rational,
    max_dots: u8,
) -> Vec<Rational> {
    if end <= begin {
        return Vec::new();
    }
    let mut bounds = vec![begin];
    bounds.extend(meter.barlines_between(&begin, &end));
    bounds.push(end);
    bounds
        .into_iter()
        .tuple_windows()
        .flat_map(|(from, to)| head_lengths(to - from, max_dots))
        .collect()
}

impl Score {
    /// Fill tie arrays of every changed pitch set before fine.
    ///
    /// Pitch set sounds until the next change in its voice, or until
    /// fine. Existing tie arrays are overwritten.
    pub fn resolve_ties(&mut self, max_dots: u8) {
        let fine = self.fine;
        let meter = &self.meter;
        for (staff_index, staff) in self.staves.iter_mut().enumerate() {
            for (voice_index, voice) in staff.voices.iter_mut().enumerate() {
                let points = voice.notes().rhythm().copied().collect_vec();
                let ends = points.iter().skip(1).copied().chain([fine]);
                for (begin, end) in points.iter().copied().zip(ends) {
                    let Some(notes) = voice.notes_mut().get_changed_mut(&begin)
                    else {
                        continue;
                    };
                    if begin >= fine {
                        notes.clear_tied_values();
                        continue;
                    }
                    let end = end.min(fine);
                    let heads = tie_lengths(meter, begin, end, max_dots);
                    log::trace!(
                        "staff {}, voice {}: {} at {} tied as {:?}",
                        staff_index,
                        voice_index,
                        notes,
                        begin,
                        heads
                    );
                    notes.set_tied_values(heads);
                }
            }
        }
        log::debug!("ties resolved with {} dots", max_dots);
    }

    /// Clear every tie array.
    pub fn strip_ties(&mut self) {
        let voices = self.staves.iter_mut().flat_map(|s| s.voices.iter_mut());
        for voice in voices {
            for notes in voice.notes_mut().values_mut() {
                notes.clear_tied_values();
            }
        }
    }
}
