//! Read-only snapshots of the score at a single point.
//!
//! Every delta tells what is *established* at the point (in effect
//! there) and what is *changed* there (set exactly at the point). A
//! change is established at its own point as well.

use std::{
    collections::BTreeSet,
    fmt::Display,
    ops::Bound::{Excluded, Unbounded},
};

use itertools::Itertools;

use super::{Harmony, Score, Staff, Voice};
use crate::{
    harmony::{Chord, Key, Scale},
    primitives::{Clef, PitchSet, Rational, TimeSignature},
};

#[derive(Debug, Clone, PartialEq)]
pub struct VoiceDelta<'a> {
    pub location: Rational,
    /// Pitches in effect. Rest, if nothing was set yet.
    pub established: &'a PitchSet,
    /// Point, where the established pitches were set.
    pub onset: Option<Rational>,
    pub changed: Option<&'a PitchSet>,
}
impl<'a> VoiceDelta<'a> {
    fn new(voice: &'a Voice, at: Rational) -> Self {
        let notes = voice.notes();
        Self {
            location: at,
            established: notes.get_established(&at),
            onset: notes.floor_key(&at),
            changed: notes.get_changed(&at),
        }
    }

    /// Length of the note-head, that starts at the location.
    ///
    /// Known only after ties are resolved, and only at the points, where
    /// a head starts.
    pub fn notehead_length(&self) -> Option<Rational> {
        let mut head = self.onset?;
        for length in self.established.tied_values()? {
            if head == self.location {
                return Some(*length);
            }
            if head > self.location {
                break;
            }
            head += *length;
        }
        None
    }
}
impl Display for VoiceDelta<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.changed, self.notehead_length()) {
            (Some(changed), Some(length)) => write!(f, "{}:{}", changed, length),
            (Some(changed), None) => write!(f, "{}", changed),
            (None, Some(length)) => write!(f, "~{}:{}", self.established, length),
            (None, None) => write!(f, "~"),
        }
    }
}

/// Staff attributes, in effect at the point.
#[derive(Debug, Clone, PartialEq)]
pub struct StaffState<'a> {
    pub clef: &'a Clef,
    pub key: Option<&'a Key>,
    pub chord: &'a Chord,
    pub scale: Option<&'a Scale>,
}

/// Staff attributes, set exactly at the point.
#[derive(Debug, Clone, PartialEq)]
pub struct StaffChanges<'a> {
    pub clef: Option<&'a Clef>,
    pub key: Option<&'a Key>,
    pub chord: Option<&'a Chord>,
    pub scale: Option<&'a Scale>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaffDelta<'a> {
    pub location: Rational,
    pub established: StaffState<'a>,
    pub changed: StaffChanges<'a>,
    /// Key, set at the next point. Notation draws it before the barline,
    /// so it belongs to this delta.
    pub key_change_after: Option<&'a Key>,
    pub clef_change_after: Option<&'a Clef>,
    pub voices: Vec<VoiceDelta<'a>>,
}
impl<'a> StaffDelta<'a> {
    fn new(
        staff: &'a Staff,
        harmony: &'a Harmony,
        at: Rational,
        next: Option<Rational>,
    ) -> Self {
        let established = StaffState {
            clef: staff.clefs().get_established(&at),
            key: harmony.key_at(&at),
            chord: harmony.chord_at(&at),
            scale: harmony.scale_at(&at),
        };
        let changed = StaffChanges {
            clef: staff.clefs().get_changed(&at),
            key: harmony.keys.get_changed(&at),
            chord: harmony.chords.get_changed(&at),
            scale: harmony.scales.get_changed(&at),
        };
        Self {
            location: at,
            established,
            changed,
            key_change_after: next
                .and_then(|next| harmony.keys.get_changed(&next)),
            clef_change_after: next
                .and_then(|next| staff.clefs().get_changed(&next)),
            voices: staff
                .voices()
                .iter()
                .map(|voice| VoiceDelta::new(voice, at))
                .collect(),
        }
    }
}
impl Display for StaffDelta<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(clef) = self.changed.clef {
            write!(f, "{} ", clef)?;
        }
        if let Some(key) = self.changed.key {
            write!(f, "{{{}}} ", key)?;
        }
        match self.changed.chord {
            Some(chord) => write!(f, "{}: ", chord)?,
            None => write!(f, "~: ")?,
        }
        write!(f, "{}", self.voices.iter().join(" | "))
    }
}

/// Whole score at a point.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreDelta<'a> {
    pub location: Rational,
    pub established_time_signature: Option<TimeSignature>,
    pub changed_time_signature: Option<TimeSignature>,
    /// 1-based beat inside measure.
    pub beat: Option<Rational>,
    /// True if the next point (or fine) is a downbeat. `None` if meter
    /// is not defined there.
    pub is_end_of_measure: Option<bool>,
    /// True if no point follows before fine.
    pub precedes_fine: bool,
    pub time_change_after: Option<TimeSignature>,
    pub staves: Vec<StaffDelta<'a>>,
}
impl ScoreDelta<'_> {
    /// One line for debugging dumps.
    ///
    /// # Example
    /// ```
    /// # use rat_score::{dom::Score, primitives::{PitchSet, Rational, TimeSignature}};
    /// let mut score = Score::new(TimeSignature::new(3, 4), 1, Rational::ZERO);
    /// let staff = score.new_staff();
    /// let voice = score.new_voice(staff);
    /// score.voice_mut(staff, voice).put(Rational::ONE, PitchSet::from([0, 4]));
    /// assert_eq!(
    ///     score.score_delta_at(&Rational::ONE).summary(),
    ///     "1 [3/4 beat 1] | fine: ~: 0 4"
    /// );
    /// ```
    pub fn summary(&self) -> String {
        self.to_string()
    }
}
impl Display for ScoreDelta<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.location)?;
        match (self.established_time_signature, self.beat) {
            (Some(ts), Some(beat)) => write!(f, " [{} beat {}]", ts, beat)?,
            _ => write!(f, " [-]")?,
        }
        if self.is_end_of_measure == Some(true) {
            write!(f, " |")?;
        }
        if self.precedes_fine {
            write!(f, " fine")?;
        }
        write!(f, ": {}", self.staves.iter().join(" || "))
    }
}

/// Deltas over the rhythm of the score, forward or backward.
///
/// Rhythm is computed once, when the iterator is created.
#[derive(Debug)]
pub struct DeltaIter<'a> {
    score: &'a Score,
    rhythm: BTreeSet<Rational>,
    points: std::vec::IntoIter<Rational>,
}
impl<'a> Iterator for DeltaIter<'a> {
    type Item = ScoreDelta<'a>;
    fn next(&mut self) -> Option<Self::Item> {
        let at = self.points.next()?;
        Some(self.score.delta_with_rhythm(at, &self.rhythm))
    }
}

impl Score {
    /// Snapshot of the whole score at the point.
    ///
    /// Point does not have to be in the rhythm.
    pub fn score_delta_at(&self, at: &Rational) -> ScoreDelta<'_> {
        self.delta_with_rhythm(*at, &self.overall_rhythm())
    }

    pub(super) fn delta_with_rhythm(
        &self,
        at: Rational,
        rhythm: &BTreeSet<Rational>,
    ) -> ScoreDelta<'_> {
        let next = rhythm.range((Excluded(at), Unbounded)).next().copied();
        let boundary = next.unwrap_or(self.fine);
        ScoreDelta {
            location: at,
            established_time_signature: self.meter.signature_at(&at),
            changed_time_signature: self.meter.changed_at(&at),
            beat: self.beat_of(&at),
            is_end_of_measure: self
                .beat_of(&boundary)
                .map(|beat| beat == Rational::ONE),
            precedes_fine: next.is_none(),
            time_change_after: next
                .and_then(|next| self.meter.changed_at(&next)),
            staves: self
                .staves
                .iter()
                .map(|staff| {
                    let harmony = &self.harmonies[staff.harmony.0];
                    StaffDelta::new(staff, harmony, at, next)
                })
                .collect(),
        }
    }

    /// Deltas at rhythm points from `start` on, in ascending order.
    pub fn deltas_from(
        &self,
        start: &Rational,
        inclusive: bool,
    ) -> DeltaIter<'_> {
        let rhythm = self.overall_rhythm();
        let points = rhythm
            .iter()
            .filter(|at| **at > *start || (inclusive && **at == *start))
            .copied()
            .collect_vec();
        DeltaIter {
            score: self,
            rhythm,
            points: points.into_iter(),
        }
    }

    /// Deltas at rhythm points before `end`, in descending order.
    pub fn deltas_back_from(
        &self,
        end: &Rational,
        inclusive: bool,
    ) -> DeltaIter<'_> {
        let rhythm = self.overall_rhythm();
        let points = rhythm
            .iter()
            .rev()
            .filter(|at| **at < *end || (inclusive && **at == *end))
            .copied()
            .collect_vec();
        DeltaIter {
            score: self,
            rhythm,
            points: points.into_iter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use crate::{
        dom::{DeltaIter, Score},
        harmony::{Chord, Key, KeyMode},
        primitives::{Clef, PitchSet, Rational, TimeSignature},
    };

    fn r(num: i64, den: i64) -> Rational {
        Rational::new(num, den).unwrap()
    }

    /// Two bars of 2/4 with a key change and a clef change at the
    /// second bar.
    fn score() -> Score {
        let mut score = Score::new(TimeSignature::new(2, 4), 2, Rational::ZERO);
        let staff = score.new_staff();
        let voice = score.new_voice(staff);
        let notes = score.voice_mut(staff, voice);
        notes.put(r(1, 1), PitchSet::from([0]));
        notes.put(r(2, 1), PitchSet::from([2]));
        notes.put(r(3, 1), PitchSet::from([4]));
        notes.put(r(7, 2), PitchSet::rest());
        let harmony = score.harmony_mut(staff);
        harmony.chords.put(r(1, 1), Chord::with_root([0, 4, 7], 0));
        harmony.keys.put(r(3, 1), Key::new(1, KeyMode::Major));
        score.staff_mut(staff).clefs_mut().put(r(3, 1), Clef::Bass);
        score
    }

    #[test]
    fn test_delta_at_point() {
        let score = score();
        let delta = score.score_delta_at(&r(2, 1));
        assert_eq!(
            delta.established_time_signature,
            Some(TimeSignature::new(2, 4))
        );
        assert_eq!(delta.changed_time_signature, None);
        assert_eq!(delta.beat, Some(r(2, 1)));
        assert_eq!(delta.is_end_of_measure, Some(true));
        assert!(!delta.precedes_fine);

        let staff = &delta.staves[0];
        assert_eq!(staff.established.clef, &Clef::Treble);
        assert_eq!(staff.established.key, None);
        assert_eq!(staff.established.chord.root(), Some(0));
        assert_eq!(staff.changed.chord, None);
        assert_eq!(staff.key_change_after, Some(&Key::new(1, KeyMode::Major)));
        assert_eq!(staff.clef_change_after, Some(&Clef::Bass));

        let voice = &staff.voices[0];
        assert_eq!(voice.established, &PitchSet::from([2]));
        assert_eq!(voice.changed, Some(&PitchSet::from([2])));
        assert_eq!(voice.onset, Some(r(2, 1)));
    }

    #[test]
    fn test_established_between_points() {
        let score = score();
        let delta = score.score_delta_at(&r(5, 2));
        let voice = &delta.staves[0].voices[0];
        assert_eq!(voice.changed, None);
        assert_eq!(voice.established, &PitchSet::from([2]));
        assert_eq!(delta.is_end_of_measure, Some(true));
        assert_eq!(delta.beat, Some(r(5, 2)));

        let delta = score.score_delta_at(&r(1, 2));
        assert_eq!(delta.beat, None);
        assert_eq!(delta.established_time_signature, None);
        assert_eq!(delta.is_end_of_measure, Some(true));
        assert!(delta.staves[0].voices[0].established.is_rest());
        assert_eq!(delta.staves[0].voices[0].onset, None);
    }

    #[test]
    fn test_last_point() {
        let score = score();
        let delta = score.score_delta_at(&r(7, 2));
        assert!(delta.precedes_fine);
        assert_eq!(delta.is_end_of_measure, Some(true));
        assert_eq!(delta.staves[0].established.clef, &Clef::Bass);
        assert_eq!(delta.staves[0].established.key.map(|k| k.fifths), Some(1));
        assert_eq!(delta.time_change_after, None);
    }

    #[test]
    fn test_iteration() {
        let score = score();
        let locations = |deltas: DeltaIter| deltas.map(|d| d.location).collect_vec();
        let forward = locations(score.deltas_from(&r(2, 1), true));
        assert_eq!(forward, vec![r(2, 1), r(3, 1), r(7, 2)]);
        let forward = locations(score.deltas_from(&r(2, 1), false));
        assert_eq!(forward, vec![r(3, 1), r(7, 2)]);
        let backward = locations(score.deltas_back_from(&score.fine(), false));
        assert_eq!(backward, vec![r(7, 2), r(3, 1), r(2, 1), r(1, 1)]);
        let backward = locations(score.deltas_back_from(&r(3, 1), true));
        assert_eq!(backward, vec![r(3, 1), r(2, 1), r(1, 1)]);
    }

    #[test]
    fn test_summary() {
        let mut score = score();
        score.resolve_ties(1);
        let summaries = score
            .deltas_from(&r(3, 1), true)
            .map(|delta| delta.summary())
            .collect_vec();
        assert_eq!(
            summaries,
            vec![
                "3 [2/4 beat 1]: bass {G major} ~: 4:1/2",
                "7/2 [2/4 beat 3/2] | fine: ~: rest:3/2",
            ]
        );
    }
}
