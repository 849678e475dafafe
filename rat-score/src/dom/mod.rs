//! Score model: Score → Staff → Voice, all made of Timelines.
//!
//! Harmony layers (chords, keys, scales) live in an arena inside the
//! Score, and every Staff refers to one of them by [`HarmonyId`]. Linked
//! staves hold the same id, so a chord put into one of them is seen by
//! all of them. Independent staves own a harmony each.

use std::collections::BTreeSet;

use crate::{
    config::AnalysisSettings,
    errors::RationalResult,
    harmony::{Chord, Key, Scale},
    primitives::{Clef, Meter, PitchSet, Rational, TimeSignature, Timeline},
};

pub mod delta;
pub mod guess;
pub mod spelling;
pub mod ties;

pub use delta::{
    DeltaIter, ScoreDelta, StaffChanges, StaffDelta, StaffState, VoiceDelta,
};
pub use guess::GuessedNames;
pub use ties::tie_lengths;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Voice {
    notes: Timeline<PitchSet>,
}
impl Voice {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn notes(&self) -> &Timeline<PitchSet> {
        &self.notes
    }
    pub fn notes_mut(&mut self) -> &mut Timeline<PitchSet> {
        &mut self.notes
    }
    /// Set pitches, sounding from the point until the next change.
    pub fn put(&mut self, at: Rational, notes: PitchSet) -> Option<PitchSet> {
        self.notes.put(at, notes)
    }
    pub fn remove(&mut self, at: &Rational) -> Option<PitchSet> {
        self.notes.remove(at)
    }
}

/// Index of [`Harmony`] in Score arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HarmonyId(usize);

/// Harmony layers, shared by linked staves.
///
/// Without any key set, key is unknown: [`Harmony::key_at`] returns
/// `None`, and analysis uses the fallback key from settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Harmony {
    pub chords: Timeline<Chord>,
    pub keys: Timeline<Key>,
    pub scales: Timeline<Scale>,
}
impl Harmony {
    pub fn new() -> Self {
        let key = Key::c_major();
        Self {
            chords: Timeline::new(Chord::no_chord()),
            keys: Timeline::new(key),
            scales: Timeline::new(key.scale()),
        }
    }
    pub fn key_at(&self, at: &Rational) -> Option<&Key> {
        self.keys.established_entry(at).map(|(_, key)| key)
    }
    pub fn scale_at(&self, at: &Rational) -> Option<&Scale> {
        self.scales.established_entry(at).map(|(_, scale)| scale)
    }
    pub fn chord_at(&self, at: &Rational) -> &Chord {
        self.chords.get_established(at)
    }
}
impl Default for Harmony {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Staff {
    harmony: HarmonyId,
    clefs: Timeline<Clef>,
    voices: Vec<Voice>,
    pub title: Option<String>,
    /// Semitones between written and sounding pitch.
    pub transposition: i32,
}
impl Staff {
    fn new(harmony: HarmonyId) -> Self {
        Self {
            harmony,
            clefs: Timeline::default(),
            voices: Vec::new(),
            title: None,
            transposition: 0,
        }
    }
    pub fn harmony_id(&self) -> HarmonyId {
        self.harmony
    }
    pub fn clefs(&self) -> &Timeline<Clef> {
        &self.clefs
    }
    pub fn clefs_mut(&mut self) -> &mut Timeline<Clef> {
        &mut self.clefs
    }
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }
    pub fn voice(&self, index: usize) -> &Voice {
        &self.voices[index]
    }
    pub fn voice_mut(&mut self, index: usize) -> &mut Voice {
        &mut self.voices[index]
    }
}

/// Whole piece: meter, end point, staves, and harmony arena.
///
/// Time `1` is the downbeat of the first full measure. Everything
/// before it is a pickup.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    meter: Meter,
    fine: Rational,
    staves: Vec<Staff>,
    harmonies: Vec<Harmony>,
    settings: AnalysisSettings,
}
impl Score {
    /// Score of `bars` measures, with time signature set at `1 +
    /// pickup`. Pickup may be any length, like a dotted eighth.
    ///
    /// # Panics
    ///
    /// If there are no bars.
    ///
    /// # Example
    /// ```
    /// # use rat_score::{dom::Score, primitives::{Rational, TimeSignature}};
    /// let score = Score::new(TimeSignature::new(4, 4), 4, Rational::ZERO);
    /// assert_eq!(score.fine(), Rational::from(17));
    /// assert_eq!(score.meter().timeline().len(), 1);
    /// ```
    pub fn new(time_signature: TimeSignature, bars: u32, pickup: Rational) -> Self {
        assert!(bars > 0, "score should have at least one bar");
        let bars = Rational::from(i64::from(bars));
        let fine = Rational::ONE + bars * time_signature.beats();
        let mut meter = Meter::new();
        meter.put(Rational::ONE + pickup, time_signature);
        Self {
            meter,
            fine,
            staves: Vec::new(),
            harmonies: Vec::new(),
            settings: AnalysisSettings::default(),
        }
    }

    pub fn meter(&self) -> &Meter {
        &self.meter
    }
    pub fn meter_mut(&mut self) -> &mut Meter {
        &mut self.meter
    }
    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }
    pub fn settings_mut(&mut self) -> &mut AnalysisSettings {
        &mut self.settings
    }

    pub fn fine(&self) -> Rational {
        self.fine
    }
    /// Move the end of the score.
    ///
    /// Shortening never deletes anything, so lengthening back restores
    /// the content. Lengthening puts "no chord" and "rest" at the old end
    /// on every chord and voice layer, that has nothing from there on,
    /// so the last sound is not prolonged to the new end.
    pub fn set_fine(&mut self, fine: Rational) {
        let old = self.fine;
        if fine > old {
            for id in self.used_harmonies() {
                let chords = &mut self.harmonies[id.0].chords;
                if !chords.has_entries_from(&old) {
                    chords.put(old, Chord::no_chord());
                }
            }
            let voices =
                self.staves.iter_mut().flat_map(|s| s.voices.iter_mut());
            for voice in voices {
                if !voice.notes.has_entries_from(&old) {
                    voice.put(old, PitchSet::rest());
                }
            }
            log::debug!("fine moved from {} to {}", old, fine);
        }
        self.fine = fine;
    }

    /// Add staff, linked to harmony of the first staff.
    ///
    /// # Returns
    /// Index of the new staff.
    pub fn new_staff(&mut self) -> usize {
        match self.staves.first().map(|first| first.harmony) {
            None => self.new_independent_staff(),
            Some(harmony) => {
                self.staves.push(Staff::new(harmony));
                self.staves.len() - 1
            }
        }
    }
    /// Add staff with its own harmony.
    pub fn new_independent_staff(&mut self) -> usize {
        self.harmonies.push(Harmony::new());
        let id = HarmonyId(self.harmonies.len() - 1);
        self.staves.push(Staff::new(id));
        self.staves.len() - 1
    }
    /// # Returns
    /// Index of the new voice inside the staff.
    pub fn new_voice(&mut self, staff: usize) -> usize {
        let staff = &mut self.staves[staff];
        staff.voices.push(Voice::new());
        staff.voices.len() - 1
    }
    /// Remove staff. Following staves are renumbered, harmony is
    /// dropped, if no other staff uses it.
    ///
    /// # Panics
    ///
    /// If index is out of range.
    pub fn remove_staff(&mut self, index: usize) {
        let removed = self.staves.remove(index).harmony;
        if self.staves.iter().any(|staff| staff.harmony == removed) {
            return;
        }
        self.harmonies.remove(removed.0);
        for staff in self.staves.iter_mut() {
            if staff.harmony > removed {
                staff.harmony = HarmonyId(staff.harmony.0 - 1);
            }
        }
    }
    pub fn swap_staves(&mut self, a: usize, b: usize) {
        self.staves.swap(a, b);
    }

    pub fn staves(&self) -> &[Staff] {
        &self.staves
    }
    pub fn staff(&self, index: usize) -> &Staff {
        &self.staves[index]
    }
    pub fn staff_mut(&mut self, index: usize) -> &mut Staff {
        &mut self.staves[index]
    }
    pub fn voice(&self, staff: usize, voice: usize) -> &Voice {
        self.staff(staff).voice(voice)
    }
    pub fn voice_mut(&mut self, staff: usize, voice: usize) -> &mut Voice {
        self.staff_mut(staff).voice_mut(voice)
    }
    /// Harmony of the staff.
    pub fn harmony(&self, staff: usize) -> &Harmony {
        &self.harmonies[self.staff(staff).harmony.0]
    }
    pub fn harmony_mut(&mut self, staff: usize) -> &mut Harmony {
        let id = self.staff(staff).harmony;
        &mut self.harmonies[id.0]
    }
    pub fn are_linked(&self, a: usize, b: usize) -> bool {
        self.staff(a).harmony == self.staff(b).harmony
    }

    fn used_harmonies(&self) -> BTreeSet<HarmonyId> {
        self.staves.iter().map(|staff| staff.harmony).collect()
    }

    /// Every point before fine, where anything changes: time
    /// signatures, barlines, all layers of all staves, and tied
    /// note-heads.
    pub fn overall_rhythm(&self) -> BTreeSet<Rational> {
        let mut rhythm = BTreeSet::new();
        rhythm.extend(self.meter.timeline().rhythm().copied());
        rhythm.extend(self.meter.downbeats(&self.fine));
        for id in self.used_harmonies() {
            let harmony = &self.harmonies[id.0];
            rhythm.extend(harmony.chords.rhythm().copied());
            rhythm.extend(harmony.keys.rhythm().copied());
            rhythm.extend(harmony.scales.rhythm().copied());
        }
        for staff in self.staves.iter() {
            rhythm.extend(staff.clefs.rhythm().copied());
            for voice in staff.voices.iter() {
                for (at, notes) in voice.notes.iter() {
                    rhythm.insert(*at);
                    let Some(tied) = notes.tied_values() else {
                        continue;
                    };
                    let mut head = *at;
                    for length in tied.iter() {
                        head += *length;
                        rhythm.insert(head);
                    }
                }
            }
        }
        rhythm.retain(|at| *at < self.fine);
        rhythm
    }

    /// 1-based beat of the point inside its measure.
    pub fn beat_of(&self, at: &Rational) -> Option<Rational> {
        self.meter.beat_of(at)
    }

    /// Nearest point to the floating-point time, with precision from
    /// settings.
    pub fn point_from_f64(&self, time: f64) -> RationalResult<Rational> {
        Rational::nearest(time, self.settings.nearest_epsilon)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::Score;
    use crate::{
        harmony::Chord,
        primitives::{PitchSet, Rational, TimeSignature},
    };

    fn r(num: i64, den: i64) -> Rational {
        Rational::new(num, den).unwrap()
    }

    #[test]
    fn test_construction() {
        let score = Score::new(TimeSignature::new(4, 4), 4, Rational::ZERO);
        assert_eq!(score.fine(), r(17, 1));
        assert_eq!(
            score.meter().timeline().rhythm().collect_vec(),
            vec![&r(1, 1)]
        );
        let pickup = Score::new(TimeSignature::new(3, 4), 2, Rational::ONE);
        assert_eq!(pickup.fine(), r(7, 1));
        assert_eq!(
            pickup.meter().changed_at(&r(2, 1)),
            Some(TimeSignature::new(3, 4))
        );
    }

    #[test]
    #[should_panic]
    fn test_no_bars() {
        Score::new(TimeSignature::new(4, 4), 0, Rational::ZERO);
    }

    #[test]
    fn test_linked_staves() {
        let mut score = Score::new(TimeSignature::new(4, 4), 2, Rational::ZERO);
        let first = score.new_staff();
        let linked = score.new_staff();
        let independent = score.new_independent_staff();
        assert!(score.are_linked(first, linked));
        assert!(!score.are_linked(first, independent));
        score
            .harmony_mut(linked)
            .chords
            .put(r(1, 1), Chord::with_root([0, 4, 7], 0));
        assert_eq!(score.harmony(first).chord_at(&r(3, 1)).root(), Some(0));
        assert!(score.harmony(independent).chord_at(&r(3, 1)).is_no_chord());
        assert_eq!(score.harmony(first).key_at(&r(3, 1)), None);

        score.remove_staff(first);
        assert_eq!(score.staves().len(), 2);
        assert_eq!(score.harmony(0).chord_at(&r(3, 1)).root(), Some(0));
        score.remove_staff(0);
        assert!(score.harmony(0).chords.is_empty());
        assert_eq!(score.harmonies.len(), 1);
    }

    #[test]
    fn test_swap_staves() {
        let mut score = Score::new(TimeSignature::new(4, 4), 2, Rational::ZERO);
        let a = score.new_staff();
        let b = score.new_independent_staff();
        score.staff_mut(a).title = Some("Flute".to_string());
        score.staff_mut(b).transposition = -2;
        score.swap_staves(a, b);
        assert_eq!(score.staff(0).transposition, -2);
        assert_eq!(score.staff(1).title.as_deref(), Some("Flute"));
    }

    #[test]
    fn test_set_fine() {
        let mut score = Score::new(TimeSignature::new(4, 4), 2, Rational::ZERO);
        let staff = score.new_staff();
        let empty = score.new_voice(staff);
        let filled = score.new_voice(staff);
        score.voice_mut(staff, filled).put(r(1, 1), PitchSet::from([0]));
        score.voice_mut(staff, filled).put(r(9, 1), PitchSet::from([2]));

        score.set_fine(r(17, 1));
        assert_eq!(score.fine(), r(17, 1));
        let notes_at = |voice: usize| {
            score.voice(staff, voice).notes().get_changed(&r(9, 1)).cloned()
        };
        assert_eq!(notes_at(empty), Some(PitchSet::rest()));
        assert_eq!(notes_at(filled), Some(PitchSet::from([2])));
        let chords = &score.harmony(staff).chords;
        assert!(chords.get_changed(&r(9, 1)).unwrap().is_no_chord());

        let before = score.clone();
        score.set_fine(r(17, 1));
        assert_eq!(score, before);

        score.set_fine(r(5, 1));
        assert_eq!(score.voice(staff, filled).notes().len(), 2);
        assert_eq!(
            score.overall_rhythm().into_iter().collect_vec(),
            vec![r(1, 1)]
        );
    }

    #[test]
    fn test_overall_rhythm() {
        let mut score = Score::new(TimeSignature::new(3, 4), 3, Rational::ZERO);
        let staff = score.new_staff();
        let voice = score.new_voice(staff);
        let mut tied = PitchSet::from([0]);
        tied.set_tied_values(vec![r(2, 1), r(1, 1), r(3, 2)]);
        score.voice_mut(staff, voice).put(r(3, 2), tied);
        score.voice_mut(staff, voice).put(r(8, 1), PitchSet::rest());
        assert_eq!(
            score.overall_rhythm().into_iter().collect_vec(),
            vec![
                r(1, 1),
                r(3, 2),
                r(7, 2),
                r(4, 1),
                r(9, 2),
                r(6, 1),
                r(7, 1),
                r(8, 1)
            ]
        );
        assert_eq!(score.beat_of(&r(9, 2)), Some(r(3, 2)));
        assert_eq!(score.point_from_f64(4.5).unwrap(), r(9, 2));
    }
}
