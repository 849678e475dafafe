//! Filling name caches of chords, scales and pitch sets.
//!
//! Names are chosen walking backward from fine, so every pitch set is
//! spelled knowing what sounds after it. A key change cuts this
//! look-ahead: material before the change is spelled in its own key.

use crate::{
    harmony::{Chord, Enharmonics},
    primitives::{PitchSet, Rational},
};

use super::Score;

/// Last named material of a staff, to the right of the current point.
#[derive(Debug, Clone, Default)]
struct LookAhead {
    chord: Option<Chord>,
    voices: Vec<Option<PitchSet>>,
}
impl LookAhead {
    fn new(voices: usize) -> Self {
        Self {
            chord: None,
            voices: vec![None; voices],
        }
    }
    fn reset(&mut self) {
        self.chord = None;
        self.voices.iter_mut().for_each(|voice| *voice = None);
    }
}

impl Score {
    /// Name every chord, scale and pitch set, that is not named yet.
    ///
    /// Running twice changes nothing: names have to be stripped with
    /// [`Score::strip_enharmonics`] before spelling again.
    pub fn fill_enharmonics(&mut self, speller: &impl Enharmonics) {
        self.fill_enharmonics_inner(None, speller)
    }

    /// Same as [`Score::fill_enharmonics`], but stops at `start`.
    pub fn fill_enharmonics_from(
        &mut self,
        start: &Rational,
        speller: &impl Enharmonics,
    ) {
        self.fill_enharmonics_inner(Some(*start), speller)
    }

    fn fill_enharmonics_inner(
        &mut self,
        start: Option<Rational>,
        speller: &impl Enharmonics,
    ) {
        let points = self
            .overall_rhythm()
            .into_iter()
            .rev()
            .take_while(|at| start.map_or(true, |start| *at >= start))
            .collect::<Vec<_>>();
        let mut look_ahead = self
            .staves
            .iter()
            .map(|staff| LookAhead::new(staff.voices.len()))
            .collect::<Vec<_>>();
        let fallback_key = self.settings.fallback_key;

        for at in points {
            for (index, staff) in self.staves.iter_mut().enumerate() {
                let harmony = &mut self.harmonies[staff.harmony.0];
                let key = harmony.key_at(&at).copied().unwrap_or(fallback_key);

                let chord = match harmony.chords.established_entry_mut(&at) {
                    Some((_, chord)) => {
                        if chord.spelling().is_none() {
                            let spelling = speller.spell_chord(chord, &key);
                            chord.set_spelling(spelling);
                        }
                        chord.clone()
                    }
                    None => Chord::no_chord(),
                };
                if let Some((_, scale)) = harmony.scales.established_entry_mut(&at) {
                    if scale.spelling().is_none() {
                        let spelling = speller.spell_chord(scale.chord(), &key);
                        scale.set_spelling(spelling);
                    }
                }

                let ahead = &mut look_ahead[index];
                for (voice, next) in staff.voices.iter_mut().zip(ahead.voices.iter_mut()) {
                    let Some((_, notes)) = voice.notes_mut().established_entry_mut(&at)
                    else {
                        *next = None;
                        continue;
                    };
                    if notes.note_names().is_none() {
                        let names = match (next.as_ref(), ahead.chord.as_ref()) {
                            (Some(next), next_chord) => speller.spell_leading(
                                notes,
                                &chord,
                                &key,
                                next,
                                next_chord.unwrap_or(&chord),
                            ),
                            (None, _) => speller.spell_pitches(notes, &chord, &key),
                        };
                        notes.set_note_names(names);
                    }
                    *next = Some(notes.clone());
                }
                ahead.chord = Some(chord);

                if harmony.keys.get_changed(&at).is_some() {
                    log::debug!(
                        "staff {}: key change at {}, look-ahead reset",
                        index,
                        at
                    );
                    ahead.reset();
                }
            }
        }
    }

    /// Clear names of every chord, scale and pitch set.
    pub fn strip_enharmonics(&mut self) {
        for harmony in self.harmonies.iter_mut() {
            harmony.chords.values_mut().for_each(|c| c.clear_spelling());
            harmony.scales.values_mut().for_each(|s| s.clear_spelling());
        }
        let voices = self.staves.iter_mut().flat_map(|s| s.voices.iter_mut());
        for voice in voices {
            for notes in voice.notes_mut().values_mut() {
                notes.clear_note_names();
            }
        }
    }

    /// Clear names and tie arrays.
    pub fn strip_caches(&mut self) {
        self.strip_enharmonics();
        self.strip_ties();
    }

    /// Strip every cache, spell with `speller` and resolve ties with
    /// dots from settings.
    pub fn refresh_caches(&mut self, speller: &impl Enharmonics) {
        self.strip_caches();
        self.fill_enharmonics(speller);
        self.resolve_ties(self.settings.max_dots);
    }
}
