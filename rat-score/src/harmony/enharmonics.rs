//! Choice of letter names for pitches.
//!
//! Spelling is chosen on the line of fifths: every pitch class has
//! infinitely many spellings there (`... Dbb, C, B#, A###...`), 12
//! fifths apart. The key picks a window of 12 neighbouring spellings,
//! the chord root makes intervals above it read as thirds and fifths,
//! and the following pitches make chromatic steps read as steps.

use super::{Chord, Key};
use crate::primitives::{parse_note_name, NoteName, PitchSet, Spelling};

/// Spelling service, used by the score to fill name caches.
pub trait Enharmonics {
    /// Spelling of every chord member, in ascending order of classes.
    fn spell_chord(&self, chord: &Chord, key: &Key) -> Vec<Spelling>;

    /// Note names of the pitches, in ascending order.
    fn spell_pitches(
        &self,
        pitches: &PitchSet,
        chord: &Chord,
        key: &Key,
    ) -> Vec<String>;

    /// Note names of the pitches, knowing what sounds next.
    ///
    /// By default, the next pitches are ignored.
    fn spell_leading(
        &self,
        pitches: &PitchSet,
        chord: &Chord,
        key: &Key,
        next: &PitchSet,
        next_chord: &Chord,
    ) -> Vec<String> {
        let _ = (next, next_chord);
        self.spell_pitches(pitches, chord, key)
    }
}

/// Position on line of fifths of the interval above chord root.
const INTERVAL_FIFTHS: [i32; 12] = [0, -5, 2, -3, 4, -1, -6, 1, -4, 3, -2, 5];

/// Spells by key signature, chord root and half-step voice leading.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeySpeller;
impl KeySpeller {
    pub fn new() -> Self {
        Self
    }

    /// Spelling of the pitch class, closest to the key's center.
    ///
    /// # Example
    /// ```
    /// # use rat_score::harmony::{Key, KeyMode, KeySpeller};
    /// let speller = KeySpeller::new();
    /// let f_major = Key::new(-1, KeyMode::Major);
    /// assert_eq!(speller.spell_class(10, &f_major).to_string(), "Bb");
    /// assert_eq!(speller.spell_class(10, &Key::new(5, KeyMode::Major)).to_string(), "A#");
    /// ```
    pub fn spell_class(&self, class: i32, key: &Key) -> Spelling {
        let center = key.spelling_center();
        let fifths = (7 * class).rem_euclid(12);
        let below = center - 6 + (fifths - (center - 6)).rem_euclid(12);
        Spelling::from_fifths(below)
    }

    fn chord_spelling(&self, chord: &Chord, key: &Key) -> Vec<Spelling> {
        match chord.spelling() {
            Some(spelling) => spelling.to_vec(),
            None => self.spell_chord(chord, key),
        }
    }

    fn spell_pitch(
        &self,
        pitch: i32,
        chord: &Chord,
        spelling: &[Spelling],
        key: &Key,
    ) -> Spelling {
        let class = pitch.rem_euclid(12);
        if chord.modulus().octave_steps() == 12 {
            if let Some(index) = chord.iter().position(|member| member == class) {
                return spelling[index];
            }
        }
        self.spell_class(class, key)
    }

    /// Spelling of the pitch with the given letter, if it needs no more
    /// than two accidentals.
    fn with_letter(pitch: i32, name: NoteName) -> Option<Spelling> {
        let mut accidental = (pitch - name.natural_class()).rem_euclid(12);
        if accidental > 6 {
            accidental -= 12;
        }
        match accidental.abs() <= 2 {
            true => Some(Spelling::new(name, accidental)),
            false => None,
        }
    }

    fn is_diatonic(spelling: &Spelling, key: &Key) -> bool {
        (key.fifths - 1..=key.fifths + 5).contains(&spelling.fifths())
    }

    fn neighbour_letter(name: NoteName, step: i32) -> NoteName {
        const LETTERS: [NoteName; 7] = [
            NoteName::C,
            NoteName::D,
            NoteName::E,
            NoteName::F,
            NoteName::G,
            NoteName::A,
            NoteName::B,
        ];
        LETTERS[(name.step() + step).rem_euclid(7) as usize]
    }
}
impl Enharmonics for KeySpeller {
    fn spell_chord(&self, chord: &Chord, key: &Key) -> Vec<Spelling> {
        if chord.modulus().octave_steps() != 12 {
            return chord
                .iter()
                .map(|class| self.spell_class(class, key))
                .collect();
        }
        match chord.root() {
            Some(root) => {
                let root_fifths = self.spell_class(root, key).fifths();
                chord
                    .iter()
                    .map(|class| {
                        let interval = (class - root).rem_euclid(12);
                        Spelling::from_fifths(
                            root_fifths + INTERVAL_FIFTHS[interval as usize],
                        )
                    })
                    .collect()
            }
            None => chord
                .iter()
                .map(|class| self.spell_class(class, key))
                .collect(),
        }
    }

    fn spell_pitches(
        &self,
        pitches: &PitchSet,
        chord: &Chord,
        key: &Key,
    ) -> Vec<String> {
        let spelling = self.chord_spelling(chord, key);
        pitches
            .iter()
            .map(|pitch| {
                self.spell_pitch(pitch, chord, &spelling, key)
                    .name_pitch(pitch)
            })
            .collect()
    }

    /// Chromatic non-chord tones, that move by half step into the next
    /// pitches, take the letter next to the letter of their resolution.
    ///
    /// # Example
    /// ```
    /// # use rat_score::{harmony::{Chord, Enharmonics, Key, KeySpeller}, primitives::PitchSet};
    /// let speller = KeySpeller::new();
    /// let c_major = Chord::with_root([0, 4, 7], 0);
    /// let g_major = Chord::with_root([7, 11, 2], 7);
    /// let names = speller.spell_leading(
    ///     &PitchSet::from([6]),
    ///     &c_major,
    ///     &Key::c_major(),
    ///     &PitchSet::from([7]),
    ///     &g_major,
    /// );
    /// assert_eq!(names, vec!["F#4"]);
    /// let names = speller.spell_leading(
    ///     &PitchSet::from([6]),
    ///     &c_major,
    ///     &Key::c_major(),
    ///     &PitchSet::from([5]),
    ///     &g_major,
    /// );
    /// assert_eq!(names, vec!["Gb4"]);
    /// ```
    fn spell_leading(
        &self,
        pitches: &PitchSet,
        chord: &Chord,
        key: &Key,
        next: &PitchSet,
        next_chord: &Chord,
    ) -> Vec<String> {
        let spelling = self.chord_spelling(chord, key);
        let next_names = match next.note_names() {
            Some(names) => names.to_vec(),
            None => self.spell_pitches(next, next_chord, key),
        };
        let next_spelling = next
            .iter()
            .zip(next_names.iter())
            .filter_map(|(pitch, name)| {
                parse_note_name(name).ok().map(|(spelling, _)| (pitch, spelling))
            })
            .collect::<Vec<_>>();
        pitches
            .iter()
            .map(|pitch| {
                let mut result = self.spell_pitch(pitch, chord, &spelling, key);
                if !chord.contains(pitch) && !Self::is_diatonic(&result, key) {
                    let resolution = [1, -1].into_iter().find_map(|direction| {
                        next_spelling
                            .iter()
                            .find(|(next_pitch, _)| *next_pitch == pitch + direction)
                            .and_then(|(_, next)| {
                                let name = Self::neighbour_letter(next.name, -direction);
                                Self::with_letter(pitch, name)
                            })
                    });
                    if let Some(resolution) = resolution {
                        result = resolution;
                    }
                }
                result.name_pitch(pitch)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Enharmonics, KeySpeller};
    use crate::{
        harmony::{Chord, Key, KeyMode},
        primitives::PitchSet,
    };

    fn names(spelling: Vec<crate::primitives::Spelling>) -> Vec<String> {
        spelling.into_iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_key_window() {
        let speller = KeySpeller::new();
        let c_major = Key::c_major();
        let spelled = (0..12)
            .map(|class| speller.spell_class(class, &c_major).to_string())
            .collect::<Vec<_>>();
        assert_eq!(
            spelled,
            vec!["C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B"]
        );
        let a_minor = Key::new(0, KeyMode::Minor);
        assert_eq!(speller.spell_class(8, &a_minor).to_string(), "G#");
        let e_flat = Key::new(-3, KeyMode::Major);
        assert_eq!(speller.spell_class(8, &e_flat).to_string(), "Ab");
        assert_eq!(speller.spell_class(1, &e_flat).to_string(), "Db");
        let b_major = Key::new(5, KeyMode::Major);
        assert_eq!(speller.spell_class(3, &b_major).to_string(), "D#");
    }

    #[test]
    fn test_chords() {
        let speller = KeySpeller::new();
        let key = Key::c_major();
        let b_dim7 = Chord::with_root([11, 2, 5, 8], 11);
        assert_eq!(
            names(speller.spell_chord(&b_dim7, &key)),
            vec!["D", "F", "G#", "B"]
        );
        let e_major = Chord::with_root([4, 8, 11], 4);
        assert_eq!(names(speller.spell_chord(&e_major, &key)), vec!["E", "G#", "B"]);
        let a_flat = Chord::with_root([8, 0, 3], 8);
        assert_eq!(names(speller.spell_chord(&a_flat, &key)), vec!["C", "Eb", "Ab"]);
        let rootless = Chord::from_iter([1, 6]);
        assert_eq!(names(speller.spell_chord(&rootless, &key)), vec!["C#", "F#"]);
    }

    #[test]
    fn test_pitches() {
        let speller = KeySpeller::new();
        let key = Key::c_major();
        let e_major = Chord::with_root([4, 8, 11], 4);
        let set = PitchSet::from([-16, -4, 8, 12]);
        assert_eq!(
            speller.spell_pitches(&set, &e_major, &key),
            vec!["G#2", "G#3", "G#4", "C5"]
        );
        let c_sharp = Chord::with_root([1, 5, 8], 1);
        let names = speller.spell_pitches(&PitchSet::from([0, 1]), &c_sharp, &key);
        assert_eq!(names, vec!["C4", "C#4"]);
    }

    #[test]
    fn test_leading_keeps_chord_tones() {
        let speller = KeySpeller::new();
        let key = Key::c_major();
        let chord = Chord::with_root([8, 0, 3], 8);
        let mut next = PitchSet::from([9]);
        next.set_note_names(vec!["A4".to_string()]);
        let names = speller.spell_leading(
            &PitchSet::from([8]),
            &chord,
            &key,
            &next,
            &Chord::no_chord(),
        );
        assert_eq!(names, vec!["Ab4"]);
        let names = speller.spell_leading(
            &PitchSet::from([8]),
            &Chord::no_chord(),
            &key,
            &next,
            &Chord::no_chord(),
        );
        assert_eq!(names, vec!["G#4"]);
        let names = speller.spell_leading(
            &PitchSet::from([4]),
            &Chord::no_chord(),
            &key,
            &PitchSet::from([3]),
            &Chord::no_chord(),
        );
        assert_eq!(names, vec!["E4"]);
    }
}
