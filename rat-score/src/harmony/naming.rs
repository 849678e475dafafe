//! Root and name candidates for a set of pitch classes.

use std::{cmp::Reverse, collections::BTreeMap, fmt::Display};

use once_cell::sync::Lazy;

use super::{Chord, Key, KeySpeller};
use crate::primitives::Spelling;

/// Chord name, split into root and characteristic (`"m7"` in `"Dm7"`).
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct NamedRoot {
    pub root: i32,
    pub root_spelling: Spelling,
    pub characteristic: String,
}
impl NamedRoot {
    pub fn name(&self) -> String {
        format!("{}{}", self.root_spelling, self.characteristic)
    }
}
impl Display for NamedRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Ranked candidates: the best score comes first.
pub type RankedNames = BTreeMap<Reverse<i32>, Vec<NamedRoot>>;

/// Scores every possible root of chord in context of key.
pub trait ChordNamer {
    fn name_candidates(&self, chord: &Chord, key: &Key) -> RankedNames;
}

struct Template {
    characteristic: &'static str,
    intervals: &'static [i32],
}

static TEMPLATES: Lazy<Vec<Template>> = Lazy::new(|| {
    let table: [(&'static str, &'static [i32]); 14] = [
        ("", &[0, 4, 7]),
        ("m", &[0, 3, 7]),
        ("dim", &[0, 3, 6]),
        ("aug", &[0, 4, 8]),
        ("sus4", &[0, 5, 7]),
        ("sus2", &[0, 2, 7]),
        ("7", &[0, 4, 7, 10]),
        ("M7", &[0, 4, 7, 11]),
        ("m7", &[0, 3, 7, 10]),
        ("m7b5", &[0, 3, 6, 10]),
        ("dim7", &[0, 3, 6, 9]),
        ("6", &[0, 4, 7, 9]),
        ("m6", &[0, 3, 7, 9]),
        ("5", &[0, 7]),
    ];
    table
        .into_iter()
        .map(|(characteristic, intervals)| Template {
            characteristic,
            intervals,
        })
        .collect()
});

const MATCHED: i32 = 10;
const MISSING: i32 = 6;
const EXTRA: i32 = 8;
const ROOT_PRESENT: i32 = 4;
const ROOT_DIATONIC: i32 = 2;
const ROOT_IS_TONIC: i32 = 1;

/// Matches chord against templates of common chords on every root.
///
/// Every matched template tone adds to the score, every missing or
/// extra tone subtracts. Roots present in chord, diatonic to the key, or
/// being its tonic are preferred. Only positive scores are returned.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateNamer {
    speller: KeySpeller,
}
impl TemplateNamer {
    pub fn new() -> Self {
        Self::default()
    }
}
impl ChordNamer for TemplateNamer {
    fn name_candidates(&self, chord: &Chord, key: &Key) -> RankedNames {
        let mut ranked = RankedNames::new();
        if chord.modulus().octave_steps() != 12 || chord.is_empty() {
            return ranked;
        }
        let scale = key.scale();
        for root in 0..12 {
            let mut bonus = 0;
            if chord.contains(root) {
                bonus += ROOT_PRESENT;
            }
            if scale.contains(root) {
                bonus += ROOT_DIATONIC;
            }
            if root == key.tonic() {
                bonus += ROOT_IS_TONIC;
            }
            for template in TEMPLATES.iter() {
                let template_chord =
                    Chord::from_iter(template.intervals.iter().map(|i| root + i));
                let matched =
                    chord.iter().filter(|c| template_chord.contains(*c)).count();
                if matched == 0 {
                    continue;
                }
                let missing = template_chord.len() - matched;
                let extra = chord.len() - matched;
                let score = MATCHED * matched as i32
                    - MISSING * missing as i32
                    - EXTRA * extra as i32
                    + bonus;
                if score <= 0 {
                    continue;
                }
                ranked.entry(Reverse(score)).or_default().push(NamedRoot {
                    root,
                    root_spelling: self.speller.spell_class(root, key),
                    characteristic: template.characteristic.to_string(),
                });
            }
        }
        for names in ranked.values_mut() {
            names.sort_by_key(|named| named.name());
        }
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::{ChordNamer, TemplateNamer};
    use crate::harmony::{Chord, Key, KeyMode};

    fn best(chord: &Chord, key: &Key) -> Vec<String> {
        TemplateNamer::new()
            .name_candidates(chord, key)
            .into_iter()
            .next()
            .map(|(_, names)| names.into_iter().map(|n| n.name()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_triads() {
        let key = Key::c_major();
        assert_eq!(best(&Chord::from_iter([0, 4, 7]), &key), vec!["C"]);
        assert_eq!(best(&Chord::from_iter([2, 5, 9]), &key), vec!["Dm"]);
        assert_eq!(best(&Chord::from_iter([7, 11, 2, 5]), &key), vec!["G7"]);
        assert_eq!(best(&Chord::from_iter([11, 2, 5]), &key), vec!["Bdim"]);
        let e_flat = Key::new(-3, KeyMode::Major);
        assert_eq!(best(&Chord::from_iter([3, 7, 10]), &e_flat), vec!["Eb"]);
    }

    #[test]
    fn test_scores() {
        let key = Key::c_major();
        let ranked =
            TemplateNamer::new().name_candidates(&Chord::from_iter([0, 4, 7]), &key);
        let scores = ranked.keys().map(|score| score.0).collect::<Vec<_>>();
        assert_eq!(scores[0], 37);
        assert!(scores.windows(2).all(|w| w[0] > w[1]));
        assert!(ranked.values().flatten().any(|named| named.name() == "Am7"));
        assert!(TemplateNamer::new()
            .name_candidates(&Chord::no_chord(), &key)
            .is_empty());
    }

    #[test]
    fn test_single_note() {
        let key = Key::c_major();
        assert_eq!(best(&Chord::from_iter([7]), &key), vec!["G5"]);
    }
}
