//! Pitches, their names, and sets of simultaneously sounding pitches.
//!
//! Pitch is an integer, where 0 is middle C (C4) and 1 is one semitone
//! higher. Names are spelled as letter, accidentals and octave: `C4`,
//! `F#3`, `Bbb5`.

use std::{collections::BTreeSet, fmt::Display, str::FromStr};

use derivative::Derivative;
use itertools::Itertools;

use super::Rational;
use crate::errors::{ScoreError, ScoreResult};

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub enum NoteName {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}
impl NoteName {
    /// Ordered by line of fifths, starting from F.
    const BY_FIFTHS: [Self; 7] =
        [Self::F, Self::C, Self::G, Self::D, Self::A, Self::E, Self::B];

    /// Pitch class of the natural note.
    pub fn natural_class(&self) -> i32 {
        match self {
            Self::C => 0,
            Self::D => 2,
            Self::E => 4,
            Self::F => 5,
            Self::G => 7,
            Self::A => 9,
            Self::B => 11,
        }
    }
    /// Position on line of fifths, where C is 0.
    pub fn fifths(&self) -> i32 {
        match self {
            Self::F => -1,
            Self::C => 0,
            Self::G => 1,
            Self::D => 2,
            Self::A => 3,
            Self::E => 4,
            Self::B => 5,
        }
    }
    /// 0 for C, 6 for B.
    pub fn step(&self) -> i32 {
        *self as i32
    }
    fn from_char(ch: char) -> Option<Self> {
        match ch.to_ascii_uppercase() {
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            'E' => Some(Self::E),
            'F' => Some(Self::F),
            'G' => Some(Self::G),
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            _ => None,
        }
    }
}
impl Display for NoteName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Letter with accidentals: positive for sharps, negative for flats.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Spelling {
    pub name: NoteName,
    pub accidental: i32,
}
impl Spelling {
    pub fn new(name: NoteName, accidental: i32) -> Self {
        Self { name, accidental }
    }

    /// Spelling from position on line of fifths.
    ///
    /// # Example
    /// ```
    /// # use rat_score::primitives::{NoteName, Spelling};
    /// assert_eq!(Spelling::from_fifths(0), Spelling::new(NoteName::C, 0));
    /// assert_eq!(Spelling::from_fifths(6), Spelling::new(NoteName::F, 1));
    /// assert_eq!(Spelling::from_fifths(-2), Spelling::new(NoteName::B, -1));
    /// ```
    pub fn from_fifths(fifths: i32) -> Self {
        let shifted = fifths + 1;
        Self {
            name: NoteName::BY_FIFTHS[shifted.rem_euclid(7) as usize],
            accidental: shifted.div_euclid(7),
        }
    }
    pub fn fifths(&self) -> i32 {
        self.name.fifths() + 7 * self.accidental
    }
    pub fn pitch_class(&self) -> i32 {
        (self.name.natural_class() + self.accidental).rem_euclid(12)
    }

    /// Name of the concrete pitch, written with this spelling.
    ///
    /// # Panics
    ///
    /// If spelling doesn't match pitch class of the pitch.
    pub fn name_pitch(&self, pitch: i32) -> String {
        let natural = pitch - self.accidental - self.name.natural_class();
        assert_eq!(
            natural.rem_euclid(12),
            0,
            "spelling {} does not match pitch {}",
            self,
            pitch
        );
        format!("{}{}", self, natural.div_euclid(12) + 4)
    }
}
impl Display for Spelling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let accidental = match self.accidental {
            x if x > 0 => "#".repeat(x as usize),
            x => "b".repeat(x.unsigned_abs() as usize),
        };
        write!(f, "{}{}", self.name, accidental)
    }
}

/// Parse note name like `C4`, `f#3`, `Bb`, `Ebb-1` into spelling and
/// octave. Octave 4 is assumed, if omitted.
pub fn parse_note_name(name: &str) -> ScoreResult<(Spelling, i32)> {
    let invalid = || ScoreError::InvalidNoteName(name.to_string());
    let mut chars = name.trim().chars();
    let letter = chars
        .next()
        .and_then(NoteName::from_char)
        .ok_or_else(invalid)?;
    let rest = chars.as_str();
    let octave_at = rest
        .find(|ch: char| ch != '#' && ch != 'b')
        .unwrap_or(rest.len());
    let (accidentals, octave) = rest.split_at(octave_at);
    let accidental = accidentals
        .chars()
        .map(|ch| if ch == '#' { 1 } else { -1 })
        .sum::<i32>();
    let octave = match octave {
        "" => 4,
        x => x.parse::<i32>().map_err(|_| invalid())?,
    };
    Ok((Spelling::new(letter, accidental), octave))
}

/// Pitch of the note name, see [`parse_note_name`].
///
/// # Example
/// ```
/// # use rat_score::primitives::note_name_to_pitch;
/// assert_eq!(note_name_to_pitch("C4").unwrap(), 0);
/// assert_eq!(note_name_to_pitch("Ab2").unwrap(), -16);
/// assert_eq!(note_name_to_pitch("B#3").unwrap(), 0);
/// assert_eq!(note_name_to_pitch("G").unwrap(), 7);
/// assert!(note_name_to_pitch("H2").is_err());
/// ```
pub fn note_name_to_pitch(name: &str) -> ScoreResult<i32> {
    let (spelling, octave) = parse_note_name(name)?;
    Ok(spelling.name.natural_class() + spelling.accidental + 12 * (octave - 4))
}

/// Set of pitches, sounding together. Empty set is a rest.
///
/// PitchSet carries two caches, filled by the analysis passes and
/// invalidated by setting them to `None`:
/// - note names, one per pitch, in ascending order;
/// - tied values: lengths of the note-heads the set is notated with,
///   in chronological order.
///
/// Caches don't take part in equality and hashing.
#[derive(Derivative, Clone, Default)]
#[derivative(Debug, PartialEq, Eq, Hash)]
pub struct PitchSet {
    pitches: BTreeSet<i32>,
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    note_names: Option<Vec<String>>,
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    tied_values: Option<Vec<Rational>>,
}
impl PitchSet {
    pub fn new() -> Self {
        Self::default()
    }
    /// Empty set. Not the same as absence of PitchSet, which means
    /// "nothing changes here".
    pub fn rest() -> Self {
        Self::default()
    }
    pub fn is_rest(&self) -> bool {
        self.pitches.is_empty()
    }

    /// # Example
    /// ```
    /// # use rat_score::primitives::PitchSet;
    /// let c_major = PitchSet::from_names(&["C3", "E3", "G3"]).unwrap();
    /// assert_eq!(c_major, PitchSet::from([-12, -8, -5]));
    /// ```
    pub fn from_names(names: &[&str]) -> ScoreResult<Self> {
        names
            .iter()
            .map(|name| note_name_to_pitch(name))
            .collect::<ScoreResult<Self>>()
    }

    /// # Returns
    /// true if pitch was not in the set. Changing set invalidates caches.
    pub fn insert(&mut self, pitch: i32) -> bool {
        let inserted = self.pitches.insert(pitch);
        if inserted {
            self.invalidate();
        }
        inserted
    }
    pub fn remove(&mut self, pitch: i32) -> bool {
        let removed = self.pitches.remove(&pitch);
        if removed {
            self.invalidate();
        }
        removed
    }
    pub fn contains(&self, pitch: i32) -> bool {
        self.pitches.contains(&pitch)
    }
    /// Pitches in ascending order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = i32> + '_ {
        self.pitches.iter().copied()
    }
    pub fn pitches(&self) -> &BTreeSet<i32> {
        &self.pitches
    }
    pub fn len(&self) -> usize {
        self.pitches.len()
    }
    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }

    pub fn note_names(&self) -> Option<&[String]> {
        self.note_names.as_deref()
    }
    /// # Panics
    ///
    /// If there is not exactly one name per pitch.
    pub fn set_note_names(&mut self, names: Vec<String>) {
        assert_eq!(
            names.len(),
            self.len(),
            "names {:?} do not match pitches {:?}",
            names,
            self.pitches
        );
        self.note_names = Some(names);
    }
    pub fn clear_note_names(&mut self) {
        self.note_names = None;
    }

    pub fn tied_values(&self) -> Option<&[Rational]> {
        self.tied_values.as_deref()
    }
    pub fn set_tied_values(&mut self, values: Vec<Rational>) {
        self.tied_values = Some(values);
    }
    pub fn clear_tied_values(&mut self) {
        self.tied_values = None;
    }
    /// Sum of tied values, if they are resolved.
    pub fn runtime_duration(&self) -> Option<Rational> {
        self.tied_values().map(|values| values.iter().sum())
    }

    fn invalidate(&mut self) {
        self.clear_note_names();
        self.clear_tied_values();
    }
}
impl FromIterator<i32> for PitchSet {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        Self {
            pitches: iter.into_iter().collect(),
            ..Default::default()
        }
    }
}
impl<const N: usize> From<[i32; N]> for PitchSet {
    fn from(value: [i32; N]) -> Self {
        value.into_iter().collect()
    }
}
impl FromStr for PitchSet {
    type Err = ScoreError;
    /// Whitespace-separated names, like `"C4 E4 G4"`. Empty string is a
    /// rest.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_whitespace()
            .map(note_name_to_pitch)
            .collect::<ScoreResult<Self>>()
    }
}
impl Display for PitchSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_rest() {
            return write!(f, "rest");
        }
        match self.note_names() {
            Some(names) => write!(f, "{}", names.join(" ")),
            None => write!(f, "{}", self.iter().join(" ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        note_name_to_pitch, parse_note_name, NoteName, PitchSet, Spelling,
    };
    use crate::{errors::ScoreError, primitives::Rational};

    #[test]
    fn test_spelling() {
        for fifths in -15..15 {
            assert_eq!(Spelling::from_fifths(fifths).fifths(), fifths);
        }
        let f_sharp = Spelling::new(NoteName::F, 1);
        assert_eq!(f_sharp.pitch_class(), 6);
        assert_eq!(f_sharp.to_string(), "F#");
        assert_eq!(Spelling::new(NoteName::B, -2).to_string(), "Bbb");
        assert_eq!(Spelling::new(NoteName::B, 1).name_pitch(0), "B#3");
        assert_eq!(Spelling::new(NoteName::C, -1).name_pitch(-1), "Cb4");
        assert_eq!(Spelling::new(NoteName::A, 0).name_pitch(-15), "A2");
    }

    #[test]
    #[should_panic]
    fn test_wrong_spelling() {
        Spelling::new(NoteName::D, 0).name_pitch(0);
    }

    #[test]
    fn test_parse() {
        assert_eq!(note_name_to_pitch("c4").unwrap(), 0);
        assert_eq!(note_name_to_pitch("Cb4").unwrap(), -1);
        assert_eq!(note_name_to_pitch("G7").unwrap(), 43);
        assert_eq!(note_name_to_pitch("A-1").unwrap(), -51);
        assert_eq!(note_name_to_pitch("F##").unwrap(), 7);
        assert_eq!(
            note_name_to_pitch("E#x"),
            Err(ScoreError::InvalidNoteName("E#x".to_string()))
        );
        assert_eq!(
            parse_note_name("Gb2").unwrap(),
            (Spelling::new(NoteName::G, -1), 2)
        );
        let set: PitchSet = "C3 E3 G3".parse().unwrap();
        assert_eq!(set, PitchSet::from([-12, -8, -5]));
        assert!("".parse::<PitchSet>().unwrap().is_rest());
    }

    #[test]
    fn test_caches() {
        let mut set = PitchSet::from([0, 4, 7]);
        let named = {
            let mut named = set.clone();
            named.set_note_names(vec!["C4".into(), "E4".into(), "G4".into()]);
            named.set_tied_values(vec![Rational::TWO, Rational::HALF]);
            named
        };
        assert_eq!(set, named);
        assert_eq!(named.to_string(), "C4 E4 G4");
        assert_eq!(set.to_string(), "0 4 7");
        assert_eq!(named.runtime_duration(), Some(Rational::new(5, 2).unwrap()));
        assert_eq!(set.runtime_duration(), None);

        let mut named = named;
        assert!(!named.insert(4));
        assert!(named.note_names().is_some());
        assert!(named.insert(11));
        assert!(named.note_names().is_none());
        assert!(named.tied_values().is_none());
        assert!(set.remove(7));
        assert_eq!(PitchSet::rest().to_string(), "rest");
    }

    #[test]
    #[should_panic]
    fn test_names_count() {
        PitchSet::from([0, 4]).set_note_names(vec!["C4".into()]);
    }
}
