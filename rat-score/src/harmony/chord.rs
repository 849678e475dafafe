use std::fmt::Display;

use derivative::Derivative;
use itertools::Itertools;

use crate::primitives::{PitchSet, Spelling};

/// Number of steps in octave.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Modulus(i32);
impl Modulus {
    pub const TWELVE: Self = Self(12);

    /// # Panics
    ///
    /// If octave is not positive.
    pub fn new(octave_steps: i32) -> Self {
        assert!(
            octave_steps > 0,
            "octave should have positive number of steps, got: {}",
            octave_steps
        );
        Self(octave_steps)
    }
    pub fn octave_steps(&self) -> i32 {
        self.0
    }
    /// Class of pitch in `[0, octave_steps)`.
    pub fn pitch_class(&self, pitch: i32) -> i32 {
        pitch.rem_euclid(self.0)
    }
}
impl Default for Modulus {
    fn default() -> Self {
        Self::TWELVE
    }
}

/// Set of pitch classes with optional root, bass and name.
///
/// Every pitch, added to chord, is reduced to its class by the
/// [`Modulus`]: chord with C4 and C5 is the same as chord with only C.
/// Chord with bass is an inversion.
///
/// Spelling of members is a cache, filled by enharmonics analysis. It
/// doesn't take part in equality.
#[derive(Derivative, Clone, Default)]
#[derivative(Debug, PartialEq, Eq, Hash)]
pub struct Chord {
    classes: PitchSet,
    modulus: Modulus,
    root: Option<i32>,
    bass: Option<i32>,
    name: Option<String>,
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    spelling: Option<Vec<Spelling>>,
}
impl Chord {
    pub fn new(modulus: Modulus) -> Self {
        Self {
            modulus,
            ..Default::default()
        }
    }
    /// Absence of harmony.
    pub fn no_chord() -> Self {
        Self::default()
    }
    pub fn is_no_chord(&self) -> bool {
        self.classes.is_empty() && self.root.is_none()
    }

    /// Chord from pitches and root, in 12-step octave.
    ///
    /// # Example
    /// ```
    /// # use rat_score::harmony::Chord;
    /// let d_minor = Chord::with_root([2, 5, 9], 14);
    /// assert_eq!(d_minor.root(), Some(2));
    /// assert!(d_minor.contains(-3));
    /// assert!(!d_minor.contains(0));
    /// ```
    pub fn with_root(pitches: impl IntoIterator<Item = i32>, root: i32) -> Self {
        let mut chord: Self = pitches.into_iter().collect();
        chord.set_root(Some(root));
        chord
    }

    pub fn modulus(&self) -> Modulus {
        self.modulus
    }
    /// Member classes as PitchSet.
    pub fn classes(&self) -> &PitchSet {
        &self.classes
    }
    /// Classes in ascending order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = i32> + '_ {
        self.classes.iter()
    }
    pub fn len(&self) -> usize {
        self.classes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Adds class of the pitch.
    ///
    /// # Returns
    /// true if chord was changed.
    pub fn insert(&mut self, pitch: i32) -> bool {
        let inserted = self.classes.insert(self.modulus.pitch_class(pitch));
        if inserted {
            self.clear_spelling();
        }
        inserted
    }
    pub fn remove(&mut self, pitch: i32) -> bool {
        let removed = self.classes.remove(self.modulus.pitch_class(pitch));
        if removed {
            self.clear_spelling();
        }
        removed
    }
    /// True if class of the pitch is in chord.
    pub fn contains(&self, pitch: i32) -> bool {
        self.classes.contains(self.modulus.pitch_class(pitch))
    }

    pub fn root(&self) -> Option<i32> {
        self.root
    }
    pub fn set_root(&mut self, root: Option<i32>) {
        self.root = root.map(|root| self.modulus.pitch_class(root));
        self.clear_spelling();
    }
    pub fn bass(&self) -> Option<i32> {
        self.bass
    }
    pub fn set_bass(&mut self, bass: Option<i32>) {
        self.bass = bass.map(|bass| self.modulus.pitch_class(bass));
    }
    pub fn is_inversion(&self) -> bool {
        self.bass.is_some()
    }
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Spelling of members, in ascending order of classes.
    pub fn spelling(&self) -> Option<&[Spelling]> {
        self.spelling.as_deref()
    }
    /// # Panics
    ///
    /// If there is not exactly one spelling per member.
    pub fn set_spelling(&mut self, spelling: Vec<Spelling>) {
        assert_eq!(
            spelling.len(),
            self.len(),
            "spelling {:?} does not match chord {:?}",
            spelling,
            self.classes
        );
        self.spelling = Some(spelling);
    }
    pub fn clear_spelling(&mut self) {
        self.spelling = None;
    }
    /// Spelling of member with the class of the pitch.
    pub fn spelling_of(&self, pitch: i32) -> Option<Spelling> {
        let class = self.modulus.pitch_class(pitch);
        let index = self.iter().position(|member| member == class)?;
        self.spelling().map(|spelling| spelling[index])
    }
    pub fn root_spelling(&self) -> Option<Spelling> {
        self.spelling_of(self.root?)
    }
}
impl FromIterator<i32> for Chord {
    /// Classes in 12-step octave.
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        let modulus = Modulus::default();
        Self {
            classes: iter
                .into_iter()
                .map(|pitch| modulus.pitch_class(pitch))
                .collect(),
            modulus,
            ..Default::default()
        }
    }
}
impl Display for Chord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(name) = self.name() {
            return write!(f, "{}", name);
        }
        if self.is_no_chord() {
            return write!(f, "N.C.");
        }
        let members = match self.spelling() {
            Some(spelling) => spelling.iter().join(" "),
            None => self.iter().join(" "),
        };
        match self.bass {
            Some(bass) => write!(f, "[{}]/{}", members, bass),
            None => write!(f, "[{}]", members),
        }
    }
}
