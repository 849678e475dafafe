use std::fmt::Display;

use super::{Chord, Modulus};
use crate::primitives::Spelling;

/// Interval pattern of the scale, relative to its root.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum ScaleKind {
    Major,
    NaturalMinor,
    HarmonicMinor,
    /// Ascending form; descending form is natural minor.
    MelodicMinor,
    Chromatic,
    /// Intervals in 12-step octave. Root is always added.
    Custom(Vec<i32>),
}
impl ScaleKind {
    pub fn intervals(&self) -> Vec<i32> {
        match self {
            Self::Major => vec![0, 2, 4, 5, 7, 9, 11],
            Self::NaturalMinor => vec![0, 2, 3, 5, 7, 8, 10],
            Self::HarmonicMinor => vec![0, 2, 3, 5, 7, 8, 11],
            Self::MelodicMinor => vec![0, 2, 3, 5, 7, 9, 11],
            Self::Chromatic => (0..12).collect(),
            Self::Custom(intervals) => intervals.clone(),
        }
    }
}
impl Display for ScaleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::NaturalMinor => write!(f, "natural minor"),
            Self::HarmonicMinor => write!(f, "harmonic minor"),
            Self::MelodicMinor => write!(f, "melodic minor"),
            Self::Chromatic => write!(f, "chromatic"),
            Self::Custom(intervals) => write!(f, "custom {:?}", intervals),
        }
    }
}

/// Chord, which is expected to hold more notes, and knows the order of
/// its degrees.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Scale {
    chord: Chord,
    kind: ScaleKind,
    descending: Option<Box<Scale>>,
}
impl Scale {
    /// # Example
    /// ```
    /// # use rat_score::harmony::{Scale, ScaleKind};
    /// let d_major = Scale::new(2, ScaleKind::Major);
    /// assert_eq!(d_major.get_degree(3), 6);
    /// assert_eq!(d_major.get_degree(8), 2);
    /// assert!(d_major.contains(-1));
    /// ```
    pub fn new(root: i32, kind: ScaleKind) -> Self {
        let mut chord = Chord::new(Modulus::TWELVE);
        chord.insert(root);
        for interval in kind.intervals() {
            chord.insert(root + interval);
        }
        chord.set_root(Some(root));
        let descending = match kind {
            ScaleKind::MelodicMinor => {
                Some(Box::new(Self::new(root, ScaleKind::NaturalMinor)))
            }
            _ => None,
        };
        Self {
            chord,
            kind,
            descending,
        }
    }

    pub fn kind(&self) -> &ScaleKind {
        &self.kind
    }
    pub fn chord(&self) -> &Chord {
        &self.chord
    }
    pub fn root(&self) -> i32 {
        self.chord.root().unwrap_or_default()
    }
    pub fn contains(&self, pitch: i32) -> bool {
        self.chord.contains(pitch)
    }
    pub fn len(&self) -> usize {
        self.chord.len()
    }
    pub fn is_empty(&self) -> bool {
        self.chord.is_empty()
    }

    pub fn is_major(&self) -> bool {
        self.kind == ScaleKind::Major
    }
    pub fn is_minor(&self) -> bool {
        matches!(
            self.kind,
            ScaleKind::NaturalMinor
                | ScaleKind::HarmonicMinor
                | ScaleKind::MelodicMinor
        )
    }
    /// Scale to use for descending lines. Differs only for melodic minor.
    pub fn descending_version(&self) -> &Scale {
        self.descending.as_deref().unwrap_or(self)
    }

    /// Classes in order of degrees, starting from root.
    pub fn degrees(&self) -> Vec<i32> {
        let root = self.root();
        let (below, from_root): (Vec<i32>, Vec<i32>) =
            self.chord.iter().partition(|class| *class < root);
        from_root.into_iter().chain(below).collect()
    }

    /// Class of 1-based degree. Degrees wrap: in heptatonic scale 8 is
    /// the same as 1, and 0 is the same as 7.
    pub fn get_degree(&self, degree: i32) -> i32 {
        let degrees = self.degrees();
        let index = (degree - 1).rem_euclid(degrees.len() as i32);
        degrees[index as usize]
    }

    /// Nearest degrees below and above the pitch.
    ///
    /// Both are the same degree if pitch is in scale. Above the last
    /// degree, the upper neighbour is the first degree.
    ///
    /// # Example
    /// ```
    /// # use rat_score::harmony::{Scale, ScaleKind};
    /// let c_major = Scale::new(0, ScaleKind::Major);
    /// assert_eq!(c_major.degree_of(4), (3, 3));
    /// assert_eq!(c_major.degree_of(6), (4, 5));
    /// assert_eq!(c_major.degree_of(-1), (7, 7));
    /// ```
    pub fn degree_of(&self, pitch: i32) -> (usize, usize) {
        let modulus = self.chord.modulus();
        let root = self.root();
        let distance = modulus.pitch_class(pitch - root);
        let distances = self
            .degrees()
            .into_iter()
            .map(|class| modulus.pitch_class(class - root))
            .collect::<Vec<_>>();
        let lower = distances
            .iter()
            .rposition(|degree| *degree <= distance)
            .unwrap_or_default();
        let upper = distances
            .iter()
            .position(|degree| *degree >= distance)
            .unwrap_or_default();
        (lower + 1, upper + 1)
    }

    /// Distance from scale root to chord root: 0 for tonic, 7 for
    /// dominant in 12-step octave.
    pub fn root_function(&self, chord: &Chord) -> Option<i32> {
        let root = chord.root()?;
        Some(self.chord.modulus().pitch_class(root - self.root()))
    }

    pub fn spelling(&self) -> Option<&[Spelling]> {
        self.chord.spelling()
    }
    pub fn set_spelling(&mut self, spelling: Vec<Spelling>) {
        self.chord.set_spelling(spelling);
    }
    pub fn clear_spelling(&mut self) {
        self.chord.clear_spelling();
        if let Some(descending) = self.descending.as_mut() {
            descending.clear_spelling();
        }
    }
}
impl Display for Scale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.chord.root_spelling() {
            Some(root) => write!(f, "{} {}", root, self.kind),
            None => write!(f, "{} {}", self.root(), self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Scale, ScaleKind};
    use crate::harmony::Chord;

    #[test]
    fn test_kinds() {
        let a_minor = Scale::new(9, ScaleKind::NaturalMinor);
        assert!(a_minor.is_minor());
        assert!(!a_minor.is_major());
        assert_eq!(a_minor.degrees(), vec![9, 11, 0, 2, 4, 5, 7]);
        assert_eq!(
            Scale::new(9, ScaleKind::HarmonicMinor).get_degree(7),
            8
        );
        assert_eq!(Scale::new(3, ScaleKind::Chromatic).len(), 12);
        let pentatonic = Scale::new(7, ScaleKind::Custom(vec![2, 4, 7, 9]));
        assert_eq!(pentatonic.degrees(), vec![7, 9, 11, 2, 4]);
        assert_eq!(pentatonic.get_degree(6), 7);
    }

    #[test]
    fn test_melodic_minor() {
        let melodic = Scale::new(9, ScaleKind::MelodicMinor);
        assert!(melodic.contains(6));
        assert!(melodic.contains(8));
        let descending = melodic.descending_version();
        assert_eq!(descending, &Scale::new(9, ScaleKind::NaturalMinor));
        assert!(!descending.contains(8));
        let major = Scale::new(0, ScaleKind::Major);
        assert_eq!(major.descending_version(), &major);
    }

    #[test]
    fn test_degrees() {
        let c_major = Scale::new(0, ScaleKind::Major);
        let expected = [0, 2, 4, 5, 7, 9, 11];
        for (degree, class) in (1..=7).zip(expected) {
            assert_eq!(c_major.get_degree(degree), class);
            assert_eq!(c_major.get_degree(degree + 7), class);
        }
        assert_eq!(c_major.get_degree(0), 11);
        assert_eq!(c_major.degree_of(1), (1, 2));
        assert_eq!(c_major.degree_of(11), (7, 7));
        let e_major = Scale::new(4, ScaleKind::Major);
        assert_eq!(e_major.degree_of(3), (7, 7));
        assert_eq!(e_major.degree_of(2), (6, 7));
        assert_eq!(e_major.degree_of(17), (1, 2));
    }

    #[test]
    fn test_root_function() {
        let c_major = Scale::new(0, ScaleKind::Major);
        assert_eq!(c_major.root_function(&Chord::with_root([7, 11, 2], 7)), Some(7));
        assert_eq!(c_major.root_function(&Chord::with_root([2, 5, 9], 2)), Some(2));
        let g_major = Scale::new(7, ScaleKind::Major);
        assert_eq!(g_major.root_function(&Chord::with_root([0, 4, 7], 0)), Some(5));
        assert_eq!(c_major.root_function(&Chord::no_chord()), None);
    }
}
