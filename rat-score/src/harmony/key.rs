use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::{Modulus, Scale, ScaleKind};
use crate::primitives::Spelling;

#[derive(
    Debug, PartialEq, Eq, Hash, Clone, Copy, Default, Serialize, Deserialize,
)]
pub enum KeyMode {
    #[default]
    Major,
    Minor,
}

/// Key signature with mode.
///
/// Key signature is counted in fifths: positive for sharps, negative for
/// flats. Tonic follows from both.
#[derive(
    Debug, PartialEq, Eq, Hash, Clone, Copy, Default, Serialize, Deserialize,
)]
pub struct Key {
    pub fifths: i32,
    pub mode: KeyMode,
}
impl Key {
    pub fn new(fifths: i32, mode: KeyMode) -> Self {
        Self { fifths, mode }
    }
    pub fn c_major() -> Self {
        Self::new(0, KeyMode::Major)
    }

    /// Key with the tonic pitch class. Signatures from 6 flats to 5
    /// sharps are chosen.
    ///
    /// # Example
    /// ```
    /// # use rat_score::harmony::{Key, KeyMode};
    /// assert_eq!(Key::from_tonic(7, KeyMode::Major).fifths, 1);
    /// assert_eq!(Key::from_tonic(6, KeyMode::Major).fifths, -6);
    /// assert_eq!(Key::from_tonic(4, KeyMode::Minor).fifths, 1);
    /// assert_eq!(Key::from_tonic(-2, KeyMode::Minor).to_string(), "Bb minor");
    /// ```
    pub fn from_tonic(tonic: i32, mode: KeyMode) -> Self {
        let modulus = Modulus::TWELVE;
        let fifths = (-6..=5)
            .find(|fifths| {
                Self::new(*fifths, mode).tonic() == modulus.pitch_class(tonic)
            })
            .unwrap_or_default();
        Self::new(fifths, mode)
    }

    /// Pitch class of the tonic.
    pub fn tonic(&self) -> i32 {
        self.tonic_spelling().pitch_class()
    }
    pub fn tonic_spelling(&self) -> Spelling {
        match self.mode {
            KeyMode::Major => Spelling::from_fifths(self.fifths),
            KeyMode::Minor => Spelling::from_fifths(self.fifths + 3),
        }
    }
    /// Point on line of fifths, around which diatonic notes are spelled.
    ///
    /// Minor keys lean to sharps, so leading tone is spelled as raised
    /// seventh.
    pub fn spelling_center(&self) -> i32 {
        match self.mode {
            KeyMode::Major => self.fifths + 2,
            KeyMode::Minor => self.fifths + 3,
        }
    }

    pub fn scale(&self) -> Scale {
        let kind = match self.mode {
            KeyMode::Major => ScaleKind::Major,
            KeyMode::Minor => ScaleKind::NaturalMinor,
        };
        Scale::new(self.tonic(), kind)
    }
}
impl Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self.mode {
            KeyMode::Major => "major",
            KeyMode::Minor => "minor",
        };
        write!(f, "{} {}", self.tonic_spelling(), mode)
    }
}

#[cfg(test)]
mod tests {
    use super::{Key, KeyMode};

    #[test]
    fn test_tonic() {
        assert_eq!(Key::c_major().tonic(), 0);
        assert_eq!(Key::default(), Key::c_major());
        assert_eq!(Key::new(0, KeyMode::Minor).tonic(), 9);
        assert_eq!(Key::new(-3, KeyMode::Major).tonic(), 3);
        assert_eq!(Key::new(-3, KeyMode::Major).to_string(), "Eb major");
        assert_eq!(Key::new(4, KeyMode::Minor).to_string(), "C# minor");
        for tonic in 0..12 {
            for mode in [KeyMode::Major, KeyMode::Minor] {
                assert_eq!(Key::from_tonic(tonic, mode).tonic(), tonic);
            }
        }
    }

    #[test]
    fn test_scale() {
        let g_major = Key::new(1, KeyMode::Major).scale();
        assert!(g_major.is_major());
        assert!(g_major.contains(6));
        assert!(!g_major.contains(5));
        let d_minor = Key::new(-1, KeyMode::Minor).scale();
        assert!(d_minor.is_minor());
        assert_eq!(d_minor.root(), 2);
        assert!(d_minor.contains(10));
    }

    #[test]
    fn test_serde() {
        let key = Key::new(-2, KeyMode::Minor);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#"{"fifths":-2,"mode":"Minor"}"#);
        assert_eq!(serde_json::from_str::<Key>(&json).unwrap(), key);
    }
}
