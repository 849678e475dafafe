//! Main "ruler" for moving through score: time signatures and the
//! barlines they imply.
//!
//! Time is counted in beats. A time signature `n/d` makes a measure of
//! `n` beats, so a meter defined at point `1` in 4/4 has downbeats at
//! `1, 5, 9, ...`. Beats inside measure are 1-based.
use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{Rational, Timeline};
use crate::errors::ScoreError;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u32,
    pub denominator: u32,
}
impl TimeSignature {
    /// # Panics
    ///
    /// If any part is zero.
    pub fn new(numerator: u32, denominator: u32) -> Self {
        assert!(
            numerator > 0 && denominator > 0,
            "invalid time signature: {numerator}/{denominator}"
        );
        Self {
            numerator,
            denominator,
        }
    }
    /// Measure length in beats.
    pub fn beats(&self) -> Rational {
        Rational::from(i64::from(self.numerator))
    }
    /// Measure length in whole notes.
    pub fn measure_length(&self) -> Rational {
        self.beats() / Rational::from(i64::from(self.denominator))
    }
}
impl Default for TimeSignature {
    fn default() -> Self {
        Self::new(4, 4)
    }
}
impl Display for TimeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
impl FromStr for TimeSignature {
    type Err = ScoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScoreError::InvalidTimeSignature(s.to_string());
        let (num, den) = s.split_once('/').ok_or_else(invalid)?;
        let num: u32 = num.trim().parse().map_err(|_| invalid())?;
        let den: u32 = den.trim().parse().map_err(|_| invalid())?;
        if num == 0 || den == 0 {
            return Err(invalid());
        }
        Ok(Self::new(num, den))
    }
}

/// Timeline of time signatures.
///
/// Every point, where time signature is set, is a downbeat. Before the
/// first time signature nothing is known about measures, and every
/// measure-related query returns `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Meter {
    signatures: Timeline<TimeSignature>,
}
impl Meter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(
        &mut self,
        at: Rational,
        time_signature: TimeSignature,
    ) -> Option<TimeSignature> {
        self.signatures.put(at, time_signature)
    }
    pub fn timeline(&self) -> &Timeline<TimeSignature> {
        &self.signatures
    }

    /// Time signature in effect at the point.
    pub fn signature_at(&self, at: &Rational) -> Option<TimeSignature> {
        self.definition_at(at).map(|(_, ts)| ts)
    }
    /// Time signature set exactly at the point.
    pub fn changed_at(&self, at: &Rational) -> Option<TimeSignature> {
        self.signatures.get_changed(at).copied()
    }

    fn definition_at(&self, at: &Rational) -> Option<(Rational, TimeSignature)> {
        self.signatures
            .established_entry(at)
            .map(|(start, ts)| (*start, *ts))
    }

    /// Downbeat of the measure, containing the point.
    pub fn measure_start(&self, at: &Rational) -> Option<Rational> {
        let (start, ts) = self.definition_at(at)?;
        let beats = ts.beats();
        let measures = Rational::from_integer(((*at - start) / beats).floor());
        Some(start + beats * measures)
    }

    /// 1-based beat of the point inside its measure.
    ///
    /// # Example
    /// ```
    /// # use rat_score::primitives::{Meter, Rational, TimeSignature};
    /// let mut meter = Meter::new();
    /// meter.put(Rational::ONE, TimeSignature::new(3, 4));
    /// assert_eq!(meter.beat_of(&Rational::from(4)), Some(Rational::ONE));
    /// assert_eq!(
    ///     meter.beat_of(&Rational::new(11, 2).unwrap()),
    ///     Some(Rational::new(5, 2).unwrap())
    /// );
    /// assert_eq!(meter.beat_of(&Rational::HALF), None);
    /// ```
    pub fn beat_of(&self, at: &Rational) -> Option<Rational> {
        let (start, ts) = self.definition_at(at)?;
        Some(Rational::ONE + (*at - start).modulo(ts.beats()))
    }

    /// First downbeat strictly after the point.
    ///
    /// Before the first time signature, it is the point of the first
    /// time signature. `None` if there is no time signature after the
    /// point at all.
    pub fn next_downbeat(&self, at: &Rational) -> Option<Rational> {
        let next_definition = self.signatures.higher_key(at);
        let (Some(measure_start), Some(ts)) =
            (self.measure_start(at), self.signature_at(at))
        else {
            return next_definition;
        };
        let candidate = measure_start + ts.beats();
        match next_definition {
            Some(definition) if definition < candidate => Some(definition),
            _ => Some(candidate),
        }
    }

    /// Every downbeat before `until`, implied by the time signatures.
    pub fn downbeats(&self, until: &Rational) -> Vec<Rational> {
        let mut downbeats = Vec::new();
        let mut definitions = self.signatures.iter().peekable();
        while let Some((start, ts)) = definitions.next() {
            let limit = match definitions.peek() {
                Some((next, _)) if *next < until => **next,
                _ => *until,
            };
            let mut downbeat = *start;
            while downbeat < limit {
                downbeats.push(downbeat);
                downbeat += ts.beats();
            }
        }
        downbeats
    }

    /// Downbeats strictly between two points.
    pub fn barlines_between(&self, from: &Rational, to: &Rational) -> Vec<Rational> {
        let mut barlines = Vec::new();
        let mut current = *from;
        while let Some(downbeat) = self.next_downbeat(&current) {
            if downbeat >= *to {
                break;
            }
            barlines.push(downbeat);
            current = downbeat;
        }
        barlines
    }
}

#[cfg(test)]
mod tests {
    use super::{Meter, TimeSignature};
    use crate::{errors::ScoreError, primitives::Rational};

    fn r(num: i64, den: i64) -> Rational {
        Rational::new(num, den).unwrap()
    }

    /// 3 bars of 4/4, then 7/8, 9/8 and 4/4 again.
    fn meter() -> Meter {
        let mut meter = Meter::new();
        meter.put(r(1, 1), TimeSignature::new(4, 4));
        meter.put(r(13, 1), TimeSignature::new(7, 8));
        meter.put(r(20, 1), TimeSignature::new(9, 8));
        meter.put(r(29, 1), TimeSignature::new(4, 4));
        meter
    }

    #[test]
    fn test_time_signature() {
        let ts: TimeSignature = "7/8".parse().unwrap();
        assert_eq!(ts, TimeSignature::new(7, 8));
        assert_eq!(ts.beats(), r(7, 1));
        assert_eq!(ts.measure_length(), r(7, 8));
        assert_eq!(ts.to_string(), "7/8");
        assert!(matches!(
            "4|4".parse::<TimeSignature>(),
            Err(ScoreError::InvalidTimeSignature(_))
        ));
        assert!("0/4".parse::<TimeSignature>().is_err());
    }

    #[test]
    fn test_downbeats() {
        let meter = meter();
        assert_eq!(
            meter.downbeats(&r(33, 1)),
            vec![r(1, 1), r(5, 1), r(9, 1), r(13, 1), r(20, 1), r(29, 1)]
        );
        assert_eq!(
            meter.downbeats(&r(10, 1)),
            vec![r(1, 1), r(5, 1), r(9, 1)]
        );
        assert!(Meter::new().downbeats(&r(10, 1)).is_empty());
    }

    #[test]
    fn test_beats() {
        let meter = meter();
        assert_eq!(meter.beat_of(&r(0, 1)), None);
        assert_eq!(meter.beat_of(&r(1, 1)), Some(r(1, 1)));
        assert_eq!(meter.beat_of(&r(15, 2)), Some(r(7, 2)));
        assert_eq!(meter.beat_of(&r(19, 1)), Some(r(7, 1)));
        assert_eq!(meter.beat_of(&r(20, 1)), Some(r(1, 1)));
        assert_eq!(meter.measure_start(&r(27, 2)), Some(r(13, 1)));
        assert_eq!(meter.signature_at(&r(21, 1)), Some(TimeSignature::new(9, 8)));
        assert_eq!(meter.changed_at(&r(21, 1)), None);
        assert_eq!(meter.changed_at(&r(20, 1)), Some(TimeSignature::new(9, 8)));
    }

    #[test]
    fn test_next_downbeat() {
        let meter = meter();
        assert_eq!(meter.next_downbeat(&r(0, 1)), Some(r(1, 1)));
        assert_eq!(meter.next_downbeat(&r(1, 1)), Some(r(5, 1)));
        assert_eq!(meter.next_downbeat(&r(9, 2)), Some(r(5, 1)));
        assert_eq!(meter.next_downbeat(&r(12, 1)), Some(r(13, 1)));
        assert_eq!(meter.next_downbeat(&r(13, 1)), Some(r(20, 1)));
        assert_eq!(meter.next_downbeat(&r(30, 1)), Some(r(33, 1)));
        assert_eq!(Meter::new().next_downbeat(&r(3, 1)), None);
    }

    #[test]
    fn test_definition_inside_measure() {
        let mut meter = Meter::new();
        meter.put(r(1, 1), TimeSignature::new(4, 4));
        meter.put(r(3, 1), TimeSignature::new(3, 4));
        assert_eq!(meter.next_downbeat(&r(2, 1)), Some(r(3, 1)));
        assert_eq!(meter.downbeats(&r(9, 1)), vec![r(1, 1), r(3, 1), r(6, 1)]);
        assert_eq!(
            meter.barlines_between(&r(1, 1), &r(9, 1)),
            vec![r(3, 1), r(6, 1)]
        );
    }
}
