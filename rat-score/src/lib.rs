//! Exact-time model of a musical score.
//!
//! Score is a set of sparse [`Timeline`](primitives::Timeline)s: meter,
//! per-staff harmony and clefs, per-voice pitch content. On top of them
//! the crate derives, for any time point, what is in effect and what
//! changes there ([`dom::ScoreDelta`]), and runs the batch analyses:
//! tie decomposition, enharmonic spelling and chord guessing.
//!
//! # Example
//!
//! ```
//! use rat_score::{
//!     dom::Score,
//!     primitives::{PitchSet, Rational, TimeSignature},
//! };
//!
//! let mut score = Score::new(TimeSignature::new(4, 4), 2, Rational::ZERO);
//! let staff = score.new_staff();
//! let voice = score.new_voice(staff);
//! score
//!     .voice_mut(staff, voice)
//!     .put(Rational::ONE, PitchSet::from([0, 4, 7]));
//! score.resolve_ties(1);
//! let delta = score.score_delta_at(&Rational::from(5));
//! let voice = &delta.staves[0].voices[0];
//! assert_eq!(voice.established.len(), 3);
//! assert_eq!(voice.notehead_length(), Some(Rational::from(4)));
//! ```

pub mod config;
pub mod dom;
pub mod errors;
pub mod harmony;
pub mod primitives;
