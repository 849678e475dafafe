//! Elements, from which the score is constructed.
//!
//! Every time point and duration is a [`Rational`]. Layers of the score
//! are [`Timeline`]s, and the [`Meter`] is the ruler, that places
//! barlines over them.

pub mod clef;
pub mod fraction_tools;
pub mod pitch;
pub mod rational;
pub mod time_map;
pub mod timeline;

pub use clef::Clef;
pub use fraction_tools::{head_lengths, is_dyadic};
pub use pitch::{
    note_name_to_pitch, parse_note_name, NoteName, PitchSet, Spelling,
};
pub use rational::{Rational, NEAREST_EPSILON};
pub use time_map::{Meter, TimeSignature};
pub use timeline::Timeline;
