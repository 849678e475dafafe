//! Pitch-class collections and their interpretation: chords, scales,
//! keys, spelling and naming.

pub mod chord;
pub mod enharmonics;
pub mod key;
pub mod naming;
pub mod scale;

pub use chord::{Chord, Modulus};
pub use enharmonics::{Enharmonics, KeySpeller};
pub use key::{Key, KeyMode};
pub use naming::{ChordNamer, NamedRoot, RankedNames, TemplateNamer};
pub use scale::{Scale, ScaleKind};
