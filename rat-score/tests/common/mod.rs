use rat_score::{
    dom::Score,
    harmony::{Chord, Key, KeyMode},
    primitives::{Clef, PitchSet, Rational, TimeSignature},
};

pub fn r(num: i64, den: i64) -> Rational {
    Rational::new(num, den).expect("zero denominator in test point")
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Four bars of 4/4 in G major: melody with a bass line on linked
/// staves.
///
/// Melody: `G G D D | E E D- | C C B B | A A G-`, in quarters.
pub fn twinkle() -> Score {
    let mut score = Score::new(TimeSignature::new(4, 4), 4, Rational::ZERO);
    let melody_staff = score.new_staff();
    let bass_staff = score.new_staff();
    let melody = score.new_voice(melody_staff);
    let bass = score.new_voice(bass_staff);

    let tune = [7, 7, 14, 14, 16, 16, 14, 14, 12, 12, 11, 11, 9, 9, 7, 7];
    let notes = score.voice_mut(melody_staff, melody);
    let mut at = Rational::ONE;
    for (index, pitch) in tune.iter().enumerate() {
        let held = index % 8 == 7;
        if !held {
            notes.put(at, PitchSet::from([*pitch]));
        }
        at += Rational::ONE;
    }

    let notes = score.voice_mut(bass_staff, bass);
    notes.put(r(1, 1), PitchSet::from([-17, -5]));
    notes.put(r(5, 1), PitchSet::from([-12, -8]));
    notes.put(r(7, 1), PitchSet::from([-10, -6]));
    notes.put(r(9, 1), PitchSet::from([-12]));
    notes.put(r(11, 1), PitchSet::from([-5]));
    notes.put(r(13, 1), PitchSet::from([-10, -6]));
    notes.put(r(15, 1), PitchSet::from([-17, -5]));

    score.staff_mut(bass_staff).clefs_mut().put(r(1, 1), Clef::Bass);
    let harmony = score.harmony_mut(melody_staff);
    harmony.keys.put(r(1, 1), Key::new(1, KeyMode::Major));
    harmony.chords.put(r(1, 1), Chord::with_root([7, 11, 2], 7));
    harmony.chords.put(r(5, 1), Chord::with_root([0, 4, 7], 0));
    harmony.chords.put(r(7, 1), Chord::with_root([7, 11, 2], 7));
    harmony.chords.put(r(9, 1), Chord::with_root([0, 4, 7], 0));
    harmony.chords.put(r(11, 1), Chord::with_root([7, 11, 2], 7));
    harmony.chords.put(r(13, 1), Chord::with_root([2, 6, 9], 2));
    harmony.chords.put(r(15, 1), Chord::with_root([7, 11, 2], 7));
    score
}
