//! Guessing chord names from sounding pitches.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, BTreeSet},
};

use itertools::Itertools;

use super::Score;
use crate::{
    harmony::{Chord, ChordNamer, NamedRoot},
    primitives::Rational,
};

/// Chord names by descending likelihood.
pub type GuessedNames = BTreeMap<Reverse<i32>, Vec<String>>;

/// Name, won by a root in several passes.
#[derive(Debug)]
struct Vote {
    characteristic_length: usize,
    passes: usize,
    score: i32,
}

#[derive(Debug, Default)]
struct RootVotes {
    score: i32,
    names: BTreeMap<String, Vote>,
}

impl Score {
    /// Names of chord, sounding on the staff in `[start, end)`.
    ///
    /// Pitch classes of every voice are counted at every point of the
    /// overall rhythm in range. Then chords are built from all counted
    /// classes, each pass dropping classes that were heard least. Each
    /// pass is named by `namer`, and weighted by how many counts it
    /// consumed.
    ///
    /// Every root gets the name it won most passes with, and the sum of
    /// its weighted scores. Ties between names go to the characteristic
    /// of length closer to `preferred_characteristic_length`.
    ///
    /// Key is taken at `start`, or from settings if no key is set.
    pub fn guess_chord(
        &self,
        staff: usize,
        start: &Rational,
        end: &Rational,
        preferred_characteristic_length: usize,
        namer: &impl ChordNamer,
    ) -> GuessedNames {
        let mut guessed = GuessedNames::new();
        if end <= start {
            return guessed;
        }
        let preferred = preferred_characteristic_length;
        let mut points = self
            .overall_rhythm()
            .range(start..end)
            .copied()
            .collect::<BTreeSet<_>>();
        points.insert(*start);

        let mut tally: BTreeMap<i32, usize> = BTreeMap::new();
        for at in points.iter() {
            for voice in self.staff(staff).voices() {
                let Some((_, notes)) = voice.notes().established_entry(at) else {
                    continue;
                };
                for pitch in notes.iter() {
                    *tally.entry(pitch.rem_euclid(12)).or_default() += 1;
                }
            }
        }
        log::debug!(
            "staff {}: classes from {} to {}: {:?}",
            staff,
            start,
            end,
            tally
        );

        let key = self
            .harmony(staff)
            .key_at(start)
            .copied()
            .unwrap_or(self.settings.fallback_key);

        let mut votes: BTreeMap<i32, RootVotes> = BTreeMap::new();
        while let Some(passes) = tally.values().copied().min() {
            let candidate = Chord::from_iter(tally.keys().copied());
            tally.values_mut().for_each(|count| *count -= passes);
            tally.retain(|_, count| *count > 0);

            let rank = |score: i32, named: &NamedRoot| {
                (
                    Reverse(score),
                    named.characteristic.len().abs_diff(preferred),
                    named.name(),
                )
            };
            let mut best: BTreeMap<i32, (i32, NamedRoot)> = BTreeMap::new();
            let ranked = namer.name_candidates(&candidate, &key);
            for (Reverse(score), named) in ranked
                .into_iter()
                .flat_map(|(score, names)| names.into_iter().map(move |n| (score, n)))
            {
                let better = match best.get(&named.root) {
                    Some((best_score, best_named)) => {
                        rank(score, &named) < rank(*best_score, best_named)
                    }
                    None => true,
                };
                if better {
                    best.insert(named.root, (score, named));
                }
            }
            log::trace!(
                "{} passes of {}: {}",
                passes,
                candidate,
                best.values().map(|(_, named)| named.name()).join(", ")
            );

            let weight = passes as i32;
            for (root, (score, named)) in best {
                let root_votes = votes.entry(root).or_default();
                root_votes.score += score * weight;
                let vote = root_votes.names.entry(named.name()).or_insert(Vote {
                    characteristic_length: named.characteristic.len(),
                    passes: 0,
                    score: 0,
                });
                vote.passes += passes;
                vote.score += score * weight;
            }
        }

        for root_votes in votes.into_values() {
            let modal = root_votes.names.into_iter().min_by_key(|(name, vote)| {
                (
                    Reverse(vote.passes),
                    vote.characteristic_length.abs_diff(preferred),
                    Reverse(vote.score),
                    name.clone(),
                )
            });
            if let Some((name, _)) = modal {
                guessed.entry(Reverse(root_votes.score)).or_default().push(name);
            }
        }
        guessed.values_mut().for_each(|names| names.sort());
        guessed
    }

    /// [`Score::guess_chord`] with preferred characteristic length from
    /// settings.
    pub fn guess_chord_with_settings(
        &self,
        staff: usize,
        start: &Rational,
        end: &Rational,
        namer: &impl ChordNamer,
    ) -> GuessedNames {
        let preferred = self.settings.preferred_characteristic_length;
        self.guess_chord(staff, start, end, preferred, namer)
    }
}
