//! Tools for splitting durations into notatable note-head lengths.
//!
//! Durations are measured in beats: `1` is the base unit, `2` is twice
//! as long, `1/2` is half as long.

use super::Rational;

/// True if denominator is a power of two, so the length can be written
/// with plain (maybe dotted) heads and ties.
pub fn is_dyadic(length: Rational) -> bool {
    let den = length.denominator();
    den & (den - 1) == 0
}

/// Largest power of two, not greater than `length`.
///
/// Works outward from 1: doubling for lengths `>= 1`, halving for
/// shorter ones.
///
/// # Panics
///
/// If length is not positive.
pub fn power_of_two_at_most(length: Rational) -> Rational {
    assert!(
        length.is_positive(),
        "length should be positive, got: {}",
        length
    );
    let mut head = Rational::ONE;
    if length >= Rational::ONE {
        while head * Rational::TWO <= length {
            head = head * Rational::TWO;
        }
    } else {
        while head > length {
            head = head * Rational::HALF;
        }
    }
    head
}

/// Largest dotted head, fitting into `remaining`.
///
/// Every dot multiplies the head by 3/2, and is applied only while the
/// head still fits.
///
/// # Example
/// ```
/// # use rat_score::primitives::{Rational, fraction_tools::largest_head};
/// let r = |n, d| Rational::new(n, d).unwrap();
/// assert_eq!(largest_head(r(3, 1), 1), r(3, 1));
/// assert_eq!(largest_head(r(3, 1), 0), r(2, 1));
/// assert_eq!(largest_head(r(7, 8), 2), r(3, 4));
/// assert_eq!(largest_head(r(9, 4), 2), r(2, 1));
/// ```
pub fn largest_head(remaining: Rational, max_dots: u8) -> Rational {
    let mut head = power_of_two_at_most(remaining);
    for _ in 0..max_dots {
        let dotted = head * Rational::ONE_AND_HALF;
        if dotted > remaining {
            break;
        }
        head = dotted;
    }
    head
}

/// Split duration by heads, from the largest to the smallest.
///
/// Durations, that are not dyadic (tuplets) can not be expressed with
/// plain heads, and returned as a single head.
///
/// # Example
/// ```
/// # use rat_score::primitives::{Rational, fraction_tools::head_lengths};
/// let r = |n, d| Rational::new(n, d).unwrap();
/// assert_eq!(
///     head_lengths(r(13, 16), 0),
///     vec![r(1, 2), r(1, 4), r(1, 16)]
/// );
/// assert_eq!(head_lengths(r(13, 16), 1), vec![r(3, 4), r(1, 16)]);
/// assert_eq!(head_lengths(r(2, 3), 1), vec![r(2, 3)]);
/// ```
pub fn head_lengths(duration: Rational, max_dots: u8) -> Vec<Rational> {
    if !duration.is_positive() {
        return Vec::new();
    }
    if !is_dyadic(duration) {
        log::warn!(
            "duration {} is not dyadic, leaving it as a single head",
            duration
        );
        return vec![duration];
    }
    let mut heads = Vec::new();
    let mut remaining = duration;
    while remaining.is_positive() {
        let head = largest_head(remaining, max_dots);
        heads.push(head);
        remaining -= head;
    }
    heads
}
