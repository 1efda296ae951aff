// Scoring candidate plaintexts for how much they look like English.
//
// There are two scorers and their scores are not comparable:
//
//  - `score_chi_squared` measures the distance between a buffer's byte
//    frequencies and a reference English profile. Lower is better.
//  - `score_heuristic` adds up a per-byte reward for letters and common
//    punctuation and a heavy penalty for control and non-ASCII bytes. Higher is
//    better.
//
// Each returns its own type so the two conventions can't be mixed up.
use std::cmp::Ordering;
use std::iter::Sum;
use std::ops::Add;

// Relative frequencies of lowercase letters in English text.
const LETTER_FREQUENCIES: [f64; 26] = [
    0.065336,  // a
    0.011936,  // b
    0.022256,  // c
    0.034024,  // d
    0.101616,  // e
    0.017824,  // f
    0.016120,  // g
    0.048752,  // h
    0.055728,  // i
    0.001224,  // j
    0.006176,  // k
    0.032200,  // l
    0.019248,  // m
    0.053992,  // n
    0.060056,  // o
    0.015432,  // p
    0.000760,  // q
    0.047896,  // r
    0.050616,  // s
    0.072448,  // t
    0.022064,  // u
    0.007824,  // v
    0.018880,  // w
    0.001200,  // x
    0.015792,  // y
    0.000592,  // z
];
const SPACE_FREQUENCY: f64 = 0.17;
const PERIOD_FREQUENCY: f64 = 0.02;
const COMMA_FREQUENCY: f64 = 0.01;

const EXPECTED_SCORE: i64 = 1;
const EXCLUDED_SCORE: i64 = -99;
const OTHER_SCORE: i64 = -10;

/// Chi-squared style distance from English. Lower is more plausible.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ChiSquared(pub f64);

impl ChiSquared {
    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_better_than(&self, other: &ChiSquared) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Less
    }
}

/// Character-class score. Higher is more plausible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeuristicScore(pub i64);

impl HeuristicScore {
    pub const ZERO: HeuristicScore = HeuristicScore(0);

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_better_than(&self, other: &HeuristicScore) -> bool {
        self.0 > other.0
    }
}

impl Add for HeuristicScore {
    type Output = HeuristicScore;

    fn add(self, rhs: HeuristicScore) -> HeuristicScore {
        HeuristicScore(self.0 + rhs.0)
    }
}

impl Sum for HeuristicScore {
    fn sum<I: Iterator<Item = HeuristicScore>>(iter: I) -> HeuristicScore {
        iter.fold(HeuristicScore::ZERO, Add::add)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Space, comma, period and ASCII letters.
    Expected,
    /// Control characters (other than newline), DEL and non-ASCII bytes.
    Excluded,
    Other,
}

pub fn char_class(byte: u8) -> CharClass {
    match byte {
        b' ' | b',' | b'.' | b'A'..=b'Z' | b'a'..=b'z' => CharClass::Expected,
        0..=9 | 11..=31 | 127..=255 => CharClass::Excluded,
        _ => CharClass::Other,
    }
}

pub fn char_score(byte: u8) -> HeuristicScore {
    match char_class(byte) {
        CharClass::Expected => HeuristicScore(EXPECTED_SCORE),
        CharClass::Excluded => HeuristicScore(EXCLUDED_SCORE),
        CharClass::Other => HeuristicScore(OTHER_SCORE),
    }
}

pub fn score_heuristic(bytes: &[u8]) -> HeuristicScore {
    bytes.iter().map(|&b| char_score(b)).sum()
}

/// True if no byte is in the excluded class.
pub fn is_printable(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| char_class(b) != CharClass::Excluded)
}

/// A relative frequency for each of the 256 byte values.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyProfile {
    weights: [f64; 256],
}

impl FrequencyProfile {
    /// Expected frequencies for English text. Bytes other than lowercase
    /// letters, space, comma and period have weight zero.
    pub fn english() -> Self {
        Self {
            weights: std::array::from_fn(|b| english_frequency(b as u8)),
        }
    }

    /// The observed relative frequencies of the bytes in a buffer.
    pub fn observed(bytes: &[u8]) -> Self {
        let mut counts = [0u64; 256];
        bytes.iter().for_each(|&b| counts[b as usize] += 1);
        let total = bytes.len() as f64;
        Self {
            weights: counts.map(|c| if c == 0 { 0.0 } else { c as f64 / total }),
        }
    }

    pub fn weight(&self, byte: u8) -> f64 {
        self.weights[byte as usize]
    }
}

fn english_frequency(byte: u8) -> f64 {
    match byte {
        b'a'..=b'z' => LETTER_FREQUENCIES[(byte - b'a') as usize],
        b' ' => SPACE_FREQUENCY,
        b'.' => PERIOD_FREQUENCY,
        b',' => COMMA_FREQUENCY,
        _ => 0.0,
    }
}

/// Distance of a buffer's byte distribution from English.
///
/// Only byte values that occur in the buffer contribute, so English letters
/// missing from a short candidate aren't penalised.
pub fn score_chi_squared(bytes: &[u8]) -> ChiSquared {
    let english = FrequencyProfile::english();
    let observed = FrequencyProfile::observed(bytes);
    let sum_sq: f64 = (0..=255u8)
        .filter(|&b| observed.weight(b) > 0.0)
        .map(|b| (observed.weight(b) - english.weight(b)).powi(2))
        .sum();
    ChiSquared(sum_sq.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{Rng, SeedableRng};
    use rstest::rstest;

    const ENGLISH: &[u8] = b"I have met them at close of day coming with vivid faces from counter \
        or desk among grey eighteenth-century houses.";

    #[rstest]
    #[case(b' ', CharClass::Expected)]
    #[case(b',', CharClass::Expected)]
    #[case(b'.', CharClass::Expected)]
    #[case(b'A', CharClass::Expected)]
    #[case(b'z', CharClass::Expected)]
    #[case(b'\n', CharClass::Other)]
    #[case(b'7', CharClass::Other)]
    #[case(b'!', CharClass::Other)]
    #[case(b'~', CharClass::Other)]
    #[case(0, CharClass::Excluded)]
    #[case(9, CharClass::Excluded)]
    #[case(11, CharClass::Excluded)]
    #[case(31, CharClass::Excluded)]
    #[case(127, CharClass::Excluded)]
    #[case(255, CharClass::Excluded)]
    fn char_class_classifies_bytes(#[case] byte: u8, #[case] expected: CharClass) {
        assert_eq!(char_class(byte), expected);
    }

    #[test]
    fn score_heuristic_sums_char_scores() {
        // 'Hi' + ' ' = 3, '!' = -10, '\x01' = -99
        assert_eq!(score_heuristic(b"Hi !\x01"), HeuristicScore(3 - 10 - 99));
        assert_eq!(score_heuristic(b""), HeuristicScore::ZERO);
    }

    #[test]
    fn is_printable_rejects_control_bytes() {
        assert!(is_printable(b"Now that the party is jumping\n"));
        assert!(!is_printable(b"Now that the party\x7f"));
    }

    #[test]
    fn score_chi_squared_matches_hand_calculation() {
        // 'a' twice, 'Z' twice: (0.5 - 0.065336)^2 + (0.5 - 0)^2
        let score = score_chi_squared(b"aZaZ");

        let expected = ((0.5f64 - 0.065336).powi(2) + 0.25).sqrt();
        assert!((score.value() - expected).abs() < 1e-12);
    }

    #[test]
    fn score_chi_squared_of_empty_buffer_is_zero() {
        assert_eq!(score_chi_squared(b""), ChiSquared(0.0));
    }

    #[test]
    fn score_chi_squared_prefers_english_over_random_bytes() {
        let english_score = score_chi_squared(ENGLISH);
        let mut rng = rand::rngs::StdRng::seed_from_u64(101);

        for _ in 0..200 {
            let mut random = vec![0u8; ENGLISH.len()];
            rng.fill(random.as_mut_slice());

            let random_score = score_chi_squared(&random);

            assert!(english_score.is_better_than(&random_score));
        }
    }

    #[test]
    fn scores_compare_in_their_own_direction() {
        assert!(ChiSquared(0.1).is_better_than(&ChiSquared(0.2)));
        assert!(HeuristicScore(-3).is_better_than(&HeuristicScore(-10)));
        assert!(!HeuristicScore(5).is_better_than(&HeuristicScore(5)));
    }

    #[test]
    fn frequency_profile_observed_sums_to_one() {
        let profile = FrequencyProfile::observed(ENGLISH);

        let total: f64 = (0..=255u8).map(|b| profile.weight(b)).sum();

        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(FrequencyProfile::english().weight(b'Q'), 0.0);
    }
}
