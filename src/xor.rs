// Breaking single-byte and repeating-key XOR ciphers.
//
// For a single-byte key we brute force all 256 keys, throw away any candidate
// containing control or non-ASCII bytes, and keep the candidate whose byte
// distribution is closest to English.
//
// A repeating-key cipher is a set of interleaved single-byte ciphers: every
// byte at the same position modulo the key size was XOR-ed with the same key
// byte. Transposing the ciphertext into those columns lets us break each key
// byte independently.
use std::ops::Range;

use log::{debug, trace};
use rayon::prelude::*;

use crate::{
    bytes::repeating_xor,
    score::{is_printable, score_chi_squared, ChiSquared},
    Error, Result,
};

/// Key sizes searched by [`break_repeating_xor`] by default.
pub const DEFAULT_KEY_SIZES: Range<usize> = 2..41;
/// How many of the most likely key sizes are fully solved.
pub const KEY_SIZE_CANDIDATES: usize = 3;
const EDIT_DISTANCE_BLOCKS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct XorCrackResult {
    pub key: u8,
    pub plaintext: Vec<u8>,
    pub score: ChiSquared,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepeatingXorCrack {
    pub key: Vec<u8>,
    pub plaintext: Vec<u8>,
    pub score: ChiSquared,
}

/// Find the most English-like single-byte XOR decryption of a ciphertext.
///
/// Ties keep the lowest key.
pub fn decrypt_info(ciphertext: &[u8]) -> Result<XorCrackResult> {
    let candidates: Vec<Option<XorCrackResult>> = (0..=255u8)
        .into_par_iter()
        .map(|key| {
            let plaintext: Vec<u8> = ciphertext.iter().map(|b| b ^ key).collect();
            if !is_printable(&plaintext) {
                return None;
            }
            let score = score_chi_squared(&plaintext);
            Some(XorCrackResult {
                key,
                plaintext,
                score,
            })
        })
        .collect();

    let best = candidates
        .into_iter()
        .flatten()
        .fold(None, |best: Option<XorCrackResult>, candidate| match best {
            Some(b) if !candidate.score.is_better_than(&b.score) => Some(b),
            _ => Some(candidate),
        })
        .ok_or(Error::NoPlausibleCandidate)?;
    trace!("best single-byte key {:#04x} scored {:.4}", best.key, best.score.value());
    Ok(best)
}

pub fn decrypt_no_key(ciphertext: &[u8]) -> Result<Vec<u8>> {
    Ok(decrypt_info(ciphertext)?.plaintext)
}

/// Pick out the one ciphertext of a set that was single-byte XOR encrypted
/// English, and return its plaintext.
///
/// Members without any printable candidate are skipped. Ties keep the first
/// member.
pub fn detect<T: AsRef<[u8]>>(ciphertexts: &[T]) -> Result<Vec<u8>> {
    Ok(detect_info(ciphertexts)?.1.plaintext)
}

/// Like [`detect`], but also returns the index of the detected ciphertext.
pub fn detect_info<T: AsRef<[u8]>>(ciphertexts: &[T]) -> Result<(usize, XorCrackResult)> {
    let mut best: Option<(usize, XorCrackResult)> = None;
    for (idx, ciphertext) in ciphertexts.iter().enumerate() {
        let Ok(result) = decrypt_info(ciphertext.as_ref()) else {
            continue;
        };
        if best
            .as_ref()
            .map_or(true, |(_, b)| result.score.is_better_than(&b.score))
        {
            best = Some((idx, result));
        }
    }
    let (idx, result) = best.ok_or(Error::NoPlausibleCandidate)?;
    debug!(
        "detected ciphertext {idx} of {} with key {:#04x} (score {:.4})",
        ciphertexts.len(),
        result.key,
        result.score.value()
    );
    Ok((idx, result))
}

pub fn hamming_distance(a: &[u8], b: &[u8]) -> u32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum()
}

/// Break a repeating-key XOR cipher whose key size is known.
pub fn break_repeating_xor_with_key_size(
    bytes: &[u8],
    key_size: usize,
) -> Result<RepeatingXorCrack> {
    if key_size == 0 {
        return Err(Error::NoPlausibleCandidate);
    }
    let key = (0..key_size)
        .into_par_iter()
        // Transpose the ciphertext to group all bytes that would have
        // been XOR-ed with the same byte of the key.
        .map(|byte_idx| {
            bytes
                .iter()
                .skip(byte_idx)
                .step_by(key_size)
                .copied()
                .collect::<Vec<_>>()
        })
        // Brute force the i-th byte of the key.
        .map(|column| decrypt_info(&column).map(|result| result.key))
        .collect::<Result<Vec<u8>>>()?;
    let plaintext = repeating_xor(bytes, &key);
    let score = score_chi_squared(&plaintext);
    Ok(RepeatingXorCrack {
        key,
        plaintext,
        score,
    })
}

/// Break a repeating-key XOR cipher with a key size somewhere in
/// `key_sizes`.
///
/// The key sizes whose consecutive blocks have the smallest normalised edit
/// distance are solved, and the most English-like result wins.
pub fn break_repeating_xor(bytes: &[u8], key_sizes: Range<usize>) -> Result<RepeatingXorCrack> {
    let candidate_sizes: Vec<usize> = sorted_edit_distances(bytes, key_sizes)
        .into_iter()
        .map(|(_, key_size)| key_size)
        .take(KEY_SIZE_CANDIDATES)
        .collect();
    debug!("candidate repeating-xor key sizes: {candidate_sizes:?}");

    let mut best: Option<RepeatingXorCrack> = None;
    for key_size in candidate_sizes {
        let Ok(candidate) = break_repeating_xor_with_key_size(bytes, key_size) else {
            debug!("no printable decryption for key size {key_size}");
            continue;
        };
        if best
            .as_ref()
            .map_or(true, |b| candidate.score.is_better_than(&b.score))
        {
            best = Some(candidate);
        }
    }
    best.ok_or(Error::NoPlausibleCandidate)
}

fn sorted_edit_distances(bytes: &[u8], key_sizes: Range<usize>) -> Vec<(f64, usize)> {
    let mut edit_distances: Vec<(f64, usize)> = key_sizes
        .filter(|&key_size| key_size > 0 && bytes.len() >= 2 * key_size)
        .map(|key_size| (block_edit_distance(bytes, key_size), key_size))
        .collect();
    edit_distances.sort_by(|a, b| a.0.total_cmp(&b.0));
    edit_distances
}

/// Mean Hamming distance between consecutive key-sized blocks, per byte.
fn block_edit_distance(bytes: &[u8], key_size: usize) -> f64 {
    let blocks: Vec<&[u8]> = bytes.chunks_exact(key_size).collect();
    let distances: Vec<u32> = blocks
        .windows(2)
        .take(EDIT_DISTANCE_BLOCKS)
        .map(|pair| hamming_distance(pair[0], pair[1]))
        .collect();
    distances.iter().sum::<u32>() as f64 / distances.len() as f64 / key_size as f64
}
