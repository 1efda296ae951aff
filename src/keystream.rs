// Recovering CTR keystream without the key.
//
// Two weaknesses are exploited here:
//
//  - Reusing a nonce. Every ciphertext encrypted under the same key and nonce
//    was XOR-ed with the same keystream, so byte j of every ciphertext shares
//    a single key byte. Each column is a single-byte XOR problem.
//
//  - Exposing an edit function. Writing a known plaintext over the message and
//    reading back the new ciphertext hands us the keystream directly:
//        C' = K ⊕ P'  →  K = C' ⊕ P'
use log::{debug, trace};
use rayon::prelude::*;

use crate::{
    score::{char_score, HeuristicScore},
    xor::break_repeating_xor_with_key_size,
    xor_bytes, Error, Result,
};

#[derive(Debug, Clone, PartialEq)]
pub struct KeystreamRecovery {
    pub keystream: Vec<u8>,
    pub plaintexts: Vec<Vec<u8>>,
}

impl KeystreamRecovery {
    fn from_keystream<T: AsRef<[u8]>>(keystream: Vec<u8>, ciphertexts: &[T]) -> Self {
        let plaintexts = ciphertexts
            .iter()
            .map(|ciphertext| xor_bytes(ciphertext.as_ref(), &keystream))
            .collect();
        Self {
            keystream,
            plaintexts,
        }
    }
}

/// Guess the shared keystream one position at a time.
///
/// Every position up to the longest ciphertext is guessed using the
/// ciphertexts long enough to reach it, so later positions rest on fewer
/// samples and are less reliable.
pub fn guess_keystream<T: AsRef<[u8]> + Sync>(ciphertexts: &[T]) -> Vec<u8> {
    let keystream_len = ciphertexts
        .iter()
        .map(|c| c.as_ref().len())
        .max()
        .unwrap_or(0);
    (0..keystream_len)
        .into_par_iter()
        .map(|position| best_keystream_byte(position, ciphertexts))
        .collect()
}

/// The keystream byte at `position` whose decryptions score highest.
///
/// Ties keep the lowest byte.
pub fn best_keystream_byte<T: AsRef<[u8]>>(position: usize, ciphertexts: &[T]) -> u8 {
    let mut best: Option<(u8, HeuristicScore)> = None;
    for candidate in 0..=255u8 {
        let score = score_keystream_guess(candidate, position, ciphertexts);
        if best.map_or(true, |(_, best_score)| score.is_better_than(&best_score)) {
            best = Some((candidate, score));
        }
    }
    let (byte, score) = best.unwrap_or((0, HeuristicScore::ZERO));
    trace!("keystream[{position}] = {byte:#04x} (score {})", score.value());
    byte
}

fn score_keystream_guess<T: AsRef<[u8]>>(
    candidate: u8,
    position: usize,
    ciphertexts: &[T],
) -> HeuristicScore {
    ciphertexts
        .iter()
        .filter_map(|ciphertext| ciphertext.as_ref().get(position))
        .map(|&c| char_score(c ^ candidate))
        .sum()
}

/// Decrypt nonce-reusing ciphertexts column by column across their full
/// lengths.
pub fn recover_columnwise<T: AsRef<[u8]> + Sync>(ciphertexts: &[T]) -> KeystreamRecovery {
    let keystream = guess_keystream(ciphertexts);
    KeystreamRecovery::from_keystream(keystream, ciphertexts)
}

/// Decrypt nonce-reusing ciphertexts by truncating them to a common length and
/// treating their concatenation as one repeating-key XOR ciphertext, where the
/// key is the keystream.
pub fn statistical_decrypt<T: AsRef<[u8]>>(ciphertexts: &[T]) -> Result<KeystreamRecovery> {
    let key_size = ciphertexts
        .iter()
        .map(|c| c.as_ref().len())
        .min()
        .unwrap_or(0);
    if key_size == 0 {
        return Ok(KeystreamRecovery {
            keystream: Vec::new(),
            plaintexts: vec![Vec::new(); ciphertexts.len()],
        });
    }
    let truncated: Vec<&[u8]> = ciphertexts
        .iter()
        .map(|c| &c.as_ref()[..key_size])
        .collect();
    debug!(
        "solving {} ciphertexts truncated to {key_size} bytes",
        truncated.len()
    );
    let crack = break_repeating_xor_with_key_size(&truncated.concat(), key_size)?;
    Ok(KeystreamRecovery::from_keystream(crack.key, &truncated))
}

/// Read `len` bytes of keystream starting at `offset` out of an edit
/// function, by writing zeros over that range.
///
/// `edit` takes a ciphertext, an offset and a new plaintext and returns the
/// re-encrypted ciphertext.
pub fn reveal_keystream<F>(
    ciphertext: &[u8],
    offset: usize,
    len: usize,
    mut edit: F,
) -> Result<Vec<u8>>
where
    F: FnMut(&[u8], usize, &[u8]) -> Result<Vec<u8>>,
{
    let end = ciphertext.len().min(offset.saturating_add(len));
    if offset >= end {
        return Ok(Vec::new());
    }
    let edited = edit(ciphertext, offset, &vec![0u8; end - offset])?;
    if edited.len() < end {
        return Err(Error::OracleAttack(format!(
            "edit returned {} bytes, expected at least {end}",
            edited.len()
        )));
    }
    Ok(edited[offset..end].to_vec())
}

/// Recover a whole plaintext through an edit function.
pub fn reveal_plaintext<F>(ciphertext: &[u8], edit: F) -> Result<Vec<u8>>
where
    F: FnMut(&[u8], usize, &[u8]) -> Result<Vec<u8>>,
{
    let keystream = reveal_keystream(ciphertext, 0, ciphertext.len(), edit)?;
    Ok(xor_bytes(ciphertext, &keystream))
}

#[cfg(test)]
mod tests {
    use super::*;

    use base64::Engine;

    use crate::{ctr, random_bytes_with_seed};

    // Beyond this many bytes too few of the fixture lines are long enough to
    // give reliable statistics.
    const N_CHARS_TO_MATCH: usize = 32;

    fn read_fixture_plaintexts() -> Vec<Vec<u8>> {
        std::fs::read_to_string("./data/fixed_nonce.b64")
            .unwrap()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                base64::engine::general_purpose::STANDARD
                    .decode(line.trim())
                    .unwrap()
            })
            .collect()
    }

    fn encrypt_with_fixed_nonce(plaintexts: &[Vec<u8>], seed: u64) -> Vec<Vec<u8>> {
        let key = random_bytes_with_seed::<16>(seed);
        let nonce = [0u8; 8];
        plaintexts
            .iter()
            .map(|plaintext| ctr::encrypt(plaintext, &key, &nonce).unwrap())
            .collect()
    }

    fn lowercase(bytes: &[u8]) -> Vec<u8> {
        bytes.to_ascii_lowercase()
    }

    #[test]
    fn recover_columnwise_recovers_plaintexts() {
        let plaintexts = read_fixture_plaintexts();
        let ciphertexts = encrypt_with_fixed_nonce(&plaintexts, 101);

        let recovery = recover_columnwise(&ciphertexts);

        // A column of letters only can't tell upper from lower case apart, so
        // compare case-insensitively.
        for (recovered, expected) in recovery.plaintexts.iter().zip(&plaintexts) {
            assert_eq!(recovered.len(), expected.len());
            let n_chars = N_CHARS_TO_MATCH.min(expected.len());
            assert_eq!(
                lowercase(&recovered[..n_chars]),
                lowercase(&expected[..n_chars]),
                "{}",
                String::from_utf8_lossy(recovered)
            );
        }
    }

    #[test]
    fn guess_keystream_matches_true_keystream_where_spaces_are_present() {
        let plaintexts = read_fixture_plaintexts();
        let key = random_bytes_with_seed::<16>(7);
        let nonce = [0u8; 8];
        let ciphertexts = encrypt_with_fixed_nonce(&plaintexts, 7);
        let true_keystream = ctr::encrypt(&[0u8; 64], &key, &nonce).unwrap();

        let keystream = guess_keystream(&ciphertexts);

        let max_len = plaintexts.iter().map(|p| p.len()).max().unwrap();
        assert_eq!(keystream.len(), max_len);
        for position in 0..N_CHARS_TO_MATCH {
            let column_has_space = plaintexts
                .iter()
                .any(|p| p.get(position) == Some(&b' '));
            if column_has_space {
                assert_eq!(keystream[position], true_keystream[position]);
            }
        }
    }

    #[test]
    fn best_keystream_byte_accepts_negative_best_score() {
        // Every candidate decrypts '\x00' at least once into the excluded set,
        // so the best score is negative and must still be chosen.
        let ciphertexts: Vec<Vec<u8>> = vec![vec![0x00], vec![0x80], vec![b'!' ^ 0x41]];

        let byte = best_keystream_byte(0, &ciphertexts);

        let score = score_keystream_guess(byte, 0, &ciphertexts);
        assert!(score.value() < 0);
        assert!((0..=255u8)
            .all(|c| !score_keystream_guess(c, 0, &ciphertexts).is_better_than(&score)));
    }

    #[test]
    fn statistical_decrypt_recovers_truncated_plaintexts() {
        let plaintexts = read_fixture_plaintexts();
        let ciphertexts = encrypt_with_fixed_nonce(&plaintexts, 202);
        let min_len = plaintexts.iter().map(|p| p.len()).min().unwrap();

        let recovery = statistical_decrypt(&ciphertexts).unwrap();

        assert_eq!(recovery.keystream.len(), min_len);
        for (recovered, expected) in recovery.plaintexts.iter().zip(&plaintexts) {
            assert_eq!(lowercase(recovered), lowercase(&expected[..min_len]));
        }
    }

    #[test]
    fn statistical_decrypt_of_empty_ciphertext_is_empty() {
        let ciphertexts: Vec<Vec<u8>> = vec![b"abc".to_vec(), Vec::new()];

        let recovery = statistical_decrypt(&ciphertexts).unwrap();

        assert!(recovery.keystream.is_empty());
        assert_eq!(recovery.plaintexts, vec![Vec::<u8>::new(), Vec::new()]);
    }

    #[test]
    fn reveal_keystream_reads_keystream_at_offset() {
        let key = random_bytes_with_seed::<16>(3);
        let nonce = [9u8; 8];
        let ciphertext = ctr::encrypt(&[b'z'; 40], &key, &nonce).unwrap();
        let true_keystream = ctr::encrypt(&[0u8; 40], &key, &nonce).unwrap();
        let mut n_calls = 0;

        let keystream = reveal_keystream(&ciphertext, 20, 10, |c, offset, text| {
            n_calls += 1;
            ctr::edit(c, &key, &nonce, offset, text)
        })
        .unwrap();

        assert_eq!(n_calls, 1);
        assert_eq!(keystream, &true_keystream[20..30]);
    }

    #[test]
    fn reveal_keystream_returns_err_given_truncated_edit() {
        let ciphertext = vec![0u8; 40];

        let result = reveal_keystream(&ciphertext, 20, 10, |c, _, _| Ok(c[..25].to_vec()));

        assert!(matches!(result, Err(Error::OracleAttack(_))));
    }

    #[test]
    fn reveal_plaintext_recovers_plaintext() {
        let key = random_bytes_with_seed::<16>(4);
        let nonce = [0u8; 8];
        let plaintext = b"Nobody expects the random access read/write oracle.".to_vec();
        let ciphertext = ctr::encrypt(&plaintext, &key, &nonce).unwrap();

        let recovered = reveal_plaintext(&ciphertext, |c, offset, text| {
            ctr::edit(c, &key, &nonce, offset, text)
        })
        .unwrap();

        assert_eq!(recovered, plaintext);
    }
}
