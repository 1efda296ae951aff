// CBC padding oracle.
//
// Decrypting a block C_i with a block X of our choosing in front of it gives
//
//     P' = D(C_i) ⊕ X = P_i ⊕ C_{i-1} ⊕ X,
//
// so P_i = P' ⊕ C_{i-1} ⊕ X and no key is involved. The oracle tells us when
// P' ends in valid padding. We vary the last byte of X until it does; P' then
// ends in 0x01 and we know the last byte of P_i. Fixing that byte to decrypt
// to 0x02 and varying the one before it recovers the next byte, and so on up
// the block.
//
// X is called the forced IV below: it is the IV of a one-block query.
use log::{debug, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{block::BLOCK_SIZE, cbc, random_bytes, Error, Result};

const PLAINTEXTS: [&str; 10] = [
    "000000Now that the party is jumping",
    "000001With the bass kicked in and the Vega's are pumpin'",
    "000002Quick to the point, to the point, no faking",
    "000003Cooking MC's like a pound of bacon",
    "000004Burning 'em, if you ain't quick and nimble",
    "000005I go crazy when I hear a cymbal",
    "000006And a high hat with a souped up tempo",
    "000007I'm on a roll, it's time to go solo",
    "000008ollin' in my five point oh",
    "000009ith my rag-top down so my hair can blow",
];

pub struct PaddingOracle {
    key: [u8; BLOCK_SIZE],
    rng: StdRng,
}

impl PaddingOracle {
    pub fn new(key: [u8; BLOCK_SIZE], seed: u64) -> Self {
        Self {
            key,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Encrypt one of a fixed set of secret strings under a fresh IV.
    pub fn encrypt_random_plaintext(&mut self) -> Result<([u8; BLOCK_SIZE], Vec<u8>)> {
        let idx = self.rng.gen_range(0..PLAINTEXTS.len());
        self.encrypt(PLAINTEXTS[idx].as_bytes())
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<([u8; BLOCK_SIZE], Vec<u8>)> {
        let iv = random_bytes::<BLOCK_SIZE>();
        let ciphertext = cbc::encrypt(plaintext, &self.key, &iv)?;
        Ok((iv, ciphertext))
    }

    pub fn padding_valid(&self, iv: &[u8], ciphertext: &[u8]) -> bool {
        cbc::decrypt(ciphertext, &self.key, iv).is_ok()
    }
}

/// Recover the padded plaintext of `ciphertext` using only the oracle.
pub fn attack(ciphertext: &[u8], iv: &[u8], oracle: &PaddingOracle) -> Result<Vec<u8>> {
    if iv.len() != BLOCK_SIZE || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(Error::InvalidBlockLength {
            expected: BLOCK_SIZE,
            actual: if iv.len() != BLOCK_SIZE {
                iv.len()
            } else {
                ciphertext.len() % BLOCK_SIZE
            },
        });
    }
    let blocks: Vec<&[u8]> = std::iter::once(iv)
        .chain(ciphertext.chunks_exact(BLOCK_SIZE))
        .collect();

    let mut plaintext = Vec::with_capacity(ciphertext.len());
    for (block_idx, pair) in blocks.windows(2).enumerate() {
        let block = attack_block(pair[0], pair[1], oracle).map_err(|byte_idx| {
            Error::OracleAttack(format!(
                "no byte made the padding valid at position {byte_idx} of block {block_idx}"
            ))
        })?;
        debug!("recovered block {block_idx} of {}", blocks.len() - 1);
        plaintext.extend_from_slice(&block);
    }
    Ok(plaintext)
}

/// Recover one plaintext block, or the index of the byte that couldn't be
/// found.
fn attack_block(
    previous: &[u8],
    block: &[u8],
    oracle: &PaddingOracle,
) -> std::result::Result<Vec<u8>, usize> {
    // The bytes of the block found so far, from the end backwards.
    let mut found: Vec<u8> = Vec::with_capacity(BLOCK_SIZE);
    for padding_len in 1..=BLOCK_SIZE {
        let byte = find_byte(previous, block, padding_len, &found, oracle)
            .ok_or(BLOCK_SIZE - padding_len)?;
        trace!("plaintext byte {} = {byte:#04x}", BLOCK_SIZE - padding_len);
        found.insert(0, byte);
    }
    Ok(found)
}

/// Build X so that, if `candidate` is the plaintext byte at
/// `BLOCK_SIZE - padding_len`, the query decrypts to `padding_len` bytes of
/// valid padding.
fn forced_iv(previous: &[u8], candidate: u8, padding_len: usize, found: &[u8]) -> Vec<u8> {
    let pad = padding_len as u8;
    let byte_idx = BLOCK_SIZE - padding_len;
    let mut forced = previous.to_vec();
    forced[byte_idx] ^= candidate ^ pad;
    for (offset, plain) in found.iter().enumerate() {
        forced[byte_idx + 1 + offset] ^= plain ^ pad;
    }
    forced
}

fn find_byte(
    previous: &[u8],
    block: &[u8],
    padding_len: usize,
    found: &[u8],
    oracle: &PaddingOracle,
) -> Option<u8> {
    let candidates: Vec<u8> = (0..=255u8)
        .filter(|&candidate| {
            oracle.padding_valid(&forced_iv(previous, candidate, padding_len, found), block)
        })
        .collect();

    if candidates.len() <= 1 || padding_len == BLOCK_SIZE {
        return candidates.first().copied();
    }

    // More than one candidate means the query happened to end in longer valid
    // padding, e.g. \x02\x02. The true byte's padding covers only the bytes
    // we forced, so it stays valid when the byte in front of them changes.
    let uncovered_idx = BLOCK_SIZE - padding_len - 1;
    candidates.into_iter().find(|&candidate| {
        let mut forced = forced_iv(previous, candidate, padding_len, found);
        forced[uncovered_idx] ^= 0xff;
        oracle.padding_valid(&forced, block)
    })
}
