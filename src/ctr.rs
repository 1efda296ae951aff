// Counter mode.
//
// AES-CTR works as follows:
//
//         nonce|counter0                nonce|counter1
//              ↓                             ↓
//     key → < AES >                 key → < AES >
//              ↓                             ↓                 ...
// plaintext →  ⊕               plaintext  →  ⊕
//              ↓                             ↓
//          ciphertext                    ciphertext
//
// The nonce and counter are each half a block and both are little-endian.
// Since each keystream block is independent, encryption and decryption are
// the same operation and any byte of a ciphertext can be rewritten in place.
use crate::{
    block::{Aes128Block, BlockCipher},
    Error, Result,
};

pub const NONCE_SIZE: usize = 8;
pub const COUNTER_SIZE: usize = 8;

/// Increment a little-endian counter by one, in place.
///
/// Overflow past the counter's width wraps silently to zero.
pub fn increment_counter(counter: &mut [u8]) {
    for byte in counter.iter_mut() {
        let (incremented, overflowed) = byte.overflowing_add(1);
        *byte = incremented;
        if !overflowed {
            return;
        }
    }
}

pub fn encrypt(plaintext: &[u8], key: &[u8], nonce: &[u8]) -> Result<Vec<u8>> {
    apply(plaintext, key, nonce)
}

pub fn decrypt(ciphertext: &[u8], key: &[u8], nonce: &[u8]) -> Result<Vec<u8>> {
    apply(ciphertext, key, nonce)
}

/// XOR `input` with the keystream for `key` and `nonce`, counting from zero.
pub fn apply(input: &[u8], key: &[u8], nonce: &[u8]) -> Result<Vec<u8>> {
    apply_with(&Aes128Block::new(key)?, input, nonce)
}

pub fn apply_with<C: BlockCipher>(cipher: &C, input: &[u8], nonce: &[u8]) -> Result<Vec<u8>> {
    apply_with_counter(cipher, input, nonce, [0u8; COUNTER_SIZE])
}

pub fn apply_with_counter<C: BlockCipher>(
    cipher: &C,
    input: &[u8],
    nonce: &[u8],
    initial_counter: [u8; COUNTER_SIZE],
) -> Result<Vec<u8>> {
    let keystream = keystream_with_counter(cipher, nonce, initial_counter, input.len())?;
    Ok(input.iter().zip(keystream).map(|(i, k)| i ^ k).collect())
}

/// Generate `len` bytes of keystream.
pub fn keystream_with_counter<C: BlockCipher>(
    cipher: &C,
    nonce: &[u8],
    initial_counter: [u8; COUNTER_SIZE],
    len: usize,
) -> Result<Vec<u8>> {
    if nonce.len() != NONCE_SIZE {
        return Err(Error::InvalidNonceLength {
            expected: NONCE_SIZE,
            actual: nonce.len(),
        });
    }
    let mut counter = initial_counter;
    let mut keystream = Vec::with_capacity(len.next_multiple_of(cipher.block_size()));
    while keystream.len() < len {
        // Make the CTR block by concatenating nonce and counter
        let mut ctr_block = [nonce, counter.as_slice()].concat();
        cipher.encrypt_block(&mut ctr_block)?;
        keystream.extend_from_slice(&ctr_block);
        increment_counter(&mut counter);
    }
    keystream.truncate(len);
    Ok(keystream)
}

/// Rewrite the plaintext under a ciphertext, starting at byte `offset`.
///
/// The message is never extended: bytes of `new_plaintext` that would land past
/// the end of the ciphertext are dropped.
pub fn edit(
    ciphertext: &[u8],
    key: &[u8],
    nonce: &[u8],
    offset: usize,
    new_plaintext: &[u8],
) -> Result<Vec<u8>> {
    let cipher = Aes128Block::new(key)?;
    let mut plaintext = apply_with(&cipher, ciphertext, nonce)?;
    if offset < plaintext.len() {
        let end = plaintext.len().min(offset + new_plaintext.len());
        plaintext[offset..end].copy_from_slice(&new_plaintext[..(end - offset)]);
    }
    apply_with(&cipher, &plaintext, nonce)
}
