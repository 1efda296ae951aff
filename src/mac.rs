// Secret-prefix MACs and length-extension forgery.
//
// A secret-prefix MAC is H(key || message). A Merkle–Damgård digest is the
// hasher's entire state after the padded input, so given H(key || message) we
// can rebuild that state and keep hashing:
//
//   H(key || message || glue || extension)
//
// where `glue` is the padding the hasher appended to `key || message`. The
// glue depends on the key's length, which the attacker has to guess.
use std::{marker::PhantomData, ops::Range};

use log::{debug, trace};

use crate::{hash::md_padding, Error, Hasher, ResumableHasher, Result, Sha1, SHA1_LEN};

/// Secret key lengths tried by [`forge_mac`] callers by default.
pub const DEFAULT_KEY_LENGTHS: Range<usize> = 0..64;

pub type Sha1PrefixMac = SecretPrefixMac<Sha1, SHA1_LEN>;

/// Keyed MAC of the form `H(key || message)`.
#[derive(Debug, Clone)]
pub struct SecretPrefixMac<H: Hasher<N>, const N: usize> {
    key: Vec<u8>,
    hasher: PhantomData<H>,
}

impl<H: Hasher<N>, const N: usize> SecretPrefixMac<H, N> {
    pub fn new(key: &[u8]) -> Self {
        Self {
            key: key.to_vec(),
            hasher: PhantomData,
        }
    }

    pub fn authenticate(&self, message: &[u8]) -> [u8; N] {
        authenticate::<H, N>(message, &self.key)
    }

    pub fn verify(&self, mac: &[u8], message: &[u8]) -> bool {
        verify::<H, N>(mac, message, &self.key)
    }
}

pub fn authenticate<H: Hasher<N>, const N: usize>(message: &[u8], key: &[u8]) -> [u8; N] {
    let mut hasher = H::default();
    hasher.update(key);
    hasher.update(message);
    hasher.digest()
}

/// Not constant time.
pub fn verify<H: Hasher<N>, const N: usize>(candidate: &[u8], message: &[u8], key: &[u8]) -> bool {
    authenticate::<H, N>(message, key) == candidate
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forgery<const N: usize> {
    /// `known_message || glue || extension`.
    pub message: Vec<u8>,
    pub mac: [u8; N],
    /// The secret key length the forgery was built for.
    pub key_len: usize,
}

/// Forge a MAC for `known_message || glue || extension` assuming the secret
/// key is `key_len` bytes long.
pub fn forge_for_key_len<H, const N: usize>(
    known_mac: &[u8; N],
    known_message: &[u8],
    extension: &[u8],
    key_len: usize,
) -> Forgery<N>
where
    H: ResumableHasher<N>,
{
    let authenticated_len = (key_len + known_message.len()) as u64;
    let glue = md_padding(authenticated_len);
    let mac = H::from_digest(known_mac, authenticated_len + glue.len() as u64)
        .update_and_digest(extension);
    Forgery {
        message: [known_message, &glue, extension].concat(),
        mac,
        key_len,
    }
}

/// One forgery per candidate key length.
pub fn forge_candidates<'a, H, const N: usize>(
    known_mac: &'a [u8; N],
    known_message: &'a [u8],
    extension: &'a [u8],
    key_lengths: Range<usize>,
) -> impl Iterator<Item = Forgery<N>> + 'a
where
    H: ResumableHasher<N>,
{
    key_lengths.map(move |key_len| {
        forge_for_key_len::<H, N>(known_mac, known_message, extension, key_len)
    })
}

/// Extend an authenticated message without knowing the key.
///
/// Each key length in `key_lengths` is tried in order and the first forgery
/// `accept` agrees with is returned. `accept` stands in for whoever checks
/// MACs, e.g. [`SecretPrefixMac::verify`].
pub fn forge_mac<H, const N: usize, F>(
    known_mac: &[u8; N],
    known_message: &[u8],
    extension: &[u8],
    key_lengths: Range<usize>,
    mut accept: F,
) -> Result<Forgery<N>>
where
    H: ResumableHasher<N>,
    F: FnMut(&Forgery<N>) -> bool,
{
    for forgery in
        forge_candidates::<H, N>(known_mac, known_message, extension, key_lengths.clone())
    {
        trace!("trying key length {}", forgery.key_len);
        if accept(&forgery) {
            debug!("forged MAC with key length {}", forgery.key_len);
            return Ok(forgery);
        }
    }
    Err(Error::ForgeryFailed { key_lengths })
}
