use crate::{hash::MD_BLOCK_SIZE, Hasher, Sha1, Sha256, SHA1_LEN, SHA256_LEN};

const O_PAD: u8 = 0x5c;
const I_PAD: u8 = 0x36;

pub type HmacSha1 = Hmac<Sha1, SHA1_LEN>;
pub type HmacSha256 = Hmac<Sha256, SHA256_LEN>;

/// Keyed hash `H((K ⊕ opad) || H((K ⊕ ipad) || message))`.
///
/// The inner hash absorbs the message as it arrives; the outer hash only runs
/// when the MAC is taken.
#[derive(Debug, Clone)]
pub struct Hmac<H: Hasher<N>, const N: usize> {
    inner: H,
    outer_key: Vec<u8>,
}

impl<H: Hasher<N>, const N: usize> Hmac<H, N> {
    pub fn new(key: &[u8]) -> Self {
        let key_block = block_sized_key(key, H::BLOCK_SIZE, |k| H::digest_message(k).to_vec());
        let mut inner = H::default();
        inner.update(&xor_with_pad(&key_block, I_PAD));
        Self {
            inner,
            outer_key: xor_with_pad(&key_block, O_PAD),
        }
    }

    pub fn digest_message(key: &[u8], message: &[u8]) -> [u8; N] {
        Self::new(key).update_and_digest(message)
    }

    pub fn update(&mut self, message: &[u8]) {
        self.inner.update(message);
    }

    pub fn update_and_digest(mut self, message: &[u8]) -> [u8; N] {
        self.update(message);
        self.digest()
    }

    pub fn digest(self) -> [u8; N] {
        let inner_digest = self.inner.digest();
        let mut outer = H::default();
        outer.update(&self.outer_key);
        outer.update_and_digest(&inner_digest)
    }
}

/// HMAC over any digest function with a 64-byte block.
///
/// Equivalent to [`Hmac`] but takes the hash as a plain function, for digests
/// that don't implement [`Hasher`].
pub fn hmac_with<F>(hash_fn: F, key: &[u8], message: &[u8]) -> Vec<u8>
where
    F: Fn(&[u8]) -> Vec<u8>,
{
    let key_block = block_sized_key(key, MD_BLOCK_SIZE, &hash_fn);
    let inner = hash_fn(&[xor_with_pad(&key_block, I_PAD).as_slice(), message].concat());
    hash_fn(&[xor_with_pad(&key_block, O_PAD), inner].concat())
}

/// Zero-extend the key to `block_size`, hashing it first if it's longer than
/// a block.
fn block_sized_key<F>(key: &[u8], block_size: usize, hash_fn: F) -> Vec<u8>
where
    F: FnOnce(&[u8]) -> Vec<u8>,
{
    let mut key_block = if key.len() > block_size {
        hash_fn(key)
    } else {
        key.to_vec()
    };
    key_block.resize(block_size, 0);
    key_block
}

fn xor_with_pad(key_block: &[u8], pad: u8) -> Vec<u8> {
    key_block.iter().map(|b| b ^ pad).collect()
}
