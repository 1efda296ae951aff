// Merkle–Damgård hashing.
//
// The message is padded and fed block by block through a compression
// function that updates a fixed-size state; the digest is that final state.
// Padding is a single 1 bit, zeros up to 8 bytes short of a block boundary,
// then the message length in bits as a big-endian u64.
//
// Because the digest *is* the state, anyone holding H(m) can keep hashing
// from where H(m) left off.

/// Block size of the compression functions in this crate, in bytes.
pub const MD_BLOCK_SIZE: usize = 64;
const LENGTH_FIELD_SIZE: usize = 8;

pub trait Hasher<const N: usize>: Default {
    /// Size of a compression block in bytes.
    const BLOCK_SIZE: usize = MD_BLOCK_SIZE;

    fn update(&mut self, data: &[u8]);

    fn digest(self) -> [u8; N];

    fn digest_message(message: &[u8]) -> [u8; N] {
        let mut hasher = Self::default();
        hasher.update(message);
        hasher.digest()
    }

    fn update_and_digest(mut self, message: &[u8]) -> [u8; N] {
        self.update(message);
        self.digest()
    }
}

/// A hasher that can resume from a published digest.
pub trait ResumableHasher<const N: usize>: Hasher<N> {
    /// Rebuild the hasher's state from `digest`, as though it had already
    /// absorbed `processed_len` bytes. `processed_len` must be a multiple of
    /// the block size, i.e. it includes the padding of the original message.
    fn from_digest(digest: &[u8; N], processed_len: u64) -> Self;
}

/// The padding appended to a message of `message_len` bytes.
pub fn md_padding(message_len: u64) -> Vec<u8> {
    let len_mod = (message_len % MD_BLOCK_SIZE as u64) as usize;
    let n_zeros = (2 * MD_BLOCK_SIZE - LENGTH_FIELD_SIZE - 1 - len_mod) % MD_BLOCK_SIZE;
    let mut padding = Vec::with_capacity(1 + n_zeros + LENGTH_FIELD_SIZE);
    padding.push(0x80);
    padding.resize(1 + n_zeros, 0x00);
    padding.extend_from_slice(&message_len.wrapping_mul(8).to_be_bytes());
    padding
}

pub fn md_pad(message: &[u8]) -> Vec<u8> {
    [message, &md_padding(message.len() as u64)].concat()
}

/// Buffers input into whole blocks for a compression function.
#[derive(Debug, Clone)]
pub(crate) struct BlockBuffer {
    buffer: [u8; MD_BLOCK_SIZE],
    buffer_len: usize,
    message_len: u64,
}

impl BlockBuffer {
    pub(crate) fn new(message_len: u64) -> Self {
        Self {
            buffer: [0u8; MD_BLOCK_SIZE],
            buffer_len: 0,
            message_len,
        }
    }

    pub(crate) fn update<F>(&mut self, data: &[u8], mut compress: F)
    where
        F: FnMut(&[u8; MD_BLOCK_SIZE]),
    {
        self.message_len = self.message_len.wrapping_add(data.len() as u64);

        let mut remaining = data;
        if self.buffer_len > 0 {
            let to_copy = (MD_BLOCK_SIZE - self.buffer_len).min(remaining.len());
            self.buffer[self.buffer_len..self.buffer_len + to_copy]
                .copy_from_slice(&remaining[..to_copy]);
            self.buffer_len += to_copy;
            remaining = &remaining[to_copy..];
            if self.buffer_len < MD_BLOCK_SIZE {
                return;
            }
            compress(&self.buffer);
            self.buffer_len = 0;
        }

        let mut blocks = remaining.chunks_exact(MD_BLOCK_SIZE);
        for block in blocks.by_ref() {
            let mut chunk = [0u8; MD_BLOCK_SIZE];
            chunk.copy_from_slice(block);
            compress(&chunk);
        }

        let tail = blocks.remainder();
        self.buffer[..tail.len()].copy_from_slice(tail);
        self.buffer_len = tail.len();
    }

    /// Append the length padding, compressing the final block(s).
    pub(crate) fn finish<F>(mut self, compress: F)
    where
        F: FnMut(&[u8; MD_BLOCK_SIZE]),
    {
        let padding = md_padding(self.message_len);
        self.update(&padding, compress);
        debug_assert_eq!(self.buffer_len, 0);
    }
}
