use crate::hash::{BlockBuffer, Hasher, ResumableHasher, MD_BLOCK_SIZE};

const INITIALISATION_CONSTANTS: [u32; 5] =
    [0x67452301, 0xEFCDAB89, 0x98BADCFE, 0x10325476, 0xC3D2E1F0];
pub const SHA1_LEN: usize = 20;

#[derive(Debug, Clone)]
pub struct Sha1 {
    buffer: BlockBuffer,
    state: [u32; 5],
}

impl Sha1 {
    pub fn new_with_initialisation_constants(
        initialisation_constants: [u32; 5],
        message_len: u64,
    ) -> Self {
        Self {
            buffer: BlockBuffer::new(message_len),
            state: initialisation_constants,
        }
    }
}

impl Default for Sha1 {
    fn default() -> Self {
        Self::new_with_initialisation_constants(INITIALISATION_CONSTANTS, 0)
    }
}

impl Hasher<SHA1_LEN> for Sha1 {
    fn update(&mut self, data: &[u8]) {
        let state = &mut self.state;
        self.buffer.update(data, |block| compress(state, block));
    }

    fn digest(mut self) -> [u8; SHA1_LEN] {
        let state = &mut self.state;
        self.buffer.finish(|block| compress(state, block));

        let mut digest = [0u8; SHA1_LEN];
        for (out, word) in digest.chunks_exact_mut(4).zip(self.state) {
            out.copy_from_slice(&word.to_be_bytes());
        }
        digest
    }
}

impl ResumableHasher<SHA1_LEN> for Sha1 {
    fn from_digest(digest: &[u8; SHA1_LEN], processed_len: u64) -> Self {
        let mut state = [0u32; 5];
        for (word, bytes) in state.iter_mut().zip(digest.chunks_exact(4)) {
            *word = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }
        Self::new_with_initialisation_constants(state, processed_len)
    }
}

fn compress(state: &mut [u32; 5], chunk: &[u8; MD_BLOCK_SIZE]) {
    let mut w = [0u32; 80];
    for (i, bytes) in chunk.chunks_exact(4).enumerate() {
        w[i] = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
    for i in 16..80 {
        w[i] = (w[i - 3] ^ w[i - 8] ^ w[i - 14] ^ w[i - 16]).rotate_left(1);
    }

    let [mut a, mut b, mut c, mut d, mut e] = *state;
    for (i, &word) in w.iter().enumerate() {
        let (f, k) = match i {
            0..=19 => ((b & c) | ((!b) & d), 0x5A827999),
            20..=39 => (b ^ c ^ d, 0x6ED9EBA1),
            40..=59 => ((b & c) | (b & d) | (c & d), 0x8F1BBCDC),
            _ => (b ^ c ^ d, 0xCA62C1D6),
        };

        let temp = a
            .rotate_left(5)
            .wrapping_add(f)
            .wrapping_add(e)
            .wrapping_add(k)
            .wrapping_add(word);
        e = d;
        d = c;
        c = b.rotate_left(30);
        b = a;
        a = temp;
    }

    for (s, v) in state.iter_mut().zip([a, b, c, d, e]) {
        *s = s.wrapping_add(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use hex_literal::hex;
    use rstest::rstest;

    #[rstest]
    #[case(b"", hex!("da39a3ee5e6b4b0d3255bfef95601890afd80709"))]
    #[case(b"abc", hex!("a9993e364706816aba3e25717850c26c9cd0d89d"))]
    #[case(
        b"cookin MCs like a pound of bacon",
        hex!("be120668f532ec01b9ca4d924999832281f79354")
    )]
    #[case(
        b"shall I compare thee to a summer's day",
        hex!("1b0d1a96f5f7daba86d38a54e9dd02ccc1e57916")
    )]
    fn digest_returns_expected_hash(#[case] input: &[u8], #[case] expected: [u8; 20]) {
        assert_eq!(Sha1::digest_message(input), expected);
    }

    #[test]
    fn digest_of_long_message_fed_in_pieces() {
        let mut hasher = Sha1::default();
        for piece in [b"a".repeat(1), b"a".repeat(63), b"a".repeat(500), b"a".repeat(436)] {
            hasher.update(&piece);
        }

        assert_eq!(hasher.digest(), hex!("291e9a6c66994949b57ba5e650361e98fc36b1ba"));
    }

    #[test]
    fn from_digest_resumes_hashing() {
        let message = b"We all live in a yellow submarine, a yellow submarine, yellow!!!";
        assert_eq!(message.len(), 64);
        let mut first_block_hasher = Sha1::default();
        first_block_hasher.update(message);
        let state_after_block: [u8; 20] = first_block_hasher.state_bytes();

        let resumed = Sha1::from_digest(&state_after_block, 64).update_and_digest(b"tail");

        assert_eq!(resumed, Sha1::digest_message(&[message.as_slice(), b"tail"].concat()));
    }

    impl Sha1 {
        fn state_bytes(&self) -> [u8; 20] {
            let mut out = [0u8; 20];
            for (o, w) in out.chunks_exact_mut(4).zip(self.state) {
                o.copy_from_slice(&w.to_be_bytes());
            }
            out
        }
    }
}
