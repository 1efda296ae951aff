// Byte-buffer primitives shared by the modes and the attacks.
use rand::{Rng, SeedableRng};

use crate::{Error, Result};

/// XOR two buffers together.
///
/// The output is as long as the shorter of the two inputs.
pub fn xor_bytes(buf_a: &[u8], buf_b: &[u8]) -> Vec<u8> {
    buf_a.iter().zip(buf_b.iter()).map(|(a, b)| a ^ b).collect()
}

/// XOR a buffer with a key that wraps around when it runs out.
///
/// An empty key yields an empty output.
pub fn repeating_xor(message: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() {
        return Vec::new();
    }
    message
        .iter()
        .zip(key.iter().cycle())
        .map(|(m, k)| m ^ k)
        .collect()
}

/// Split a buffer into `size`-byte blocks. The final block is short if the
/// buffer is not a multiple of `size`.
pub fn split_blocks(buf: &[u8], size: usize) -> Vec<&[u8]> {
    buf.chunks(size).collect()
}

/// Apply PKCS#7 padding.
///
/// A full block of padding is added when the input is already a multiple of
/// the block size.
pub fn pkcs7_pad(bytes: &[u8], block_size: usize) -> Vec<u8> {
    debug_assert!((1..=255).contains(&block_size));
    let n_pad = block_size - (bytes.len() % block_size);
    let mut out = Vec::with_capacity(bytes.len() + n_pad);
    out.extend_from_slice(bytes);
    out.resize(bytes.len() + n_pad, n_pad as u8);
    out
}

/// Strip PKCS#7 padding, returning the unpadded message.
pub fn pkcs7_unpad(bytes: &[u8], block_size: usize) -> Result<Vec<u8>> {
    let n_pad = pkcs7_padding_len(bytes, block_size).ok_or(Error::InvalidPadding)?;
    Ok(bytes[..bytes.len() - n_pad].to_vec())
}

fn pkcs7_padding_len(bytes: &[u8], block_size: usize) -> Option<usize> {
    let n_pad = *bytes.last()? as usize;
    if n_pad == 0 || n_pad > block_size || n_pad > bytes.len() {
        return None;
    }
    let padding = &bytes[(bytes.len() - n_pad)..];
    if padding.iter().all(|&b| b as usize == n_pad) {
        return Some(n_pad);
    }
    None
}

pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut out = [0u8; N];
    rand::thread_rng().fill(&mut out[..]);
    out
}

/// Deterministic random bytes; used to make attack scenarios reproducible.
pub fn random_bytes_with_seed<const N: usize>(seed: u64) -> [u8; N] {
    let mut out = [0u8; N];
    rand::rngs::StdRng::seed_from_u64(seed).fill(&mut out[..]);
    out
}

pub fn random_vec(len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    rand::thread_rng().fill(out.as_mut_slice());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use hex_literal::hex;
    use rstest::rstest;

    #[test]
    fn xor_bytes_xors_equal_length_buffers() {
        let a = hex!("1c0111001f010100061a024b53535009181c");
        let b = hex!("686974207468652062756c6c277320657965");

        let xored = xor_bytes(&a, &b);

        assert_eq!(xored, hex!("746865206b696420646f6e277420706c6179"));
    }

    #[test]
    fn xor_bytes_truncates_to_shorter_buffer() {
        assert_eq!(xor_bytes(&[0xff, 0x0f, 0xaa], &[0x0f]), vec![0xf0]);
        assert!(xor_bytes(&[], &[1, 2, 3]).is_empty());
    }

    #[test]
    fn repeating_xor_wraps_key() {
        let message = "Burning 'em, if you ain't quick and nimble\nI go crazy when I hear a cymbal";

        let ciphertext = repeating_xor(message.as_bytes(), b"ICE");

        let expected = hex!(
            "0b3637272a2b2e63622c2e69692a23693a2a3c6324202d623d63343c2a2622632427276527"
            "2a282b2f20430a652e2c652a3124333a653e2b2027630c692b20283165286326302e27282f"
        );
        assert_eq!(ciphertext, expected);
    }

    #[test]
    fn repeating_xor_with_empty_key_is_empty() {
        assert!(repeating_xor(b"abc", b"").is_empty());
    }

    #[test]
    fn split_blocks_leaves_short_final_block() {
        let buf = [0u8; 37];

        let blocks = split_blocks(&buf, 16);

        assert_eq!(
            blocks.iter().map(|b| b.len()).collect::<Vec<_>>(),
            vec![16, 16, 5]
        );
    }

    #[rstest]
    #[case("YELL", 4, "YELL\x04\x04\x04\x04")]
    #[case("YELLOWS!!!", 6, "YELLOWS!!!\x02\x02")]
    #[case("YELLOW SUBMARINE", 20, "YELLOW SUBMARINE\x04\x04\x04\x04")]
    #[case("", 3, "\x03\x03\x03")]
    fn pkcs7_pad_pads_message(
        #[case] msg: &str,
        #[case] block_size: usize,
        #[case] expected: &str,
    ) {
        let padded = pkcs7_pad(msg.as_bytes(), block_size);

        assert_eq!(padded, expected.as_bytes());
    }

    #[test]
    fn pkcs7_unpad_unpads_message() {
        let unpadded = pkcs7_unpad(b"ICE ICE BABY\x04\x04\x04\x04", 16);

        assert_eq!(unpadded.unwrap(), b"ICE ICE BABY");
    }

    #[test]
    fn pad_then_unpad_is_identity_for_all_lengths() {
        for len in 0..=48 {
            let message = vec![b'x'; len];

            let padded = pkcs7_pad(&message, 16);

            assert_eq!(padded.len() % 16, 0);
            assert!(padded.len() > message.len());
            assert_eq!(pkcs7_unpad(&padded, 16).unwrap(), message);
        }
    }

    #[rstest]
    #[case(b"ICE ICE BABY\x05\x05\x05\x05")]
    #[case(b"ICE ICE BABY\x01\x02\x03\x04")]
    #[case(b"ICE ICE BABY\x00")]
    #[case(b"ICE ICE BABY\x11")]
    #[case(b"\x11\x11\x11\x11\x11\x11\x11\x11\x11\x11\x11\x11\x11\x11\x11\x11\x11")]
    #[case(b"")]
    fn pkcs7_unpad_returns_err_given_invalid_padding(#[case] padded: &[u8]) {
        let unpadded = pkcs7_unpad(padded, 16);

        assert_eq!(unpadded, Err(Error::InvalidPadding));
    }

    #[test]
    fn random_bytes_with_seed_is_deterministic() {
        assert_eq!(
            random_bytes_with_seed::<16>(101),
            random_bytes_with_seed::<16>(101)
        );
        assert_ne!(
            random_bytes_with_seed::<16>(101),
            random_bytes_with_seed::<16>(102)
        );
    }
}
