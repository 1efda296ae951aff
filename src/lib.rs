pub mod attacks;
pub mod block;
pub mod bytes;
pub mod cbc;
pub mod ctr;
mod error;
pub mod hash;
pub mod hmac;
pub mod keystream;
pub mod mac;
pub mod score;
mod sha1;
mod sha256;
pub mod xor;

pub use block::{block_decrypt, block_encrypt, Aes128Block, BlockCipher};
pub use bytes::{
    pkcs7_pad, pkcs7_unpad, random_bytes, random_bytes_with_seed, random_vec, repeating_xor,
    xor_bytes,
};
pub use error::{Error, Result};
pub use hash::{md_pad, md_padding, Hasher, ResumableHasher};
pub use hmac::{Hmac, HmacSha1, HmacSha256};
pub use keystream::KeystreamRecovery;
pub use mac::{Forgery, SecretPrefixMac, Sha1PrefixMac};
pub use score::{score_chi_squared, score_heuristic, ChiSquared, HeuristicScore};
pub use sha1::{Sha1, SHA1_LEN};
pub use sha256::{Sha256, SHA256_LEN};
pub use xor::{RepeatingXorCrack, XorCrackResult};
