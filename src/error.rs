use std::ops::Range;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid pkcs7 padding")]
    InvalidPadding,

    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid block length: expected {expected} bytes, got {actual}")]
    InvalidBlockLength { expected: usize, actual: usize },

    #[error("invalid nonce length: expected {expected} bytes, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },

    #[error("no printable plaintext candidate found")]
    NoPlausibleCandidate,

    #[error("no key length in {key_lengths:?} produced an accepted forgery")]
    ForgeryFailed { key_lengths: Range<usize> },

    #[error("attack failed: {0}")]
    OracleAttack(String),
}

pub type Result<T> = std::result::Result<T, Error>;
