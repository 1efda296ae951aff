// Breaking "random access read/write" CTR.
//
// Every keystream block depends only on the key, nonce and its counter, so a
// CTR ciphertext can be rewritten at any offset. An oracle that exposes that
// edit to us leaks the keystream for any range we overwrite.
use crate::{
    block::KEY_SIZE,
    ctr::{self, NONCE_SIZE},
    keystream::reveal_plaintext,
    Result,
};

pub struct CtrEditOracle {
    key: [u8; KEY_SIZE],
    nonce: [u8; NONCE_SIZE],
    ciphertext: Vec<u8>,
}

impl CtrEditOracle {
    pub fn new(key: [u8; KEY_SIZE], nonce: [u8; NONCE_SIZE], plaintext: &[u8]) -> Result<Self> {
        Ok(Self {
            key,
            nonce,
            ciphertext: ctr::encrypt(plaintext, &key, &nonce)?,
        })
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// The ciphertext with its plaintext rewritten from `offset`.
    pub fn edit(&self, offset: usize, new_plaintext: &[u8]) -> Result<Vec<u8>> {
        ctr::edit(&self.ciphertext, &self.key, &self.nonce, offset, new_plaintext)
    }
}

pub fn recover_plaintext(oracle: &CtrEditOracle) -> Result<Vec<u8>> {
    reveal_plaintext(oracle.ciphertext(), |_, offset, new_plaintext| {
        oracle.edit(offset, new_plaintext)
    })
}
