// Recovering the key from CBC when the IV is the key.
//
// Submitting C_1 || 0 || C_1 decrypts to
//
//     P'_1 = D(C_1) ⊕ IV
//     P'_3 = D(C_1) ⊕ 0
//
// so P'_1 ⊕ P'_3 = IV = key. The oracle hands P' back when it complains about
// non-ASCII bytes.
use log::debug;

use crate::{attacks::build_query, block::BLOCK_SIZE, cbc, xor_bytes, Error, Result};

/// What the oracle says about a decrypted query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsciiCheck {
    Accepted,
    /// The plaintext had high-bit bytes; the error message echoes it.
    Rejected(Vec<u8>),
}

pub struct CbcIvEqKeyOracle {
    key: [u8; BLOCK_SIZE],
}

impl CbcIvEqKeyOracle {
    pub fn new(key: [u8; BLOCK_SIZE]) -> Self {
        Self { key }
    }

    pub fn encrypt(&self, userdata: &[u8]) -> Result<Vec<u8>> {
        cbc::encrypt(&build_query(userdata), &self.key, &self.key)
    }

    pub fn decrypt_and_check_ascii(&self, ciphertext: &[u8]) -> Result<AsciiCheck> {
        let plaintext = cbc::decrypt_unpadded(ciphertext, &self.key, &self.key)?;
        if plaintext.is_ascii() {
            return Ok(AsciiCheck::Accepted);
        }
        Ok(AsciiCheck::Rejected(plaintext))
    }
}

pub fn recover_key(oracle: &CbcIvEqKeyOracle) -> Result<[u8; BLOCK_SIZE]> {
    let ciphertext = oracle.encrypt(b"We all live on a yellow submarine, a yellow sub.")?;
    let first_block = &ciphertext[..BLOCK_SIZE];
    let modified = [first_block, &[0u8; BLOCK_SIZE], first_block].concat();

    match oracle.decrypt_and_check_ascii(&modified)? {
        AsciiCheck::Rejected(plaintext) => {
            let key = xor_bytes(
                &plaintext[..BLOCK_SIZE],
                &plaintext[2 * BLOCK_SIZE..3 * BLOCK_SIZE],
            );
            debug!("recovered key from rejected plaintext");
            key.try_into().map_err(|key: Vec<u8>| Error::InvalidKeyLength {
                expected: BLOCK_SIZE,
                actual: key.len(),
            })
        }
        AsciiCheck::Accepted => Err(Error::OracleAttack(
            "modified ciphertext decrypted to ASCII".to_string(),
        )),
    }
}
