// CTR bit-flipping.
//
// A CTR ciphertext is C = K ⊕ M. Given C for a message M we chose, the
// ciphertext C ⊕ M ⊕ F decrypts to F. Unlike CBC no block is sacrificed.
use log::debug;

use crate::{
    attacks::{build_query, is_admin},
    block::{Aes128Block, KEY_SIZE},
    ctr::{self, COUNTER_SIZE, NONCE_SIZE},
    Error, Result,
};

const FORGERY: &[u8] = b";admin=true";

pub struct CtrQueryOracle {
    cipher: Aes128Block,
    nonce: [u8; NONCE_SIZE],
    initial_counter: [u8; COUNTER_SIZE],
}

impl CtrQueryOracle {
    pub fn new(
        key: [u8; KEY_SIZE],
        nonce: [u8; NONCE_SIZE],
        initial_counter: [u8; COUNTER_SIZE],
    ) -> Result<Self> {
        Ok(Self {
            cipher: Aes128Block::new(&key)?,
            nonce,
            initial_counter,
        })
    }

    pub fn encrypt(&self, userdata: &[u8]) -> Result<Vec<u8>> {
        self.apply(&build_query(userdata))
    }

    pub fn decrypt_and_check_admin(&self, ciphertext: &[u8]) -> Result<bool> {
        Ok(is_admin(&self.apply(ciphertext)?))
    }

    fn apply(&self, input: &[u8]) -> Result<Vec<u8>> {
        ctr::apply_with_counter(&self.cipher, input, &self.nonce, self.initial_counter)
    }
}

pub fn forge_admin_ciphertext(oracle: &CtrQueryOracle) -> Result<Vec<u8>> {
    // The first byte that differs between two one-byte queries is where the
    // user data starts.
    let c_0 = oracle.encrypt(b"0")?;
    let c_1 = oracle.encrypt(b"1")?;
    let prefix_len = c_0
        .iter()
        .zip(&c_1)
        .position(|(a, b)| a != b)
        .ok_or_else(|| Error::OracleAttack("user data does not reach the ciphertext".into()))?;
    debug!("query prefix is {prefix_len} bytes");

    let message = vec![b'A'; FORGERY.len()];
    let mut ciphertext = oracle.encrypt(&message)?;
    ciphertext[prefix_len..prefix_len + message.len()]
        .iter_mut()
        .zip(message.iter().zip(FORGERY))
        .for_each(|(c, (m, f))| *c ^= m ^ f);
    Ok(ciphertext)
}
