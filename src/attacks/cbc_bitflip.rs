// CBC bit-flipping.
//
// Decryption computes P_i = D(C_i) ⊕ C_{i-1}, so XOR-ing a mask into C_{i-1}
// XORs the same mask into P_i. Block i-1 decrypts to garbage, block i decrypts
// to whatever we like.
use log::debug;

use crate::{
    attacks::{build_query, is_admin, QUERY_PREFIX},
    block::BLOCK_SIZE,
    cbc, xor_bytes, Result,
};

const FORGERY: &[u8; BLOCK_SIZE] = b";admin=true;mail";

pub struct CbcQueryOracle {
    key: [u8; BLOCK_SIZE],
    iv: [u8; BLOCK_SIZE],
}

impl CbcQueryOracle {
    pub fn new(key: [u8; BLOCK_SIZE], iv: [u8; BLOCK_SIZE]) -> Self {
        Self { key, iv }
    }

    pub fn encrypt(&self, userdata: &[u8]) -> Result<Vec<u8>> {
        cbc::encrypt(&build_query(userdata), &self.key, &self.iv)
    }

    pub fn decrypt_and_check_admin(&self, ciphertext: &[u8]) -> Result<bool> {
        let plaintext = cbc::decrypt(ciphertext, &self.key, &self.iv)?;
        Ok(is_admin(&plaintext))
    }
}

pub fn forge_admin_ciphertext(oracle: &CbcQueryOracle) -> Result<Vec<u8>> {
    // Line the user data up with a block boundary, then give it two blocks:
    //    <fill> GGGGGGGGGGGGGGGG FFFFFFFFFFFFFFFF
    // The G block is sacrificed to turn the F block into the forgery.
    let fill_len = (BLOCK_SIZE - QUERY_PREFIX.len() % BLOCK_SIZE) % BLOCK_SIZE;
    let flip_offset = QUERY_PREFIX.len() + fill_len;
    let forgery_block = [b'F'; BLOCK_SIZE];
    let userdata = [
        vec![b'X'; fill_len],
        vec![b'G'; BLOCK_SIZE],
        forgery_block.to_vec(),
    ]
    .concat();
    let mut ciphertext = oracle.encrypt(&userdata)?;

    // C_G := C_G ⊕ F ⊕ forgery, so P_F = F ⊕ F ⊕ forgery.
    let mask = xor_bytes(&forgery_block, FORGERY);
    ciphertext[flip_offset..flip_offset + BLOCK_SIZE]
        .iter_mut()
        .zip(mask)
        .for_each(|(c, m)| *c ^= m);
    debug!("flipped ciphertext block at offset {flip_offset}");
    Ok(ciphertext)
}
