// Adapter over a single-block cipher primitive.
//
// The modes in this crate never touch cipher internals; they only see a
// fixed-size block transform and its inverse. AES-128 comes from the `aes`
// crate.
use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes128;

use crate::{bytes::split_blocks, Error, Result};

pub const BLOCK_SIZE: usize = 16;
pub const KEY_SIZE: usize = 16;

pub trait BlockCipher {
    fn block_size(&self) -> usize;

    /// Encrypt exactly one block in place.
    fn encrypt_block(&self, block: &mut [u8]) -> Result<()>;

    /// Decrypt exactly one block in place.
    fn decrypt_block(&self, block: &mut [u8]) -> Result<()>;

    fn blocks<'a>(&self, buf: &'a [u8]) -> Vec<&'a [u8]> {
        split_blocks(buf, self.block_size())
    }

    fn check_block_len(&self, block: &[u8]) -> Result<()> {
        if block.len() != self.block_size() {
            return Err(Error::InvalidBlockLength {
                expected: self.block_size(),
                actual: block.len(),
            });
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct Aes128Block {
    cipher: Aes128,
}

impl Aes128Block {
    pub fn new(key: &[u8]) -> Result<Self> {
        let cipher = Aes128::new_from_slice(key).map_err(|_| Error::InvalidKeyLength {
            expected: KEY_SIZE,
            actual: key.len(),
        })?;
        Ok(Self { cipher })
    }
}

impl BlockCipher for Aes128Block {
    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    fn encrypt_block(&self, block: &mut [u8]) -> Result<()> {
        self.check_block_len(block)?;
        self.cipher.encrypt_block(GenericArray::from_mut_slice(block));
        Ok(())
    }

    fn decrypt_block(&self, block: &mut [u8]) -> Result<()> {
        self.check_block_len(block)?;
        self.cipher.decrypt_block(GenericArray::from_mut_slice(block));
        Ok(())
    }
}

/// Encrypt a single block under `key`.
pub fn block_encrypt(block: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    let mut out = block.to_vec();
    Aes128Block::new(key)?.encrypt_block(&mut out)?;
    Ok(out)
}

/// Decrypt a single block under `key`.
pub fn block_decrypt(block: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    let mut out = block.to_vec();
    Aes128Block::new(key)?.decrypt_block(&mut out)?;
    Ok(out)
}
