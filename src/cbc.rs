// Cipher block chaining mode.
//
// Encryption:  C_i = E(P_i ⊕ C_{i-1}),  C_0 = IV
// Decryption:  P_i = D(C_i) ⊕ C_{i-1}
//
// Because of the decryption formula, flipping a bit in C_i scrambles P_i and
// flips exactly the same bit in P_{i+1}. The attacks in `crate::attacks` rely
// on that.
use crate::{
    block::{Aes128Block, BlockCipher},
    bytes::{pkcs7_pad, pkcs7_unpad},
    xor_bytes, Error, Result,
};

pub fn encrypt(plaintext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    encrypt_with(&Aes128Block::new(key)?, plaintext, iv)
}

/// Decrypt and strip padding. Fails with [`Error::InvalidPadding`] if the
/// decrypted message is not correctly padded.
pub fn decrypt(ciphertext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    decrypt_with(&Aes128Block::new(key)?, ciphertext, iv)
}

/// Decrypt without inspecting or removing the padding.
pub fn decrypt_unpadded(ciphertext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    decrypt_unpadded_with(&Aes128Block::new(key)?, ciphertext, iv)
}

pub fn encrypt_with<C: BlockCipher>(cipher: &C, plaintext: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    check_iv_len(cipher, iv)?;
    let padded = pkcs7_pad(plaintext, cipher.block_size());
    let mut ciphertext = Vec::with_capacity(padded.len());

    let mut last_block = iv.to_vec();
    for plaintext_block in cipher.blocks(&padded) {
        let mut block = xor_bytes(plaintext_block, &last_block);
        cipher.encrypt_block(&mut block)?;
        ciphertext.extend_from_slice(&block);
        last_block = block;
    }
    Ok(ciphertext)
}

pub fn decrypt_with<C: BlockCipher>(cipher: &C, ciphertext: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    let message = decrypt_unpadded_with(cipher, ciphertext, iv)?;
    pkcs7_unpad(&message, cipher.block_size())
}

pub fn decrypt_unpadded_with<C: BlockCipher>(
    cipher: &C,
    ciphertext: &[u8],
    iv: &[u8],
) -> Result<Vec<u8>> {
    check_iv_len(cipher, iv)?;
    let mut message = Vec::with_capacity(ciphertext.len());

    let mut last_block = iv;
    for ciphertext_block in cipher.blocks(ciphertext) {
        let mut block = ciphertext_block.to_vec();
        cipher.decrypt_block(&mut block)?;
        message.extend(xor_bytes(&block, last_block));
        last_block = ciphertext_block;
    }
    Ok(message)
}

fn check_iv_len<C: BlockCipher>(cipher: &C, iv: &[u8]) -> Result<()> {
    if iv.len() != cipher.block_size() {
        return Err(Error::InvalidBlockLength {
            expected: cipher.block_size(),
            actual: iv.len(),
        });
    }
    Ok(())
}
