// Attacks against the modes and MACs in this crate.
//
// Each module pairs an oracle (a party holding a secret that answers some
// restricted question) with an attack that needs nothing but the oracle.
pub mod cbc_bitflip;
pub mod cbc_iv_key;
pub mod ctr_bitflip;
pub mod ctr_edit;
pub mod padding_oracle;

pub(crate) const QUERY_PREFIX: &[u8] = b"comment1=cooking%20MCs;userdata=";
pub(crate) const QUERY_SUFFIX: &[u8] = b";comment2=%20like%20a%20pound%20of%20bacon";
const QUERY_METACHARACTERS: [u8; 2] = [b';', b'"'];

/// Wrap user data in the fixed query string, dropping the characters that
/// would let the user add fields of their own.
pub fn build_query(userdata: &[u8]) -> Vec<u8> {
    let sanitised: Vec<u8> = userdata
        .iter()
        .copied()
        .filter(|b| !QUERY_METACHARACTERS.contains(b))
        .collect();
    [QUERY_PREFIX, &sanitised, QUERY_SUFFIX].concat()
}

pub fn is_admin(query: &[u8]) -> bool {
    query.split(|&b| b == b';').any(|field| field == b"admin=true")
}
