pub mod balance;
pub mod metadata;

use primitive_types::U256;
use tracing::warn;

/// Composes the indexed identifier of a non-fungible token instance:
/// `<token>-<hex nonce>`. Fungible tokens (nonce 0) have no per-instance
/// identifier.
pub fn compute_token_identifier(token: &str, nonce: u64) -> String {
    if token.is_empty() || nonce == 0 {
        return String::new();
    }

    format!("{}-{}", token, encode_nonce_to_hex(nonce))
}

/// Hex form of the minimal big-endian representation of a nonce. Nonce 0
/// encodes as the empty string.
pub fn encode_nonce_to_hex(nonce: u64) -> String {
    if nonce == 0 {
        return String::new();
    }

    let bytes = nonce.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
    hex::encode(&bytes[first..])
}

/// Interprets a big-endian byte string as an unsigned value. Values wider
/// than 256 bits are saturated, they cannot occur in well-formed events.
pub fn big_uint_from_bytes(bytes: &[u8]) -> U256 {
    let significant: &[u8] = match bytes.iter().position(|b| *b != 0) {
        Some(first) => &bytes[first..],
        None => return U256::zero(),
    };

    if significant.len() > 32 {
        warn!(len = significant.len(), "value wider than 256 bits, saturating");
        return U256::MAX;
    }

    U256::from_big_endian(significant)
}

/// Big-endian nonce from an event topic, truncated to u64 the way every
/// consumer of a token nonce expects it.
pub fn nonce_from_bytes(bytes: &[u8]) -> u64 {
    big_uint_from_bytes(bytes).low_u64()
}

/// Decodes a "true"/"false" byte literal.
pub fn bytes_to_bool(bytes: &[u8]) -> bool {
    bytes == b"true"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_identifier_composition() {
        assert_eq!(compute_token_identifier("TKN-abcd", 1), "TKN-abcd-01");
        assert_eq!(compute_token_identifier("TKN-abcd", 256), "TKN-abcd-0100");
        assert_eq!(compute_token_identifier("TKN-abcd", 0), "");
        assert_eq!(compute_token_identifier("", 5), "");
    }

    #[test]
    fn nonce_hex_is_minimal_big_endian() {
        assert_eq!(encode_nonce_to_hex(0), "");
        assert_eq!(encode_nonce_to_hex(10), "0a");
        assert_eq!(encode_nonce_to_hex(1000), "03e8");
    }

    #[test]
    fn big_uint_handles_empty_and_wide_inputs() {
        assert_eq!(big_uint_from_bytes(&[]), U256::zero());
        assert_eq!(big_uint_from_bytes(&[0, 0, 1]), U256::from(1u64));
        assert_eq!(big_uint_from_bytes(&[1; 40]), U256::MAX);
    }
}
