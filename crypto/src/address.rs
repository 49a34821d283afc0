//! Wallet address derivation from public keys.
//!
//! Address format: `plg_` + base32(public_key) + base32(checksum)
//!
//! The checksum is the first 5 bytes of Blake2b-256(public_key). The alphabet
//! `13456789abcdefghijkmnopqrstuwxyz` leaves out visually ambiguous characters.
//! 256 key bits need 52 characters, 40 checksum bits need 8, so an address is
//! always 4 + 52 + 8 = 64 characters long.

use pledge_types::{PublicKey, WalletAddress};

const ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";
const KEY_CHARS: usize = 52;
const CHECKSUM_CHARS: usize = 8;
const CHECKSUM_LEN: usize = 5;

fn checksum(key: &[u8; 32]) -> [u8; CHECKSUM_LEN] {
    let digest = crate::blake2b_256(key);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[..CHECKSUM_LEN]);
    out
}

fn symbol_value(c: u8) -> Option<u8> {
    ALPHABET.iter().position(|&a| a == c).map(|i| i as u8)
}

/// Base32-encode `bytes`, padding the final group with zero bits.
fn encode(bytes: &[u8], out: &mut String) {
    let mut acc: u32 = 0;
    let mut bits = 0u32;
    for &byte in bytes {
        acc = (acc << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(ALPHABET[((acc >> bits) & 0x1F) as usize] as char);
        }
        acc &= (1 << bits) - 1;
    }
    if bits > 0 {
        out.push(ALPHABET[((acc << (5 - bits)) & 0x1F) as usize] as char);
    }
}

/// Decode base32 text into exactly `N` bytes. Trailing pad bits are dropped.
fn decode<const N: usize>(text: &str) -> Option<[u8; N]> {
    let mut out = [0u8; N];
    let mut written = 0;
    let mut acc: u32 = 0;
    let mut bits = 0u32;
    for c in text.bytes() {
        acc = (acc << 5) | u32::from(symbol_value(c)?);
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            if written < N {
                out[written] = (acc >> bits) as u8;
                written += 1;
            }
        }
        acc &= (1 << bits) - 1;
    }
    (written == N).then_some(out)
}

/// Derive the `plg_`-prefixed wallet address of a public key.
pub fn derive_address(public_key: &PublicKey) -> WalletAddress {
    let mut address =
        String::with_capacity(WalletAddress::PREFIX.len() + KEY_CHARS + CHECKSUM_CHARS);
    address.push_str(WalletAddress::PREFIX);
    encode(public_key.as_bytes(), &mut address);
    encode(&checksum(public_key.as_bytes()), &mut address);
    WalletAddress::new(address)
}

/// Extract the public key bytes from a pledge address.
///
/// Returns `None` if the address is malformed or its checksum does not match.
pub fn decode_address(address: &str) -> Option<[u8; 32]> {
    let body = address.strip_prefix(WalletAddress::PREFIX)?;
    if body.len() != KEY_CHARS + CHECKSUM_CHARS {
        return None;
    }
    let (key_text, checksum_text) = body.split_at(KEY_CHARS);
    let key: [u8; 32] = decode(key_text)?;
    let sum: [u8; CHECKSUM_LEN] = decode(checksum_text)?;
    (sum == checksum(&key)).then_some(key)
}

/// Whether an address string is well-formed with a correct checksum.
pub fn validate_address(address: &str) -> bool {
    decode_address(address).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{generate_keypair, keypair_from_seed};

    #[test]
    fn derive_and_validate() {
        let kp = generate_keypair();
        let addr = derive_address(&kp.public);
        assert!(addr.as_str().starts_with("plg_"));
        assert_eq!(addr.as_str().len(), 64);
        assert!(validate_address(addr.as_str()));
    }

    #[test]
    fn derive_is_deterministic() {
        let kp = keypair_from_seed(&[7u8; 32]);
        assert_eq!(derive_address(&kp.public), derive_address(&kp.public));
    }

    #[test]
    fn decode_returns_the_key() {
        let kp = generate_keypair();
        let addr = derive_address(&kp.public);
        assert_eq!(decode_address(addr.as_str()), Some(kp.public.0));
    }

    #[test]
    fn foreign_prefix_rejected() {
        let kp = keypair_from_seed(&[3u8; 32]);
        let addr = derive_address(&kp.public);
        let foreign = addr.as_str().replacen("plg_", "brs_", 1);
        assert!(!validate_address(&foreign));
    }

    #[test]
    fn corrupted_checksum_rejected() {
        let kp = generate_keypair();
        let mut bad = derive_address(&kp.public).as_str().to_string();
        let last = bad.pop().unwrap();
        bad.push(if last == '1' { '3' } else { '1' });
        assert!(!validate_address(&bad));
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(!validate_address("plg_tooshort"));
        assert!(!validate_address("plg_"));
    }

    #[test]
    fn characters_outside_alphabet_rejected() {
        let kp = keypair_from_seed(&[9u8; 32]);
        let addr = derive_address(&kp.public);
        let bad = format!("plg_0{}", &addr.as_str()[5..]);
        assert!(!validate_address(&bad));
    }

    #[test]
    fn base32_encode_decode_roundtrip() {
        let data = [0xDE, 0xAD, 0xBE, 0xEF, 0x42];
        let mut text = String::new();
        encode(&data, &mut text);
        assert_eq!(text.len(), 8);
        assert_eq!(decode::<5>(&text), Some(data));
    }

    #[test]
    fn different_keys_different_addresses() {
        let k1 = keypair_from_seed(&[1u8; 32]);
        let k2 = keypair_from_seed(&[2u8; 32]);
        assert_ne!(derive_address(&k1.public), derive_address(&k2.public));
    }
}
