//! Waves address derivation
//!
//! address = base58(version || network byte || hash[..20] || checksum)
//! where hash = keccak256(blake2b256(public key)) and the checksum is the
//! first four bytes of the same secure hash over the preceding 22 bytes.

use crate::error::{KeeperError, KeeperResult};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use sha3::Keccak256;

type Blake2b256 = Blake2b<U32>;

/// Address format version
const ADDRESS_VERSION: u8 = 1;

/// Length of a raw ed25519/curve25519 public key
pub const PUBLIC_KEY_LENGTH: usize = 32;

const HASH_LENGTH: usize = 20;
const CHECKSUM_LENGTH: usize = 4;

/// Total length of a decoded address
pub const ADDRESS_LENGTH: usize = 2 + HASH_LENGTH + CHECKSUM_LENGTH;

fn secure_hash(bytes: &[u8]) -> [u8; 32] {
    let blake = Blake2b256::digest(bytes);
    Keccak256::digest(blake).into()
}

/// Derive the base58 address of a base58 public key on a network
pub fn address_from_public_key(public_key: &str, network_byte: u8) -> KeeperResult<String> {
    let key = bs58::decode(public_key)
        .into_vec()
        .map_err(|e| KeeperError::InvalidPublicKey {
            public_key: public_key.to_string(),
            reason: e.to_string(),
        })?;

    if key.len() != PUBLIC_KEY_LENGTH {
        return Err(KeeperError::InvalidPublicKey {
            public_key: public_key.to_string(),
            reason: format!("expected {} bytes, got {}", PUBLIC_KEY_LENGTH, key.len()),
        });
    }

    let mut raw = Vec::with_capacity(ADDRESS_LENGTH);
    raw.push(ADDRESS_VERSION);
    raw.push(network_byte);
    raw.extend_from_slice(&secure_hash(&key)[..HASH_LENGTH]);

    let checksum = secure_hash(&raw);
    raw.extend_from_slice(&checksum[..CHECKSUM_LENGTH]);

    Ok(bs58::encode(raw).into_string())
}

/// Check an address' version, network byte and checksum
pub fn is_valid_address(address: &str, network_byte: u8) -> bool {
    let Ok(raw) = bs58::decode(address).into_vec() else {
        return false;
    };
    if raw.len() != ADDRESS_LENGTH || raw[0] != ADDRESS_VERSION || raw[1] != network_byte {
        return false;
    }
    let (body, checksum) = raw.split_at(ADDRESS_LENGTH - CHECKSUM_LENGTH);
    secure_hash(body)[..CHECKSUM_LENGTH] == *checksum
}
