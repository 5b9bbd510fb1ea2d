//! Signed approvals
//!
//! A permit is an allowance granted by an owner's signature instead of an
//! owner-submitted call. The signed message is a structured-data digest:
//!
//! ```text
//! digest = keccak256(0x19 0x01 ‖ domain_separator ‖ keccak256(
//!     PERMIT_TYPEHASH ‖ owner ‖ spender ‖ value ‖ nonce ‖ deadline))
//! ```
//!
//! with every field left-padded to a 32-byte word. The domain separator binds
//! the token name, version, chain id and ledger address, so a signature is only
//! valid for one ledger on one chain.
//!
//! Signatures are Ed25519. A signature carries the signer's verifying key, and
//! the signer's address is the last 20 bytes of `keccak256(verifying_key)`.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use exchange_types::{Address, DOMAIN_TYPE, PERMIT_TYPE, STRUCTURED_DATA_PREFIX};
use sha3::{Digest, Keccak256};

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Big-endian 32-byte word holding an unsigned integer
fn word(value: u128) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[16..].copy_from_slice(&value.to_be_bytes());
    out
}

pub fn domain_typehash() -> [u8; 32] {
    keccak256(DOMAIN_TYPE.as_bytes())
}

pub fn permit_typehash() -> [u8; 32] {
    keccak256(PERMIT_TYPE.as_bytes())
}

/// Domain separator for the ledger at `verifying_contract`
pub fn domain_separator(
    name: &str,
    version: &str,
    chain_id: u64,
    verifying_contract: Address,
) -> [u8; 32] {
    let mut encoded = Vec::with_capacity(5 * 32);
    encoded.extend_from_slice(&domain_typehash());
    encoded.extend_from_slice(&keccak256(name.as_bytes()));
    encoded.extend_from_slice(&keccak256(version.as_bytes()));
    encoded.extend_from_slice(&word(chain_id as u128));
    encoded.extend_from_slice(&verifying_contract.to_word());
    keccak256(&encoded)
}

/// Digest the owner signs to approve `spender` for `value`
pub fn permit_digest(
    domain_separator: &[u8; 32],
    owner: Address,
    spender: Address,
    value: u128,
    nonce: u64,
    deadline: u64,
) -> [u8; 32] {
    let mut encoded = Vec::with_capacity(6 * 32);
    encoded.extend_from_slice(&permit_typehash());
    encoded.extend_from_slice(&owner.to_word());
    encoded.extend_from_slice(&spender.to_word());
    encoded.extend_from_slice(&word(value));
    encoded.extend_from_slice(&word(nonce as u128));
    encoded.extend_from_slice(&word(deadline as u128));
    let struct_hash = keccak256(&encoded);

    let mut message = Vec::with_capacity(2 + 32 + 32);
    message.extend_from_slice(&STRUCTURED_DATA_PREFIX);
    message.extend_from_slice(domain_separator);
    message.extend_from_slice(&struct_hash);
    keccak256(&message)
}

/// Address controlled by an Ed25519 key
pub fn signer_address(key: &VerifyingKey) -> Address {
    Address::from_hash(&keccak256(key.as_bytes()))
}

/// Ed25519 signature together with the key that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermitSignature {
    pub public_key: [u8; 32],
    pub signature: [u8; 64],
}

impl PermitSignature {
    pub fn sign(key: &SigningKey, digest: &[u8; 32]) -> Self {
        Self {
            public_key: key.verifying_key().to_bytes(),
            signature: key.sign(digest).to_bytes(),
        }
    }

    /// Address of the signer, or `None` if the signature does not verify
    /// against `digest`
    ///
    /// Small-order keys are refused: a signature under one verifies for any
    /// message.
    pub fn recover(&self, digest: &[u8; 32]) -> Option<Address> {
        let key = VerifyingKey::from_bytes(&self.public_key).ok()?;
        if key.is_weak() {
            return None;
        }
        let signature = Signature::from_bytes(&self.signature);
        key.verify_strict(digest, &signature).ok()?;
        Some(signer_address(&key))
    }
}

/// Sign a permit offline for the owner controlled by `key`
pub fn sign_permit(
    key: &SigningKey,
    domain_separator: &[u8; 32],
    spender: Address,
    value: u128,
    nonce: u64,
    deadline: u64,
) -> PermitSignature {
    let owner = signer_address(&key.verifying_key());
    let digest = permit_digest(domain_separator, owner, spender, value, nonce, deadline);
    PermitSignature::sign(key, &digest)
}
