use core::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::base58;

/// The (subnet, encryption scheme) pair a message belongs to.
///
/// Never serialized into a frame; peers compare [`ProtocolIdentity::id`]
/// during handshakes to decide whether they speak the same protocol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProtocolIdentity {
    subnet: String,
    encryption: String,
}

impl ProtocolIdentity {
    pub fn new(subnet: impl Into<String>, encryption: impl Into<String>) -> Self {
        Self { subnet: subnet.into(), encryption: encryption.into() }
    }

    pub fn subnet(&self) -> &str {
        &self.subnet
    }

    pub fn encryption(&self) -> &str {
        &self.encryption
    }

    /// Base58 of SHA-256 over `subnet || encryption`.
    pub fn id(&self) -> String {
        let digest = Sha256::new()
            .chain_update(self.subnet.as_bytes())
            .chain_update(self.encryption.as_bytes())
            .finalize();
        base58::encode_bytes(&digest)
    }
}

impl fmt::Display for ProtocolIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.subnet, self.encryption)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_stable_for_equal_labels() {
        let a = ProtocolIdentity::new("hi", "Plaintext");
        let b = ProtocolIdentity::new(String::from("hi"), String::from("Plaintext"));
        assert_eq!(a.id(), b.id());
        assert!(!a.id().is_empty());
    }

    #[test]
    fn id_hashes_the_joined_labels() {
        let digest = Sha256::digest(b"hiPlaintext");
        assert_eq!(ProtocolIdentity::new("hi", "Plaintext").id(), base58::encode_bytes(&digest));
    }

    #[test]
    fn id_changes_with_either_label() {
        let base = ProtocolIdentity::new("hi", "Plaintext").id();
        assert_ne!(base, ProtocolIdentity::new("ho", "Plaintext").id());
        assert_ne!(base, ProtocolIdentity::new("hi", "PKCS1_v1.5").id());
    }

    #[test]
    fn id_uses_only_base58_characters() {
        let id = ProtocolIdentity::new("mesh", "Plaintext").id();
        assert!(id.bytes().all(|byte| base58::ALPHABET.contains(&byte)));
        assert!(base58::decode_bytes(&id).is_ok());
    }
}
