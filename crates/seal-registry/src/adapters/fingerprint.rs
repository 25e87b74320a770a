//! SHA-256 public-key fingerprints.

use sha2::{Digest, Sha256};

use crate::domain::value_objects::{Fingerprint, PublicKey};
use crate::ports::outbound::KeyFingerprinter;

/// Fingerprints a key as SHA-256 over its serialized bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Fingerprinter;

impl KeyFingerprinter for Sha256Fingerprinter {
    fn fingerprint(&self, public_key: &PublicKey) -> Fingerprint {
        Fingerprint(Sha256::digest(public_key.as_bytes()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_of_empty_key() {
        let fp = Sha256Fingerprinter.fingerprint(&PublicKey::new(Vec::new()));
        assert_eq!(
            fp.to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_distinct_keys_distinct_fingerprints() {
        let a = Sha256Fingerprinter.fingerprint(&PublicKey::new(vec![0x02; 33]));
        let b = Sha256Fingerprinter.fingerprint(&PublicKey::new(vec![0x03; 33]));
        assert_ne!(a, b);
    }
}
