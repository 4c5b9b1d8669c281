use sha2::{Digest, Sha256};

/// Stable identity of a piece of normalized content.
///
/// The hash is the sole signal used to decide whether content changed:
/// byte-for-byte identity of the text, not semantic similarity. The length
/// feeds the change-percentage computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    /// SHA-256 of the UTF-8 text, lowercase hex (64 chars).
    pub hash: String,
    /// Character count of the normalized text.
    pub length: usize,
}

/// Fingerprint a piece of canonical text.
pub fn fingerprint(text: &str) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();

    Fingerprint {
        hash: hex::encode(digest),
        length: text.chars().count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = fingerprint("The quick brown fox");
        let b = fingerprint("The quick brown fox");
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_is_64_hex_chars() {
        let fp = fingerprint("hello");
        assert_eq!(fp.hash.len(), 64);
        assert!(fp.hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_different_text_different_hash() {
        assert_ne!(fingerprint("one").hash, fingerprint("two").hash);
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        let fp = fingerprint("héllo");
        assert_eq!(fp.length, 5);
    }

    #[test]
    fn test_empty_text() {
        let fp = fingerprint("");
        assert_eq!(fp.length, 0);
        // SHA-256 of the empty string
        assert_eq!(
            fp.hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
