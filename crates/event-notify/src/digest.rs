use sha1::Sha1;
use sha2::{Digest, Sha256};

/// SHA-1 of `bytes`.
///
/// Only used for message signatures, where the platform fixes the digest.
pub(crate) fn sha1_bytes(bytes: &[u8]) -> Vec<u8> {
    // sha1 and sha2 sit on different `digest` majors; keep the call qualified.
    <Sha1 as sha1::Digest>::digest(bytes).to_vec()
}

/// Lowercase hex SHA-256 over the concatenation of `parts`.
pub(crate) fn sha256_hex_parts(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_known_vector() {
        assert_eq!(
            hex::encode(sha1_bytes(b"abc")),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn sha256_parts_match_concatenation() {
        let joined = sha256_hex_parts(&[b"abc"]);
        assert_eq!(
            joined,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(sha256_hex_parts(&[b"a", b"", b"bc"]), joined);
    }
}
