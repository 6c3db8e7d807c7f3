use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const CHUNK_SIZE: usize = 64 * 1024;

/// Hex-encoded, lower-case SHA-256 of everything `reader` yields.
///
/// Reads in fixed-size chunks so large binaries are never held in memory.
pub fn sha256_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn sha256_file(path: &Path) -> io::Result<String> {
    sha256_reader(File::open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digests() {
        let dir = tempfile::tempdir().unwrap();
        let cases = [
            ("foo", "2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae"),
            ("bar", "fcde2b2edba56bf408601fb721fe9b5c338d10ee429ea04fae5511b68fbf8fb9"),
            ("", "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"),
        ];

        for (content, expected) in cases {
            let path = dir.path().join(format!("{content}.txt"));
            std::fs::write(&path, content).unwrap();
            assert_eq!(sha256_file(&path).unwrap(), expected, "digest of {content:?}");
        }
    }

    #[test]
    fn test_multi_chunk_matches_one_shot_digest() {
        let data: Vec<u8> = (0..(CHUNK_SIZE * 3 + 17)).map(|i| (i % 251) as u8).collect();
        let expected = hex::encode(Sha256::digest(&data));

        assert_eq!(sha256_reader(data.as_slice()).unwrap(), expected);
        // same content, same digest
        assert_eq!(sha256_reader(data.as_slice()).unwrap(), expected);
    }

    #[test]
    fn test_single_byte_difference_changes_digest() {
        let data = vec![7u8; CHUNK_SIZE + 1];
        let mut tampered = data.clone();
        *tampered.last_mut().unwrap() ^= 1;

        assert_ne!(
            sha256_reader(data.as_slice()).unwrap(),
            sha256_reader(tampered.as_slice()).unwrap()
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(sha256_file(&dir.path().join("__non-existent__")).is_err());
    }
}
