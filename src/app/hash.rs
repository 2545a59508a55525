//! MD5 checksums for extract verification
//!
//! Geofabrik publishes a `<file>.md5` companion for every extract in the usual
//! `md5sum` format (`<hex digest>  <file name>`). This module parses those files and
//! hashes local files in a streaming fashion so that multi-hundred-megabyte extracts
//! never need to be held in memory.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tokio::io::AsyncReadExt;

use crate::constants::files;
use crate::errors::{DownloadError, DownloadResult};

/// MD5 digest stored as its raw 16 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Md5Hash([u8; 16]);

impl Md5Hash {
    /// Create an MD5 hash from a 32-character hex string (case insensitive)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use osm_power_fetcher::app::Md5Hash;
    ///
    /// let hash = Md5Hash::from_hex("50c9d1c465f3cbff652be1509c2e2a4e")?;
    /// let hash_upper = Md5Hash::from_hex("50C9D1C465F3CBFF652BE1509C2E2A4E")?;
    /// assert_eq!(hash, hash_upper);
    /// # Ok::<(), osm_power_fetcher::errors::DownloadError>(())
    /// ```
    pub fn from_hex(hex: &str) -> DownloadResult<Self> {
        let invalid = || DownloadError::InvalidChecksum {
            content: hex.to_string(),
        };

        if hex.len() != 32 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let mut bytes = [0u8; 16];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk).map_err(|_| invalid())?;
            bytes[i] = u8::from_str_radix(pair, 16).map_err(|_| invalid())?;
        }

        Ok(Md5Hash(bytes))
    }

    /// Lowercase 32-character hex representation
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Parse the content of an `md5sum`-style checksum file
    ///
    /// Only the first whitespace-separated token is used, so both bare digests and
    /// `<digest>  <file name>` lines are accepted.
    pub fn from_checksum_file(content: &str) -> DownloadResult<Self> {
        let token = content
            .split_whitespace()
            .next()
            .ok_or_else(|| DownloadError::InvalidChecksum {
                content: content.to_string(),
            })?;
        Self::from_hex(token)
    }

    /// Hash a file on disk without loading it into memory
    pub async fn of_file(path: &Path) -> DownloadResult<Self> {
        let mut file = tokio::fs::File::open(path).await?;
        let mut context = md5::Context::new();
        let mut buffer = vec![0u8; files::HASH_BUFFER_SIZE];

        loop {
            let read = file.read(&mut buffer).await?;
            if read == 0 {
                break;
            }
            context.consume(&buffer[..read]);
        }

        Ok(Md5Hash(context.compute().0))
    }
}

impl fmt::Display for Md5Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Md5Hash {
    type Err = DownloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_case_insensitive() {
        let lower = Md5Hash::from_hex("50c9d1c465f3cbff652be1509c2e2a4e").unwrap();
        let upper = Md5Hash::from_hex("50C9D1C465F3CBFF652BE1509C2E2A4E").unwrap();

        assert_eq!(lower, upper);
        assert_eq!(upper.to_hex(), "50c9d1c465f3cbff652be1509c2e2a4e");
    }

    #[test]
    fn test_invalid_hex_strings() {
        let invalid_cases = [
            "",
            "50c9d1c465f3cbff652be1509c2e2a4",
            "50c9d1c465f3cbff652be1509c2e2a4e5",
            "50c9d1c465f3cbff652be1509c2e2a4g",
            "50c9d1c4-65f3cbff652be1509c2e2a4e",
        ];

        for hex in &invalid_cases {
            assert!(Md5Hash::from_hex(hex).is_err(), "Should reject: {}", hex);
        }
    }

    #[test]
    fn test_checksum_file_formats() {
        let bare = Md5Hash::from_checksum_file("d41d8cd98f00b204e9800998ecf8427e\n").unwrap();
        let md5sum = Md5Hash::from_checksum_file(
            "d41d8cd98f00b204e9800998ecf8427e  colombia-latest.osm.pbf\n",
        )
        .unwrap();

        assert_eq!(bare, md5sum);
        assert!(Md5Hash::from_checksum_file("   \n").is_err());
        assert!(Md5Hash::from_checksum_file("<html>404</html>").is_err());
    }

    #[tokio::test]
    async fn test_of_file_matches_known_digests() {
        let temp_dir = TempDir::new().unwrap();
        let empty = temp_dir.path().join("empty.osm.pbf");
        let small = temp_dir.path().join("small.osm.pbf");
        tokio::fs::write(&empty, b"").await.unwrap();
        tokio::fs::write(&small, b"hello world").await.unwrap();

        assert_eq!(
            Md5Hash::of_file(&empty).await.unwrap().to_hex(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            Md5Hash::of_file(&small).await.unwrap().to_hex(),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
    }

    #[tokio::test]
    async fn test_of_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        let result = Md5Hash::of_file(&temp_dir.path().join("missing.pbf")).await;
        assert!(matches!(result, Err(DownloadError::Io(_))));
    }
}
