//! Per-node content storage
//!
//! Raw bytes live outside the consensus log: one regular file per
//! replicated path under the node's data directory, keyed by the path's
//! final segment. Writes go to a randomized temp file and are renamed into
//! place, so a concurrent reader sees either the complete old bytes or the
//! complete new bytes, never a partial write.

use crate::common::{Error, Result};
use std::path::{Path, PathBuf};

pub struct ContentStore {
    data_dir: PathBuf,
}

impl ContentStore {
    /// Opens (and creates if needed) the node's data directory.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    /// Derives the local storage key: the path's final segment.
    ///
    /// Distinct full paths sharing a final segment collide onto the same
    /// local file. Known limitation, kept as-is.
    pub fn local_key(path: &str) -> &str {
        path.rsplit('/').next().unwrap_or(path)
    }

    fn blob_path(&self, path: &str) -> PathBuf {
        self.data_dir.join(Self::local_key(path))
    }

    /// Stores `data` for `path`, atomically replacing any prior content.
    pub async fn put(&self, path: &str, data: &[u8]) -> Result<()> {
        let target = self.blob_path(path);
        let tmp = self.data_dir.join(format!(
            ".{}.tmp-{:08x}",
            Self::local_key(path),
            rand::random::<u32>()
        ));

        tokio::fs::write(&tmp, data).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Reads the bytes stored for `path`.
    ///
    /// `ContentUnavailable` when this node holds no bytes for the path,
    /// which is a different condition from the path missing in metadata.
    pub async fn get(&self, path: &str) -> Result<Vec<u8>> {
        match tokio::fs::read(self.blob_path(path)).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::ContentUnavailable(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Whether bytes for `path` exist locally.
    pub async fn contains(&self, path: &str) -> bool {
        tokio::fs::try_exists(self.blob_path(path))
            .await
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_local_key_is_final_segment() {
        assert_eq!(ContentStore::local_key("docs/2024/report.pdf"), "report.pdf");
        assert_eq!(ContentStore::local_key("flat.txt"), "flat.txt");
        assert_eq!(ContentStore::local_key(""), "");
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = ContentStore::open(dir.path()).unwrap();

        store.put("a/b/file.bin", b"hello").await.unwrap();
        assert_eq!(store.get("a/b/file.bin").await.unwrap(), b"hello");

        // Same final segment resolves to the same local file.
        assert_eq!(store.get("file.bin").await.unwrap(), b"hello");
        assert!(dir.path().join("file.bin").exists());
    }

    #[tokio::test]
    async fn test_missing_content_is_distinct_error() {
        let dir = TempDir::new().unwrap();
        let store = ContentStore::open(dir.path()).unwrap();

        match store.get("ghost.txt").await {
            Err(Error::ContentUnavailable(p)) => assert_eq!(p, "ghost.txt"),
            other => panic!("expected ContentUnavailable, got {:?}", other),
        }
        assert!(!store.contains("ghost.txt").await);
    }

    #[tokio::test]
    async fn test_put_replaces_previous_content() {
        let dir = TempDir::new().unwrap();
        let store = ContentStore::open(dir.path()).unwrap();

        store.put("f", b"old").await.unwrap();
        store.put("f", b"replacement").await.unwrap();
        assert_eq!(store.get("f").await.unwrap(), b"replacement");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reader_never_sees_partial_write() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(ContentStore::open(dir.path()).unwrap());

        let old = vec![b'a'; 256 * 1024];
        let new = vec![b'b'; 256 * 1024];
        store.put("big", &old).await.unwrap();

        let writer = {
            let store = store.clone();
            let new = new.clone();
            tokio::spawn(async move {
                for _ in 0..20 {
                    store.put("big", &new).await.unwrap();
                }
            })
        };

        for _ in 0..200 {
            let data = store.get("big").await.unwrap();
            assert_eq!(data.len(), 256 * 1024);
            let first = data[0];
            assert!(first == b'a' || first == b'b');
            assert!(data.iter().all(|&b| b == first), "partial write observed");
        }
        writer.await.unwrap();
    }
}
