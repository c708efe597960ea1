use crate::core::Storage;
use crate::utils::error::Result;
use std::path::Path;

/// Report storage rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("nested");
        let storage = LocalStorage::new(base.to_string_lossy().into_owned());

        tokio_test::block_on(async {
            storage.write_file("report.txt", b"hello").await.unwrap();
            assert_eq!(storage.read_file("report.txt").await.unwrap(), b"hello");
        });
        assert!(base.join("report.txt").exists());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_string_lossy().into_owned());
        let err = tokio_test::block_on(storage.read_file("absent.csv")).unwrap_err();
        assert!(matches!(err, crate::utils::error::SimError::IoError(_)));
    }
}
