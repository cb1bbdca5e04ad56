use std::io::ErrorKind;
use std::path::PathBuf;
use async_trait::async_trait;
use tracing::debug;
use crate::domain::ports::SignatureStore;
use crate::error::AppError;

/// Writes signature images into a local directory served under `base_url`.
pub struct FsSignatureStore {
    dir: PathBuf,
    base_url: String,
}

impl FsSignatureStore {
    pub fn new(dir: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            dir: dir.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(AppError::InternalWithMsg(format!("invalid signature key '{}'", key)));
        }
        Ok(self.dir.join(key))
    }
}

#[async_trait]
impl SignatureStore for FsSignatureStore {
    async fn put(&self, key: &str, content_type: &str, bytes: &[u8]) -> Result<String, AppError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await
            .map_err(|e| AppError::InternalWithMsg(format!("signature dir: {}", e)))?;
        tokio::fs::write(&path, bytes).await
            .map_err(|e| AppError::InternalWithMsg(format!("signature write: {}", e)))?;

        debug!("Stored {} signature ({} bytes) at {}", content_type, bytes.len(), path.display());
        Ok(format!("{}/{}", self.base_url, key))
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::InternalWithMsg(format!("signature delete: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_delete() {
        let dir = std::env::temp_dir().join(format!("sig-store-{}", uuid::Uuid::new_v4()));
        let store = FsSignatureStore::new(&dir, "/signatures/");

        let url = store.put("abc.png", "image/png", b"png-bytes").await.unwrap();
        assert_eq!(url, "/signatures/abc.png");
        assert_eq!(tokio::fs::read(dir.join("abc.png")).await.unwrap(), b"png-bytes");

        store.delete("abc.png").await.unwrap();
        assert!(!dir.join("abc.png").exists());
        // deleting twice is fine
        store.delete("abc.png").await.unwrap();

        assert!(store.put("../escape.png", "image/png", b"x").await.is_err());
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
