use crate::error::Result;
use crate::relay::hub::ClientId;
use std::path::PathBuf;

/// Keeps the latest raw message received from each client
#[derive(Debug, Clone)]
pub struct MessageArchive {
    dir: PathBuf,
}

impl MessageArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File holding the latest message from `client_id`
    pub fn path_for(&self, client_id: ClientId) -> PathBuf {
        self.dir.join(format!("message-data-{}", client_id))
    }

    /// Write `raw` to the client's file, replacing the previous message
    pub async fn store(&self, client_id: ClientId, raw: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(client_id);
        tokio::fs::write(&path, raw).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_store_overwrites_per_client() {
        let dir = tempdir().unwrap();
        let archive = MessageArchive::new(dir.path().join("logs"));

        archive.store(7, "first").await.unwrap();
        let path = archive.store(7, "second").await.unwrap();

        assert_eq!(path, archive.path_for(7));
        assert!(path.ends_with("message-data-7"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }
}
