use crate::error::{storage_error, DespachoResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{info, warn};
use url::Url;

/// Bucket-style file storage for uploaded documents
#[async_trait]
pub trait ObjectStorage: Send + Sync + 'static {
    /// Store `bytes` under object key `path`
    async fn upload(&self, path: &str, bytes: &[u8]) -> DespachoResult<()>;

    /// Delete objects; missing keys are ignored
    async fn remove(&self, paths: &[String]) -> DespachoResult<()>;

    /// Time-limited download link for `path`, `None` if the object is missing
    async fn create_signed_url(&self, path: &str, ttl: Duration) -> DespachoResult<Option<String>>;

    /// Bytes behind a signed token, `None` if the token is unknown or expired
    async fn open_signed(&self, token: &str) -> DespachoResult<Option<(String, Vec<u8>)>>;
}

struct SignedLink {
    path: String,
    expires_at: DateTime<Utc>,
}

/// Stores objects as files under a root directory and keeps signed links in
/// memory
pub struct LocalObjectStorage {
    root: PathBuf,
    base_url: Url,
    links: RwLock<HashMap<String, SignedLink>>,
}

impl LocalObjectStorage {
    /// `base_url` is the public origin download links are built from
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> DespachoResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        let base_url = Url::parse(base_url)
            .map_err(|e| storage_error(&format!("Invalid storage base URL: {}", e)))?;

        info!("Document storage at {}", root.display());
        Ok(Self {
            root,
            base_url,
            links: RwLock::new(HashMap::new()),
        })
    }

    /// Resolve an object key to a file path, refusing anything that would
    /// leave the root
    fn object_path(&self, path: &str) -> DespachoResult<PathBuf> {
        let relative = Path::new(path);
        let safe = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(storage_error(&format!("Invalid object key: {}", path)));
        }
        Ok(self.root.join(relative))
    }

    fn link_for(&self, token: &str) -> DespachoResult<String> {
        self.base_url
            .join(&format!("files/{}", token))
            .map(|url| url.to_string())
            .map_err(|e| storage_error(&format!("Failed to build download URL: {}", e)))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(&self, path: &str, bytes: &[u8]) -> DespachoResult<()> {
        let target = self.object_path(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        info!("Stored object {} ({} bytes)", path, bytes.len());
        Ok(())
    }

    async fn remove(&self, paths: &[String]) -> DespachoResult<()> {
        for path in paths {
            let target = self.object_path(path)?;
            match tokio::fs::remove_file(&target).await {
                Ok(()) => info!("Removed object {}", path),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!("Object {} was already gone", path);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    async fn create_signed_url(&self, path: &str, ttl: Duration) -> DespachoResult<Option<String>> {
        let target = self.object_path(path)?;
        if !tokio::fs::try_exists(&target).await? {
            return Ok(None);
        }

        let token = uuid::Uuid::new_v4().simple().to_string();
        let now = Utc::now();

        let mut links = self.links.write().await;
        // Drop expired links while we hold the lock
        links.retain(|_, link| link.expires_at > now);
        links.insert(
            token.clone(),
            SignedLink {
                path: path.to_string(),
                expires_at: now + ttl,
            },
        );

        self.link_for(&token).map(Some)
    }

    async fn open_signed(&self, token: &str) -> DespachoResult<Option<(String, Vec<u8>)>> {
        let path = {
            let links = self.links.read().await;
            match links.get(token) {
                Some(link) if link.expires_at > Utc::now() => link.path.clone(),
                _ => return Ok(None),
            }
        };

        let target = self.object_path(&path)?;
        match tokio::fs::read(&target).await {
            Ok(bytes) => Ok(Some((path, bytes))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
