//! JSON file-based blog store.
//!
//! The whole backing file is parsed into memory at construction and fully
//! rewritten on every mutation; there are no incremental writes.

use super::{Blog, BlogPatch, BlogStore, Collection, StoreError};
use crate::query::{count_tags, filter_blogs, BlogFilter, BlogPage};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};

#[derive(Clone, Debug)]
pub struct FileBlogStore {
    path: PathBuf,
    collection: Arc<RwLock<Collection>>,
    persist_lock: Arc<Mutex<()>>,
}

impl FileBlogStore {
    /// Open the store at `path`, reading the whole file into memory.
    ///
    /// A missing file starts the store empty. A malformed file is an error;
    /// the store refuses to open rather than flush over contents it could
    /// not parse.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::persistence("create store dir", &path, e))?;
        }
        let collection = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Collection>(&bytes)
                .map_err(|e| StoreError::persistence("parse", &path, e))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("no blog data at {}, starting empty", path.display());
                Collection::default()
            }
            Err(err) => return Err(StoreError::persistence("read", &path, err)),
        };
        tracing::info!(
            blogs = collection.blogs.len(),
            tags = collection.tags.len(),
            "loaded blog store from {}",
            path.display()
        );

        Ok(Self {
            path,
            collection: Arc::new(RwLock::new(collection)),
            persist_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Rewrite the backing file from the current collection.
    ///
    /// Serializes to a temp file and renames it over the target, so readers
    /// never observe a partial write. A persist that races a later mutation
    /// serializes the later state.
    async fn persist(&self) -> Result<(), StoreError> {
        let _guard = self.persist_lock.lock().await;
        let snapshot = self.collection.read().await.clone();
        let data = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| StoreError::persistence("serialize", &self.path, e))?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, data)
            .await
            .map_err(|e| StoreError::persistence("write", &self.path, e))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| StoreError::persistence("finalize", &self.path, e))?;
        tracing::debug!("persisted blog store to {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl BlogStore for FileBlogStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn get_blogs(&self, filter: &BlogFilter) -> Result<BlogPage, StoreError> {
        Ok(filter_blogs(&self.collection.read().await.blogs, filter))
    }

    async fn add_blog(&self, blog: Blog) -> Result<Blog, StoreError> {
        let stored = self.collection.write().await.add(blog)?;
        self.persist().await?;
        Ok(stored)
    }

    async fn update_blog(&self, id: &str, patch: BlogPatch) -> Result<(), StoreError> {
        self.collection.write().await.update(id, &patch);
        self.persist().await
    }

    async fn delete_blog(&self, id: &str) -> Result<(), StoreError> {
        self.collection.write().await.delete(id);
        self.persist().await
    }

    async fn get_tags(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.collection.read().await.tags.clone())
    }

    async fn get_tags_with_count(&self) -> Result<HashMap<String, usize>, StoreError> {
        let page = filter_blogs(&self.collection.read().await.blogs, &BlogFilter::default());
        Ok(count_tags(&page.blogs))
    }

    async fn rename_tag(&self, old: &str, new: &str) -> Result<(), StoreError> {
        self.collection.write().await.rename_tag(old, new);
        self.persist().await
    }

    async fn delete_tag(&self, tag: &str) -> Result<(), StoreError> {
        self.collection.write().await.delete_tag(tag);
        self.persist().await
    }
}
