//! In-memory blog store (non-persistent).

use super::{Blog, BlogPatch, BlogStore, Collection, StoreError};
use crate::query::{count_tags, filter_blogs, BlogFilter, BlogPage};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryBlogStore {
    collection: Arc<RwLock<Collection>>,
}

impl InMemoryBlogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing collection (for seeding tests and embedders).
    pub fn with_collection(collection: Collection) -> Self {
        Self {
            collection: Arc::new(RwLock::new(collection)),
        }
    }
}

#[async_trait]
impl BlogStore for InMemoryBlogStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn get_blogs(&self, filter: &BlogFilter) -> Result<BlogPage, StoreError> {
        Ok(filter_blogs(&self.collection.read().await.blogs, filter))
    }

    async fn add_blog(&self, blog: Blog) -> Result<Blog, StoreError> {
        self.collection.write().await.add(blog)
    }

    async fn update_blog(&self, id: &str, patch: BlogPatch) -> Result<(), StoreError> {
        self.collection.write().await.update(id, &patch);
        Ok(())
    }

    async fn delete_blog(&self, id: &str) -> Result<(), StoreError> {
        self.collection.write().await.delete(id);
        Ok(())
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
        Ok(())
    }

    async fn delete_tag(&self, tag: &str) -> Result<(), StoreError> {
        self.collection.write().await.delete_tag(tag);
        Ok(())
    }
}
