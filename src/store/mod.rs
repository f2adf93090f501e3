//! Blog storage module with pluggable backends.
//!
//! Supports:
//! - `memory`: in-memory storage (non-persistent, for testing/embedding)
//! - `file`: JSON file-based storage (production)
//!
//! All backends share the mutation semantics defined on [`Collection`], so
//! the file store is the in-memory store plus a durable flush after every
//! write.

mod file;
mod memory;

pub use file::FileBlogStore;
pub use memory::InMemoryBlogStore;

use crate::query::{BlogFilter, BlogPage};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One directory listing: an external blog curated into the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    /// Caller-supplied identifier, unique across the store.
    pub id: String,
    pub name: String,
    pub url: String,
    /// Tag set; duplicates are collapsed on write, first occurrence wins.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Disabled entries stay in the store but are hidden from visitors.
    #[serde(default)]
    pub enabled: bool,
    /// Milliseconds since the epoch; stamped at creation, never changed.
    #[serde(default)]
    pub join_time: i64,
    /// Milliseconds since the epoch; refreshed on every update.
    #[serde(default)]
    pub update_time: i64,
}

/// Partial update for a stored blog.
///
/// Absent fields keep the stored value. `join_time` and `update_time` are
/// managed by the store and cannot be patched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogPatch {
    pub name: Option<String>,
    pub url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub enabled: Option<bool>,
}

/// In-memory mirror of the backing file: the entries in insertion order plus
/// the persisted tag registry.
///
/// The registry is maintained independently of the tags in use; it may list
/// tags no entry currently carries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub blogs: Vec<Blog>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Collection {
    /// Append a new entry, stamping `join_time = update_time = now`.
    ///
    /// A duplicate id is rejected before anything is touched.
    pub fn add(&mut self, mut blog: Blog) -> Result<Blog, StoreError> {
        if self.blogs.iter().any(|b| b.id == blog.id) {
            return Err(StoreError::DuplicateId(blog.id));
        }
        let now = now_millis();
        blog.join_time = now;
        blog.update_time = now;
        dedup_tags(&mut blog.tags);
        self.blogs.push(blog.clone());
        Ok(blog)
    }

    /// Merge `patch` over the entry with `id`, keeping the original
    /// `join_time` and bumping `update_time`. A missing id is a no-op.
    pub fn update(&mut self, id: &str, patch: &BlogPatch) {
        let now = now_millis();
        for blog in self.blogs.iter_mut().filter(|b| b.id == id) {
            if let Some(name) = &patch.name {
                blog.name = name.clone();
            }
            if let Some(url) = &patch.url {
                blog.url = url.clone();
            }
            if let Some(tags) = &patch.tags {
                blog.tags = tags.clone();
                dedup_tags(&mut blog.tags);
            }
            if let Some(enabled) = patch.enabled {
                blog.enabled = enabled;
            }
            blog.update_time = now;
        }
    }

    /// Drop every entry with `id` (at most one, by the uniqueness invariant).
    pub fn delete(&mut self, id: &str) {
        self.blogs.retain(|b| b.id != id);
    }

    /// Replace `old` with `new` in every entry's tag set and in the registry,
    /// collapsing the pair when an entry already carries `new`.
    pub fn rename_tag(&mut self, old: &str, new: &str) {
        for blog in &mut self.blogs {
            if blog.tags.iter().any(|t| t == old) {
                blog.tags.retain(|t| t != old);
                if !blog.tags.iter().any(|t| t == new) {
                    blog.tags.push(new.to_string());
                }
            }
        }
        for tag in &mut self.tags {
            if tag == old {
                *tag = new.to_string();
            }
        }
        dedup_tags(&mut self.tags);
    }

    /// Remove `tag` from every entry and from the registry. Unused tags are
    /// not an error.
    pub fn delete_tag(&mut self, tag: &str) {
        for blog in &mut self.blogs {
            blog.tags.retain(|t| t != tag);
        }
        self.tags.retain(|t| t != tag);
    }
}

/// Current time in milliseconds since the epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Collapse duplicate tags in place, keeping first-occurrence order.
fn dedup_tags(tags: &mut Vec<String>) {
    let mut seen = HashSet::new();
    tags.retain(|t| seen.insert(t.clone()));
}

/// Errors surfaced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An entry with this id is already in the store; the caller has to pick
    /// a different one.
    #[error("blog with id `{0}` already exists")]
    DuplicateId(String),

    /// The backing file could not be read, parsed, or rewritten. Fatal to
    /// the operation; never retried automatically.
    #[error("{action} failed for {}: {message}", .path.display())]
    Persistence {
        action: &'static str,
        path: PathBuf,
        message: String,
    },
}

impl StoreError {
    pub(crate) fn persistence(
        action: &'static str,
        path: &Path,
        err: impl std::fmt::Display,
    ) -> Self {
        Self::Persistence {
            action,
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// Blog store trait - implemented by all storage backends.
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// Filter, search, and paginate the current collection.
    async fn get_blogs(&self, filter: &BlogFilter) -> Result<BlogPage, StoreError>;

    /// Insert a new entry; fails with [`StoreError::DuplicateId`] without
    /// touching the backing file.
    async fn add_blog(&self, blog: Blog) -> Result<Blog, StoreError>;

    /// Merge a patch over the entry with `id`. A missing id is a silent
    /// no-op that still flushes.
    async fn update_blog(&self, id: &str, patch: BlogPatch) -> Result<(), StoreError>;

    /// Remove the entry with `id`; succeeds even if nothing matched.
    async fn delete_blog(&self, id: &str) -> Result<(), StoreError>;

    /// The persisted tag registry, verbatim.
    async fn get_tags(&self) -> Result<Vec<String>, StoreError>;

    /// Occurrence counts over the tags of enabled entries. Registered tags
    /// used by zero enabled entries are omitted.
    async fn get_tags_with_count(&self) -> Result<HashMap<String, usize>, StoreError>;

    /// Rename a tag across every entry and the registry, merging duplicates.
    async fn rename_tag(&self, old: &str, new: &str) -> Result<(), StoreError>;

    /// Remove a tag from every entry and the registry.
    async fn delete_tag(&self, tag: &str) -> Result<(), StoreError>;
}

/// Blog store type selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlogStoreType {
    Memory,
    #[default]
    File,
}

impl BlogStoreType {
    /// Parse from environment variable value.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "memory" => Self::Memory,
            "file" | "json" => Self::File,
            _ => Self::default(),
        }
    }
}

/// Create a blog store based on type and configuration.
pub async fn create_blog_store(
    store_type: BlogStoreType,
    data_path: PathBuf,
) -> Result<Box<dyn BlogStore>, StoreError> {
    match store_type {
        BlogStoreType::Memory => Ok(Box::new(InMemoryBlogStore::new())),
        BlogStoreType::File => {
            let store = FileBlogStore::new(data_path).await?;
            Ok(Box::new(store))
        }
    }
}
