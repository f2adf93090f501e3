//! # Blogroll
//!
//! Data-access layer for a curated directory of external blogs: a
//! single-process, file-persisted document store with filtering, tag
//! aggregation, and a token-based session map.
//!
//! This crate deliberately stops at the data layer. Transport (HTTP/RPC) and
//! rendering are external collaborators that call the operation surface:
//!
//! ```text
//!   transport layer ──▶ Directory ──┬──▶ BlogStore (query + mutations)
//!                                   └──▶ SessionMap (token → identity)
//! ```
//!
//! Every mutation flushes the full collection to the backing file before it
//! reports success; the file is replaced atomically, so a crash can lose the
//! last mutation but never corrupt the store.
//!
//! ## Modules
//! - `store`: the collection of blog entries, file-backed and in-memory
//! - `query`: pure filtering/search/pagination and tag counting
//! - `session`: token-to-identity map seeded from the secrets file
//! - `directory`: the assembled init-then-serve lifecycle
//! - `config`: environment configuration

pub mod config;
pub mod directory;
pub mod query;
pub mod session;
pub mod store;

pub use config::Config;
pub use directory::{Directory, InitError};
pub use query::{count_tags, filter_blogs, BlogFilter, BlogPage, StatusFilter};
pub use session::{SessionError, SessionMap, UserInfo};
pub use store::{
    create_blog_store, Blog, BlogPatch, BlogStore, BlogStoreType, Collection, FileBlogStore,
    InMemoryBlogStore, StoreError,
};
