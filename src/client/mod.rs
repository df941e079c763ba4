//! Content sources
//!
//! Everything the site needs from the content API goes through the
//! [`ContentSource`] trait, so pagination and generation can run against
//! the real HTTP client or an in-memory fake.

mod prismic;

use async_trait::async_trait;

use crate::content::{Cursor, PostDetail, PostPage};
use crate::error::Result;

pub use prismic::PrismicClient;

/// Read access to published posts
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// First page of the listing, in the API's default order
    async fn first_page(&self, page_size: u32) -> Result<PostPage>;

    /// The page a cursor points at
    async fn next_page(&self, cursor: &Cursor) -> Result<PostPage>;

    /// A single post, or [`ContentError::NotFound`](crate::error::ContentError::NotFound)
    async fn post_by_uid(&self, uid: &str) -> Result<PostDetail>;

    /// The uid of every published post
    async fn post_uids(&self) -> Result<Vec<String>>;
}
