//! "Load more" pagination
//!
//! [`PaginationState`] is the pure accumulator: summaries in fetch order
//! plus the cursor of the next page. [`ListingController`] wraps it for
//! interactive use, adding a recoverable error status and cancellation
//! tied to the controller's lifetime.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::ContentSource;
use crate::content::{Cursor, PostPage, PostSummary};
use crate::error::{ContentError, Result};

/// Accumulated listing pages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaginationState {
    summaries: Vec<PostSummary>,
    next_cursor: Option<Cursor>,
}

impl PaginationState {
    /// Start from the first page
    pub fn initialize(first_page: PostPage) -> Self {
        Self {
            summaries: first_page.summaries,
            next_cursor: first_page.next_cursor,
        }
    }

    /// Summaries in fetch order
    pub fn summaries(&self) -> &[PostSummary] {
        &self.summaries
    }

    pub fn next_cursor(&self) -> Option<&Cursor> {
        self.next_cursor.as_ref()
    }

    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Fetch the page behind the cursor and return the extended state.
    ///
    /// Without a cursor this returns an unchanged copy and fetches nothing.
    /// On failure `self` is untouched and the error is returned; calling
    /// again retries the same cursor, and pages are never deduplicated.
    pub async fn load_more<S: ContentSource + ?Sized>(&self, source: &S) -> Result<Self> {
        let Some(cursor) = &self.next_cursor else {
            return Ok(self.clone());
        };

        let page = source.next_page(cursor).await?;
        let mut next = self.clone();
        next.append(page);
        Ok(next)
    }

    fn append(&mut self, page: PostPage) {
        self.summaries.extend(page.summaries);
        self.next_cursor = page.next_cursor;
    }
}

/// Outcome of the most recent load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// Ready to load more
    Idle,
    /// Last attempt failed; retrying reuses the same cursor
    Failed(String),
    /// No cursor left
    Exhausted,
}

/// Owns the listing of one page view.
///
/// `load_more` takes `&mut self`, so at most one fetch is ever in flight.
/// Dropping the controller cancels any fetch still running under its
/// token.
#[derive(Debug)]
pub struct ListingController {
    state: PaginationState,
    status: LoadStatus,
    cancel: CancellationToken,
}

impl ListingController {
    pub fn new(first_page: PostPage) -> Self {
        Self::from_token(first_page, CancellationToken::new())
    }

    /// Create a controller whose fetches also abort when `parent` fires.
    ///
    /// The controller cancels a child of `parent`, never `parent` itself,
    /// so dropping it leaves the owner's other work running.
    pub fn with_cancellation(first_page: PostPage, parent: &CancellationToken) -> Self {
        Self::from_token(first_page, parent.child_token())
    }

    fn from_token(first_page: PostPage, cancel: CancellationToken) -> Self {
        let state = PaginationState::initialize(first_page);
        let status = if state.has_more() {
            LoadStatus::Idle
        } else {
            LoadStatus::Exhausted
        };
        Self {
            state,
            status,
            cancel,
        }
    }

    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    pub fn summaries(&self) -> &[PostSummary] {
        self.state.summaries()
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// Whether the "load more" control should be shown
    pub fn can_load_more(&self) -> bool {
        self.state.has_more() && !self.cancel.is_cancelled()
    }

    /// A handle that cancels this controller's fetches
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Fetch the next page and append it.
    ///
    /// Returns how many summaries were appended; `Ok(0)` without fetching
    /// once the cursor is gone. Failures and cancellation leave the
    /// accumulated state as it was.
    pub async fn load_more<S: ContentSource + ?Sized>(&mut self, source: &S) -> Result<usize> {
        let Some(cursor) = self.state.next_cursor().cloned() else {
            self.status = LoadStatus::Exhausted;
            return Ok(0);
        };

        if self.cancel.is_cancelled() {
            return Err(ContentError::Cancelled);
        }

        let fetched = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!(cursor = %cursor, "Load more cancelled");
                return Err(ContentError::Cancelled);
            }
            page = source.next_page(&cursor) => page,
        };

        match fetched {
            Ok(page) => {
                let added = page.summaries.len();
                self.state.append(page);
                self.status = if self.state.has_more() {
                    LoadStatus::Idle
                } else {
                    LoadStatus::Exhausted
                };
                debug!(added, total = self.state.summaries().len(), "Loaded more posts");
                Ok(added)
            }
            Err(err) => {
                warn!(cursor = %cursor, "Failed to load more posts: {}", err);
                self.status = LoadStatus::Failed(err.to_string());
                Err(err)
            }
        }
    }
}

impl Drop for ListingController {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
