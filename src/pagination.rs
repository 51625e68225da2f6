//! Offset/limit page iteration.
//!
//! A [`Paginator`] pulls one page per [`Paginator::next_page`] call. It stops
//! after a page shorter than the page size (that page is still returned) or
//! after an empty page.
//!
//! # Example
//!
//! ```
//! use moltgram::pagination::Paginator;
//!
//! # tokio_test_block(async {
//! let items: Vec<u32> = (0..5).collect();
//! let mut pages = Paginator::new(2, move |offset, limit| {
//!     let items = items.clone();
//!     async move {
//!         let start = (offset as usize).min(items.len());
//!         let end = (start + limit as usize).min(items.len());
//!         Ok::<_, moltgram::MoltgramError>(items[start..end].to_vec())
//!     }
//! });
//!
//! assert_eq!(pages.next_page().await.unwrap(), Some(vec![0, 1]));
//! assert_eq!(pages.next_page().await.unwrap(), Some(vec![2, 3]));
//! assert_eq!(pages.next_page().await.unwrap(), Some(vec![4]));
//! assert_eq!(pages.next_page().await.unwrap(), None);
//! # });
//! # fn tokio_test_block(f: impl std::future::Future<Output = ()>) {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use futures_util::stream::{self, Stream};

use crate::error::MoltgramError;

type PageFuture<T> = Pin<Box<dyn Future<Output = Result<Vec<T>, MoltgramError>> + Send>>;
type FetchPage<T> = Box<dyn FnMut(u32, u32) -> PageFuture<T> + Send>;

/// Pull-based iterator over result pages.
pub struct Paginator<T> {
    fetch: FetchPage<T>,
    page_size: u32,
    offset: u32,
    done: bool,
}

impl<T> fmt::Debug for Paginator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paginator")
            .field("page_size", &self.page_size)
            .field("offset", &self.offset)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Paginator<T> {
    /// Create a paginator that calls `fetch(offset, limit)` for each page.
    ///
    /// A page size of zero is treated as one.
    pub fn new<F, Fut>(page_size: u32, mut fetch: F) -> Self
    where
        F: FnMut(u32, u32) -> Fut + Send + 'static,
        Fut: Future<Output = Result<Vec<T>, MoltgramError>> + Send + 'static,
    {
        Self {
            fetch: Box::new(move |offset, limit| Box::pin(fetch(offset, limit))),
            page_size: page_size.max(1),
            offset: 0,
            done: false,
        }
    }

    /// Start from `offset` instead of zero.
    #[must_use]
    pub const fn starting_at(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Items requested per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Offset of the next page.
    #[must_use]
    pub const fn offset(&self) -> u32 {
        self.offset
    }

    /// Returns true once the last page has been returned.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// Fetch the next page, or `None` when there are no more.
    ///
    /// # Errors
    ///
    /// Returns the fetch error. The paginator is left unchanged, so calling
    /// again retries the same page.
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>, MoltgramError> {
        if self.done {
            return Ok(None);
        }

        let page = (self.fetch)(self.offset, self.page_size).await?;
        if page.is_empty() {
            self.done = true;
            return Ok(None);
        }

        let received = u32::try_from(page.len()).unwrap_or(u32::MAX);
        self.offset = self.offset.saturating_add(received);
        if received < self.page_size {
            self.done = true;
        }
        tracing::debug!(
            offset = self.offset,
            received,
            done = self.done,
            "Fetched page"
        );
        Ok(Some(page))
    }

    /// Drain every page into one `Vec`, stopping early at `max_items`.
    ///
    /// # Errors
    ///
    /// Returns the first fetch error; items gathered so far are discarded.
    pub async fn collect_all(mut self, max_items: Option<usize>) -> Result<Vec<T>, MoltgramError> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await? {
            items.extend(page);
            if let Some(max) = max_items {
                if items.len() >= max {
                    items.truncate(max);
                    break;
                }
            }
        }
        Ok(items)
    }

    /// Adapt into a stream of pages. The stream ends after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<T>, MoltgramError>> + Send {
        stream::unfold(Some(self), |state| async move {
            let mut pages = state?;
            match pages.next_page().await {
                Ok(Some(page)) => Some((Ok(page), Some(pages))),
                Ok(None) => None,
                Err(error) => Some((Err(error), None)),
            }
        })
    }
}
