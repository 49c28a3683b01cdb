//! Pull-based page cursor
//!
//! [`PageCursor`] wraps a [`PageLoader`] and walks pages one at a time. No
//! request is made until the first [`PageCursor::advance`]. The first error is
//! remembered and reported on every later read.

use super::types::PageDescriptor;
use crate::error::{Error, Result};
use async_trait::async_trait;
use tracing::debug;

/// Fetches one page of items.
///
/// Returning [`Error::NoMoreData`] (or an empty batch) means there is nothing
/// on this page or any later one. Every other error is a hard failure.
#[async_trait]
pub trait PageLoader: Send + Sync {
    /// Item carried in each page
    type Item: Send;

    /// Load the page named by `page`
    async fn load(&self, page: &PageDescriptor) -> Result<Vec<Self::Item>>;
}

// ============================================================================
// Cursor State
// ============================================================================

/// Where a cursor is in its lifecycle
#[derive(Debug, Clone, PartialEq)]
pub enum CursorState<T> {
    /// No load attempted yet
    Unstarted,
    /// Batch from the last successful load
    HasData(Vec<T>),
    /// Loader reported the end of data
    Exhausted,
    /// Loader failed; the error is kept forever
    Failed(Error),
}

impl<T> CursorState<T> {
    /// State after a load attempt finished with `result`
    pub fn after_load(result: Result<Vec<T>>) -> Self {
        match result {
            Ok(batch) if batch.is_empty() => Self::Exhausted,
            Ok(batch) => Self::HasData(batch),
            Err(Error::NoMoreData) => Self::Exhausted,
            Err(e) => Self::Failed(e),
        }
    }

    /// Value `advance` reports after entering this state.
    ///
    /// A failure reports `true` so the following read surfaces the error.
    pub fn has_next(&self) -> bool {
        !matches!(self, Self::Exhausted | Self::Unstarted)
    }

    /// Check if no further loads may happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exhausted | Self::Failed(_))
    }

    /// Check if a batch is held
    pub fn has_data(&self) -> bool {
        matches!(self, Self::HasData(_))
    }

    /// What a read observes in this state
    pub fn read(&self) -> Result<&[T]> {
        match self {
            Self::Unstarted => Err(Error::NotStarted),
            Self::HasData(batch) => Ok(batch),
            Self::Exhausted => Err(Error::NoMoreData),
            Self::Failed(e) => Err(e.clone()),
        }
    }
}

// ============================================================================
// Page Cursor
// ============================================================================

/// Stateful iterator over pages.
///
/// ```rust,ignore
/// let mut accounts = client.list(PageDescriptor::first());
/// while accounts.advance().await {
///     let page = accounts.read()?;
///     // ...
/// }
/// ```
///
/// A cursor must be driven from one place at a time; `advance` takes
/// `&mut self` for that reason.
pub struct PageCursor<L: PageLoader> {
    loader: L,
    page: PageDescriptor,
    state: CursorState<L::Item>,
}

impl<L: PageLoader> PageCursor<L> {
    /// Create a cursor starting at `page`. Performs no I/O.
    pub fn new(loader: L, page: PageDescriptor) -> Self {
        Self {
            loader,
            page,
            state: CursorState::Unstarted,
        }
    }

    /// Move to the next page.
    ///
    /// Returns `false` once the end of data was reached or after an earlier
    /// failure. A load failure itself returns `true`; call [`read`](Self::read)
    /// to get the error.
    pub async fn advance(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }

        if self.state.has_data() {
            self.page.page_number += 1;
            self.state = CursorState::Unstarted;
        }

        let result = self.loader.load(&self.page).await;
        self.state = CursorState::after_load(result);

        match &self.state {
            CursorState::HasData(batch) => {
                debug!(page = self.page.page_number, items = batch.len(), "Loaded page");
            }
            CursorState::Exhausted => {
                debug!(page = self.page.page_number, "No more pages");
            }
            CursorState::Failed(e) => {
                debug!(page = self.page.page_number, error = %e, "Page load failed");
            }
            CursorState::Unstarted => {}
        }

        self.state.has_next()
    }

    /// Batch loaded by the last `advance`, or the terminal error.
    ///
    /// Returns [`Error::NotStarted`] before the first `advance` and
    /// [`Error::NoMoreData`] after the end of data. Repeated reads without an
    /// `advance` in between return the same result.
    pub fn read(&self) -> Result<&[L::Item]> {
        self.state.read()
    }

    /// Move the held batch out and step onto the following page.
    ///
    /// The cursor is left unstarted on the next page, so a later `advance`
    /// loads it and `read` never sees an emptied batch.
    pub(crate) fn take_batch(&mut self) -> Result<Vec<L::Item>> {
        match std::mem::replace(&mut self.state, CursorState::Unstarted) {
            CursorState::HasData(batch) => {
                self.page.page_number += 1;
                Ok(batch)
            }
            other => {
                let result = other.read().map(|_| Vec::new());
                self.state = other;
                result
            }
        }
    }

    /// Page the cursor is on
    pub fn page(&self) -> &PageDescriptor {
        &self.page
    }

    /// Current lifecycle state
    pub fn state(&self) -> &CursorState<L::Item> {
        &self.state
    }

    /// Error that ended iteration, if any (including [`Error::NoMoreData`])
    pub fn terminal_error(&self) -> Option<Error> {
        match &self.state {
            CursorState::Exhausted => Some(Error::NoMoreData),
            CursorState::Failed(e) => Some(e.clone()),
            _ => None,
        }
    }

    /// Check if iteration has ended
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

impl<L: PageLoader> std::fmt::Debug for PageCursor<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            CursorState::Unstarted => "unstarted".to_string(),
            CursorState::HasData(batch) => format!("has_data({})", batch.len()),
            CursorState::Exhausted => "exhausted".to_string(),
            CursorState::Failed(e) => format!("failed({e})"),
        };
        f.debug_struct("PageCursor")
            .field("page", &self.page)
            .field("state", &state)
            .finish_non_exhaustive()
    }
}
