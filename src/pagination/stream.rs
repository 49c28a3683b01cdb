//! Concurrent flattening of a page cursor into an item stream
//!
//! Two tokio tasks cooperate:
//!
//! ```text
//!  PageCursor ──advance/read──▶ [pages task] ──batches (≤3)──▶ [items task] ──items (1)──▶ ItemStream
//! ```
//!
//! The pages task is the only driver of the cursor, so at most one load is in
//! flight. Both tasks watch a shared cancellation token; dropping the
//! [`ItemStream`] stops them.

use super::cursor::{PageCursor, PageLoader};
use crate::error::{Error, Result};
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Maximum number of loaded pages buffered ahead of the consumer
pub const PREFETCH_PAGES: usize = 3;

/// Items buffered between the items task and the consumer
const ITEM_BUFFER: usize = 1;

/// Flatten a cursor into a stream of single items.
///
/// Items arrive in page order, then in the order each page returned them.
/// Errors end the stream without being yielded; call
/// [`ItemStream::finish`] afterwards to get the cursor back and inspect its
/// terminal state.
///
/// Must be called from within a tokio runtime.
pub fn flatten<L>(cursor: PageCursor<L>) -> ItemStream<L>
where
    L: PageLoader + 'static,
    L::Item: 'static,
{
    let cancel = CancellationToken::new();
    let (batch_tx, batch_rx) = mpsc::channel(PREFETCH_PAGES);
    let (item_tx, item_rx) = mpsc::channel(ITEM_BUFFER);

    let pages_task = tokio::spawn(produce_pages(cursor, batch_tx, cancel.clone()));
    let items_task = tokio::spawn(produce_items(batch_rx, item_tx, cancel.clone()));

    ItemStream {
        items: item_rx,
        cancel,
        pages_task: Some(pages_task),
        items_task: Some(items_task),
    }
}

impl<L> PageCursor<L>
where
    L: PageLoader + 'static,
    L::Item: 'static,
{
    /// Consume the cursor into a concurrent item stream, see [`flatten`]
    pub fn into_stream(self) -> ItemStream<L> {
        flatten(self)
    }
}

/// Stage 1: drive the cursor and forward whole pages
async fn produce_pages<L: PageLoader>(
    mut cursor: PageCursor<L>,
    batches: mpsc::Sender<Vec<L::Item>>,
    cancel: CancellationToken,
) -> PageCursor<L> {
    loop {
        let more = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            more = cursor.advance() => more,
        };
        if !more {
            break;
        }

        let batch = match cursor.take_batch() {
            Ok(batch) => batch,
            Err(e) => {
                debug!(error = %e, "Stopping page producer");
                break;
            }
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            sent = batches.send(batch) => {
                if sent.is_err() {
                    break;
                }
            }
        }
    }

    cursor
}

/// Stage 2: split pages into single items
async fn produce_items<T: Send>(
    mut batches: mpsc::Receiver<Vec<T>>,
    items: mpsc::Sender<T>,
    cancel: CancellationToken,
) {
    loop {
        let batch = tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            batch = batches.recv() => batch,
        };
        let Some(batch) = batch else {
            return;
        };

        for item in batch {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                sent = items.send(item) => {
                    if sent.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

// ============================================================================
// Item Stream
// ============================================================================

/// Finite, non-restartable stream of items produced by [`flatten`].
///
/// Dropping it cancels both background tasks.
pub struct ItemStream<L: PageLoader> {
    items: mpsc::Receiver<L::Item>,
    cancel: CancellationToken,
    pages_task: Option<JoinHandle<PageCursor<L>>>,
    items_task: Option<JoinHandle<()>>,
}

impl<L: PageLoader> ItemStream<L> {
    /// Receive the next item, or `None` once the stream has ended
    pub async fn next_item(&mut self) -> Option<L::Item> {
        self.items.recv().await
    }

    /// Stop both background tasks. Items already buffered are discarded.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.items.close();
        while self.items.try_recv().is_ok() {}
    }

    /// Check if the stream was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop the pipeline and hand the cursor back.
    ///
    /// After the stream returned `None`, the cursor's
    /// [`terminal_error`](PageCursor::terminal_error) tells whether the data
    /// ran out ([`Error::NoMoreData`]) or a load failed.
    ///
    /// Stopping earlier fails with [`Error::Cancelled`]. Pages loaded ahead of
    /// the consumer are dropped along with the cursor, which cannot resume.
    pub async fn finish(mut self) -> Result<PageCursor<L>> {
        self.cancel();

        if let Some(task) = self.items_task.take() {
            task.await
                .map_err(|e| Error::Other(format!("Item producer failed: {e}")))?;
        }

        let task = self
            .pages_task
            .take()
            .ok_or_else(|| Error::Other("Page producer already joined".to_string()))?;
        let cursor = task
            .await
            .map_err(|e| Error::Other(format!("Page producer failed: {e}")))?;

        if !cursor.is_terminal() {
            debug!(page = cursor.page().page_number, "Item stream stopped early");
            return Err(Error::Cancelled);
        }
        Ok(cursor)
    }
}

impl<L: PageLoader> Unpin for ItemStream<L> {}

impl<L: PageLoader> Stream for ItemStream<L> {
    type Item = L::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.items.poll_recv(cx)
    }
}

impl<L: PageLoader> Drop for ItemStream<L> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl<L: PageLoader> std::fmt::Debug for ItemStream<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemStream")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
