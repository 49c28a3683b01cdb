//! Pagination module
//!
//! Page cursor, concurrent item stream and query canonicalization.
//!
//! # Overview
//!
//! - [`PageCursor`] pulls one page per [`PageCursor::advance`] from a
//!   [`PageLoader`] and keeps the first error it sees.
//! - [`flatten`] drains a cursor in the background and yields single items
//!   through an [`ItemStream`], prefetching at most [`PREFETCH_PAGES`] pages.
//! - [`to_query`] maps a [`PageDescriptor`] to the wire query parameters.

mod cursor;
mod stream;
mod types;

pub use cursor::{CursorState, PageCursor, PageLoader};
pub use stream::{flatten, ItemStream, PREFETCH_PAGES};
pub use types::{
    to_query, AccountFilter, FilterDimension, PageDescriptor, DEFAULT_PAGE_SIZE, MAX_ROWS,
    PAGE_NUMBER_PARAM, PAGE_SIZE_PARAM,
};
