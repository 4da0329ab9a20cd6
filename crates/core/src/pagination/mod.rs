//! Opaque-cursor pagination.
//!
//! This module implements Relay-style cursor pagination (edges + pageInfo)
//! on top of offset-based queries, plus a classic page/limit entry point.
//!
//! # Cursor wire format
//!
//! A cursor is the string `C|{type}|{id}|{index}` passed through standard
//! base64. The transform provides opacity, not security: clients are
//! discouraged from interpreting or forging pagination state, nothing more.
//! `index` is the 1-based position of the entity in the full result set,
//! carried as an explicit running counter so that resuming is independent
//! of the page size used when the cursor was issued.
//!
//! # The queryable-source seam
//!
//! The engine is parameterized over [`PageSource`], a narrow capability
//! offering an offset read and a total count. Filters and ordering are
//! baked into the source by the storage adapter; the engine never sees a
//! query dialect.

mod cursor;
mod engine;

pub use cursor::{decode_cursor, encode_cursor, Cursor, CURSOR_DELIMITER, CURSOR_MARKER};
pub use engine::{
    paginate, paginate_cursor, Connection, CursorArgs, Edge, Page, PageArgs, PageInfo, PageSource,
    DEFAULT_PAGE, DEFAULT_PAGE_LIMIT,
};
