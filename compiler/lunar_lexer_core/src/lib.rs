//! Low-level scanning primitives for the Lunar front end.
//!
//! This crate has no dependency on the syntax tree. It provides:
//! - [`SourceBuffer`]: the source copied into a sentinel-terminated,
//!   cache-line padded buffer
//! - [`Cursor`]: a `Copy` byte cursor over that buffer
//! - [`quick_scan`]: the table-driven fast path for simple tokens
//!
//! The full lexer in `lunar_lexer` builds on these and falls back to its
//! own scanners whenever [`quick_scan`] returns `None`.

mod char_class;
mod cursor;
mod quick_scan;
mod source_buffer;

pub use char_class::{classify, CharFlag};
pub use cursor::Cursor;
pub use quick_scan::{quick_scan, QuickKind, QuickScanState, QuickToken};
pub use source_buffer::SourceBuffer;
