//! Text model for the Vigil analysis backend.
//!
//! Three concerns live here, all independent of any particular language:
//!
//! - [`PositionMap`]: conversion between `(line, character)` positions and
//!   byte offsets of a single text snapshot.
//! - [`apply_edits`]: ordered application of editor change batches, with an
//!   [`EditListener`] hook so position-keyed metadata can follow the edits.
//! - [`SourceLocation`]: the position-only key used for execution metadata.
//!
//! # Position Conventions
//!
//! ```text
//! Position / TextRange      0-based line, 0-based UTF-16 character (editor facing)
//! SourceLocation            1-based lines, 1-based columns, inclusive end column
//! Span                      byte offsets into one snapshot
//! ```
//!
//! The only crossing from editor lines to source lines is
//! [`zero_based_line_to_one_based_line`].

mod edit;
mod location;
mod position;

pub use edit::{apply_edits, line_span, AppliedEdit, EditEvent, EditListener};
pub use location::{SourceLocation, Span};
pub use position::{zero_based_line_to_one_based_line, Position, PositionMap, TextRange};
