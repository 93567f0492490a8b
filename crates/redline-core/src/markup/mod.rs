//! Tracked markup codec.
//!
//! Inline notation for review annotations embedded in markdown:
//!
//! | Span | Meaning |
//! |---|---|
//! | `{++text++}` | insertion |
//! | `{--text--}` | deletion |
//! | `{~~old~>new~~}` | substitution |
//! | `{==text==}{>>note<<}` | highlight with comment |
//! | `{>>note<<}` | comment |
//!
//! Parsing never fails: malformed spans stay literal text and are reported
//! as diagnostics.

pub mod codec;
pub mod comments;
pub mod strip;

pub use codec::{
    accept, accept_all, create_addition, create_comment, create_deletion, create_highlight,
    create_substitution, has_tracked_markup, parse, parse_with_diagnostics, reject, reject_all,
    MarkupKind, MarkupMatch, ParsedMarkup,
};
pub use comments::{extract, reattach, CommentAnchor, ExtractedComment};
pub use strip::{contains_delimiter, strip_tracked_markup, StripMode, StripOptions};
