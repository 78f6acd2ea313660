//! Path expressions addressing values inside a JSON tree.
//!
//! Plain forms (`$`, `$.a.b`, `a.b`, `$.items[0].id`, `$['first-name']`) are
//! read and written by walking segments. Forms using `*`, `..` or `[?` are
//! handed to a JSONPath engine and are read-only.
//!
//! Reads never fail: a missing segment or a malformed expression yields
//! `None`. Mappings are authored outside the codebase and must degrade
//! instead of aborting a run.

mod eval;
mod parse;

pub use eval::{delete, get, get_ref, is_truthy, set};
pub use parse::{PathError, PathExpr, Segment};
