//! CLI presentation: text and json formatters per command.

mod check;
mod resolve;
mod shared;

pub use check::format_check_text;
pub use resolve::{format_resolve_json, format_resolve_text};
