//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to the resolver.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, OutputFormat};
pub use presentation::{format_check_text, format_resolve_json, format_resolve_text};
pub use route::RunContext;
