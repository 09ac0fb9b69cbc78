//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod defaults;
mod parsers;


pub use cli::AgentArgs;
pub use parsers::parse_duration_arg;
