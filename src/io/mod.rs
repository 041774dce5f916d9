//! Serialized contexts: `context,prefix,namespace,status` CSV files.

pub mod parser;
pub mod writer;

pub use parser::{parse_context, parse_context_file};
pub use writer::{write_context, write_context_to};

/// Column order shared by the parser and writer.
pub const CONTEXT_COLUMNS: [&str; 4] = ["context", "prefix", "namespace", "status"];
