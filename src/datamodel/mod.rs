//! Prefix expansion data model.
//!
//! A `Context` is a named collection of `PrefixExpansion`s, each tagged with a
//! `StatusType`. Only canonical expansions are exposed through `as_dict` and
//! converters; aliases are retained so ETL runs can explain what they dropped.

pub mod context;
pub mod expansion;

pub use context::{CaseNormalization, Context, IntegrityReport};
pub use expansion::{NAMESPACE_RE, PREFIX_RE, PrefixExpansion, StatusType};
