//! Wordlist extraction from captured proxy traffic.
//!
//! Records from a proxy history export are split into candidate words, run
//! through a denylist and an entropy gate, and the survivors are written out
//! one per line.

pub mod error;
pub mod filter;
pub mod pipeline;
pub mod tokenizer;
pub mod traffic;
pub mod utils;

pub use error::WordlistError;
pub use filter::{TokenFilter, Verdict};
pub use pipeline::{Pipeline, RunStats, Wordlist};
pub use tokenizer::{DelimiterPolicy, Tokenizer};
pub use traffic::{parse_log, DecodeOptions, FieldKind, Record};
