use std::collections::HashSet;

use tracing::debug;

use crate::traffic::{FieldKind, Record};
use crate::utils::config::Delimiters;

/// Every distinct token seen across all records, before filtering.
pub type RawTokenSet = HashSet<String>;

/// A set of characters that separate tokens.
#[derive(Debug, Clone)]
pub struct DelimiterPolicy {
    delimiters: HashSet<char>,
}

impl DelimiterPolicy {
    pub fn new(delimiters: &str) -> Self {
        Self {
            delimiters: delimiters.chars().collect(),
        }
    }

    pub fn is_delimiter(&self, c: char) -> bool {
        self.delimiters.contains(&c)
    }

    /// Split on every delimiter, dropping the empty pieces between adjacent
    /// delimiters and at either end of the text.
    pub fn split<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        text.split(move |c: char| self.is_delimiter(c))
            .filter(|token| !token.is_empty())
    }
}

/// Splits record fields into candidate words, using a narrow policy for URL
/// paths and a broad one for request and response bodies.
pub struct Tokenizer {
    path: DelimiterPolicy,
    body: DelimiterPolicy,
}

impl Tokenizer {
    pub fn new(path: DelimiterPolicy, body: DelimiterPolicy) -> Self {
        Self { path, body }
    }

    pub fn from_config(delimiters: &Delimiters) -> Self {
        Self::new(
            DelimiterPolicy::new(&delimiters.path),
            DelimiterPolicy::new(&delimiters.body),
        )
    }

    pub fn policy_for(&self, field: FieldKind) -> &DelimiterPolicy {
        match field {
            FieldKind::Path => &self.path,
            FieldKind::Request | FieldKind::Response => &self.body,
        }
    }

    pub fn tokenize<'a>(
        &'a self,
        field: FieldKind,
        text: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.policy_for(field).split(text)
    }

    /// Union of the tokens of every field of every record.
    pub fn collect<'r, I>(&self, records: I) -> RawTokenSet
    where
        I: IntoIterator<Item = &'r Record>,
    {
        let mut raw = RawTokenSet::new();
        for record in records {
            let before = raw.len();
            for (field, text) in record.fields() {
                raw.extend(self.tokenize(field, text).map(str::to_owned));
            }
            debug!(
                "Record {} added {} new tokens",
                record.index,
                raw.len() - before
            );
        }
        raw
    }
}
