use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::error::WordlistError;
use crate::filter::{FinalTokenSet, TokenFilter};
use crate::tokenizer::Tokenizer;
use crate::traffic::Record;
use crate::utils::config::FilterConfig;

/// Summary of one run, printed with `--stats`.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunStats {
    pub records: usize,
    pub raw_tokens: usize,
    pub accepted: usize,
    pub rejected: BTreeMap<String, usize>,
}

pub struct Wordlist {
    pub words: FinalTokenSet,
    pub stats: RunStats,
}

/// Tokenizer and filter wired together from one configuration.
pub struct Pipeline {
    tokenizer: Tokenizer,
    filter: TokenFilter,
}

impl Pipeline {
    pub fn new(config: &FilterConfig) -> Result<Self, WordlistError> {
        Ok(Self {
            tokenizer: Tokenizer::from_config(&config.delimiters),
            filter: TokenFilter::new(config)?,
        })
    }

    pub fn with_default_rules() -> Result<Self, WordlistError> {
        Self::new(&FilterConfig::default_rules()?)
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn filter(&self) -> &TokenFilter {
        &self.filter
    }

    pub fn run(&self, records: &[Record]) -> Wordlist {
        let raw = self.tokenizer.collect(records);
        info!("Collected {} unique tokens from {} records", raw.len(), records.len());

        let (words, filter_stats) = self.filter.filter(&raw);
        info!(
            "Kept {} tokens, rejected {}",
            words.len(),
            filter_stats.total_rejected()
        );

        Wordlist {
            stats: RunStats {
                records: records.len(),
                raw_tokens: raw.len(),
                accepted: filter_stats.accepted,
                rejected: filter_stats.rejected,
            },
            words,
        }
    }
}
