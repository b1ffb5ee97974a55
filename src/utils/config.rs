use serde::{Deserialize, Serialize};

use crate::error::WordlistError;

/// How a rule decides whether a token is noise.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    /// Regex search anywhere in the token (requires `pattern`)
    #[default]
    Pattern,
    /// Token is made only of numeric characters
    Numeric,
    /// Token holds a run of at least `max_token_length` characters
    Length,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Rule {
    pub id: String,
    #[serde(default)]
    pub check: Check,
    #[serde(default)]
    pub pattern: Option<String>,
    // Optional explanation or description
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Delimiters {
    pub path: String,
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FilterConfig {
    /// Tokens scoring above this many bits per character are rejected
    pub entropy_threshold: f64,
    pub max_token_length: usize,
    pub delimiters: Delimiters,
    pub rules: Vec<Rule>,
}

impl FilterConfig {
    pub fn from_yaml(content: &str) -> Result<Self, WordlistError> {
        let config: FilterConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Returns the embedded default configuration
    pub fn default_rules() -> Result<Self, WordlistError> {
        let yaml = include_str!("../../rules.yaml");
        Self::from_yaml(yaml)
    }
}
