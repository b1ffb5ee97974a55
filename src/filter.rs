use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::error::WordlistError;
use crate::tokenizer::RawTokenSet;
use crate::utils::config::{Check, FilterConfig, Rule};
use crate::utils::entropy;

/// Rule id reported when a token clears the denylist but is too random.
pub const HIGH_ENTROPY: &str = "HIGH_ENTROPY";

/// Accepted tokens, sorted so the written wordlist is stable across runs.
pub type FinalTokenSet = BTreeSet<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict<'a> {
    Accept,
    /// Id of the first rule that matched
    Reject(&'a str),
}

#[derive(Debug)]
enum Predicate {
    Numeric,
    Length(usize),
    Pattern(Regex),
}

impl Predicate {
    fn matches(&self, token: &str) -> bool {
        match self {
            Predicate::Numeric => !token.is_empty() && token.chars().all(char::is_numeric),
            // Same reach as `.{n,}`: a run of n characters not broken by a newline.
            Predicate::Length(n) => token.split('\n').any(|line| line.chars().count() >= *n),
            Predicate::Pattern(regex) => regex.is_match(token),
        }
    }
}

/// One independent exclusion check.
#[derive(Debug)]
pub struct CompiledRule {
    id: String,
    description: Option<String>,
    predicate: Predicate,
}

impl CompiledRule {
    fn compile(rule: &Rule, max_token_length: usize) -> Result<Self, WordlistError> {
        let predicate = match rule.check {
            Check::Numeric => Predicate::Numeric,
            Check::Length => Predicate::Length(max_token_length),
            Check::Pattern => {
                let pattern = rule.pattern.as_deref().ok_or_else(|| WordlistError::InvalidRule {
                    id: rule.id.clone(),
                    reason: "pattern check without a pattern".to_string(),
                })?;
                let regex = Regex::new(pattern).map_err(|e| WordlistError::InvalidRule {
                    id: rule.id.clone(),
                    reason: e.to_string(),
                })?;
                Predicate::Pattern(regex)
            }
        };

        Ok(Self {
            id: rule.id.clone(),
            description: rule.description.clone(),
            predicate,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn matches(&self, token: &str) -> bool {
        self.predicate.matches(token)
    }
}

/// Per-rule rejection counts for one filtering pass.
#[derive(Debug, Default, Clone, Serialize)]
pub struct FilterStats {
    pub accepted: usize,
    pub rejected: BTreeMap<String, usize>,
}

impl FilterStats {
    pub fn total_rejected(&self) -> usize {
        self.rejected.values().sum()
    }
}

/// Ordered denylist followed by an entropy gate.
///
/// A token is kept only if no rule matches and its Shannon entropy stays at
/// or below the configured threshold.
pub struct TokenFilter {
    rules: Vec<CompiledRule>,
    entropy_threshold: f64,
}

impl TokenFilter {
    pub fn new(config: &FilterConfig) -> Result<Self, WordlistError> {
        let rules = config
            .rules
            .iter()
            .map(|rule| CompiledRule::compile(rule, config.max_token_length))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rules,
            entropy_threshold: config.entropy_threshold,
        })
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn rule(&self, id: &str) -> Option<&CompiledRule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn entropy_threshold(&self) -> f64 {
        self.entropy_threshold
    }

    pub fn evaluate(&self, token: &str) -> Verdict<'_> {
        if let Some(rule) = self.rules.iter().find(|rule| rule.matches(token)) {
            return Verdict::Reject(&rule.id);
        }
        if entropy::shannon_entropy(token) > self.entropy_threshold {
            return Verdict::Reject(HIGH_ENTROPY);
        }
        Verdict::Accept
    }

    /// The token itself if it is worth keeping, nothing otherwise.
    pub fn accept<'t>(&self, token: &'t str) -> Option<&'t str> {
        match self.evaluate(token) {
            Verdict::Accept => Some(token),
            Verdict::Reject(_) => None,
        }
    }

    pub fn filter(&self, raw: &RawTokenSet) -> (FinalTokenSet, FilterStats) {
        let mut words = FinalTokenSet::new();
        let mut stats = FilterStats::default();

        for token in raw {
            match self.evaluate(token) {
                Verdict::Accept => {
                    words.insert(token.clone());
                }
                Verdict::Reject(rule) => {
                    debug!("Rejected {:?} by {}", token, rule);
                    *stats.rejected.entry(rule.to_string()).or_insert(0) += 1;
                }
            }
        }

        stats.accepted = words.len();
        (words, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> TokenFilter {
        TokenFilter::new(&FilterConfig::default_rules().unwrap()).unwrap()
    }

    fn hits(f: &TokenFilter, id: &str, token: &str) -> bool {
        f.rule(id).unwrap_or_else(|| panic!("no rule {id}")).matches(token)
    }

    #[test]
    fn keeps_rule_order_from_config() {
        let f = filter();
        let ids: Vec<&str> = f.rules().iter().map(CompiledRule::id).collect();
        assert_eq!(
            ids,
            vec![
                "NUMERIC",
                "NOISY_PUNCTUATION",
                "TOO_LONG",
                "DIGIT_RUN",
                "TRAILING_DIGITS",
                "HASH_DIGEST",
                "NUMERIC_UPPER_NOISE",
                "DEEP_PATH",
                "UUID",
                "MIXED_ALNUM_NOISE",
                "LOW_VALUE_EXTENSION",
                "EMPTY",
            ]
        );
        assert_eq!(f.entropy_threshold(), 4.25);
    }

    #[test]
    fn accepts_plain_words() {
        let f = filter();
        for word in ["login", "admin", "api", "users", "id", "logo.xyz", "v2"] {
            assert_eq!(f.evaluate(word), Verdict::Accept, "{word}");
            assert_eq!(f.accept(word), Some(word));
        }
    }

    #[test]
    fn rejects_pure_numbers_first() {
        let f = filter();
        assert_eq!(f.evaluate("5"), Verdict::Reject("NUMERIC"));
        assert_eq!(f.evaluate("123456"), Verdict::Reject("NUMERIC"));
        assert_eq!(f.accept("42"), None);
        assert!(!hits(&f, "NUMERIC", ""));
        assert!(!hits(&f, "NUMERIC", "12a"));
    }

    #[test]
    fn noisy_punctuation() {
        let f = filter();
        for token in ["wow!", "f(x", "a,b", "100%"] {
            assert!(hits(&f, "NOISY_PUNCTUATION", token), "{token}");
        }
        assert!(!hits(&f, "NOISY_PUNCTUATION", "plain"));
    }

    #[test]
    fn length_limit_is_inclusive() {
        let f = filter();
        assert!(!hits(&f, "TOO_LONG", &"a".repeat(49)));
        assert!(hits(&f, "TOO_LONG", &"a".repeat(50)));
        assert!(!hits(&f, "TOO_LONG", &format!("{}\n{}", "a".repeat(30), "a".repeat(30))));
        assert_eq!(f.evaluate(&"ab".repeat(30)), Verdict::Reject("TOO_LONG"));
    }

    #[test]
    fn digit_runs() {
        let f = filter();
        assert!(hits(&f, "DIGIT_RUN", "user123name"));
        assert!(!hits(&f, "DIGIT_RUN", "v12name"));
        assert!(hits(&f, "TRAILING_DIGITS", "order1234"));
        assert!(!hits(&f, "TRAILING_DIGITS", "123order"));
        assert_eq!(f.evaluate("item999x"), Verdict::Reject("DIGIT_RUN"));
    }

    #[test]
    fn hash_digest() {
        let f = filter();
        let digest = "d41d8cd98f00b204e9800998ecf8427e";
        assert_eq!(f.accept(digest), None);
        assert!(hits(&f, "HASH_DIGEST", digest));

        // Letters only, no digit runs, below the entropy threshold.
        let low_entropy = "abcdabcdabcdabcdabcdabcdabcdabcd";
        assert!(entropy::shannon_entropy(low_entropy) < 4.25);
        assert_eq!(f.evaluate(low_entropy), Verdict::Reject("HASH_DIGEST"));
        assert!(!hits(&f, "HASH_DIGEST", &"abcd".repeat(7)));
    }

    #[test]
    fn numeric_upper_noise() {
        let f = filter();
        assert!(hits(&f, "NUMERIC_UPPER_NOISE", "x1ABCDE"));
        assert!(!hits(&f, "NUMERIC_UPPER_NOISE", "1ABCD"));
        assert!(!hits(&f, "NUMERIC_UPPER_NOISE", "1abcde"));
        assert_eq!(f.evaluate("7QWERTY"), Verdict::Reject("NUMERIC_UPPER_NOISE"));
    }

    #[test]
    fn deep_paths() {
        let f = filter();
        assert!(hits(&f, "DEEP_PATH", "/a/b/c/d/e/f/"));
        assert!(!hits(&f, "DEEP_PATH", "/a/b/c/d/e/f"));
    }

    #[test]
    fn uuid_shape() {
        let f = filter();
        let uuid = "550e8400-e29b-41d4-a716-446655440000";
        assert!(hits(&f, "UUID", uuid));
        assert_eq!(f.accept(uuid), None);
        assert_eq!(
            f.evaluate("abcdefgh-abcd-abcd-abcd-abcdefghijkl"),
            Verdict::Reject("UUID")
        );
        assert!(!hits(&f, "UUID", "abcdefgh-abcd-abcd-abcd-abcdefghijk"));
    }

    #[test]
    fn mixed_alnum_noise() {
        let f = filter();
        assert!(hits(&f, "MIXED_ALNUM_NOISE", "1a2b3"));
        assert!(!hits(&f, "MIXED_ALNUM_NOISE", "1a2b"));
        assert_eq!(f.evaluate("x1ab2cd3"), Verdict::Reject("MIXED_ALNUM_NOISE"));
    }

    #[test]
    fn low_value_extensions() {
        let f = filter();
        for token in ["logo.png", "site.css", "font.woff", "clip.mp4", "x.ajax"] {
            assert_eq!(f.evaluate(token), Verdict::Reject("LOW_VALUE_EXTENSION"), "{token}");
        }
        assert!(!hits(&f, "LOW_VALUE_EXTENSION", "logo.xyz"));
        assert!(!hits(&f, "LOW_VALUE_EXTENSION", "logo.PNG"));
        assert!(!hits(&f, "LOW_VALUE_EXTENSION", "logopng"));
        assert!(!hits(&f, "LOW_VALUE_EXTENSION", "logo.png.bak"));
    }

    #[test]
    fn empty_token() {
        let f = filter();
        assert!(hits(&f, "EMPTY", ""));
        assert!(!hits(&f, "EMPTY", "a"));
        assert_eq!(f.evaluate(""), Verdict::Reject("EMPTY"));
    }

    #[test]
    fn high_entropy_is_checked_last() {
        let f = filter();
        let token = "aZkQxPmLwBvNcTyRuIoE";
        assert!(f.rules().iter().all(|rule| !rule.matches(token)));
        assert_eq!(f.evaluate(token), Verdict::Reject(HIGH_ENTROPY));
    }

    #[test]
    fn filter_counts_rejections() {
        let f = filter();
        let raw: RawTokenSet = ["login", "api", "5", "123", "logo.png", ""]
            .iter()
            .map(|t| t.to_string())
            .collect();

        let (words, stats) = f.filter(&raw);
        assert_eq!(words.into_iter().collect::<Vec<_>>(), vec!["api", "login"]);
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.rejected.get("NUMERIC"), Some(&2));
        assert_eq!(stats.rejected.get("LOW_VALUE_EXTENSION"), Some(&1));
        assert_eq!(stats.rejected.get("EMPTY"), Some(&1));
        assert_eq!(stats.total_rejected(), 4);
    }

    #[test]
    fn bad_pattern_is_a_config_error() {
        let mut config = FilterConfig::default_rules().unwrap();
        config.rules.push(Rule {
            id: "BROKEN".to_string(),
            check: Check::Pattern,
            pattern: Some("[unclosed".to_string()),
            description: None,
        });
        assert!(matches!(
            TokenFilter::new(&config),
            Err(WordlistError::InvalidRule { ref id, .. }) if id == "BROKEN"
        ));

        config.rules.last_mut().unwrap().pattern = None;
        assert!(TokenFilter::new(&config).is_err());
    }
}
