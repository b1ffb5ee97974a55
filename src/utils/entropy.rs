use std::collections::HashMap;

/// Calculate Shannon entropy of a token over its characters, in bits per
/// character.
///
/// A single repeated character scores 0.0; `n` distinct characters in equal
/// proportion score `log2(n)`. Dictionary words usually sit well under 4.0,
/// random or encoded material climbs above it.
pub fn shannon_entropy(token: &str) -> f64 {
    if token.is_empty() {
        return 0.0;
    }

    let mut frequencies: HashMap<char, u32> = HashMap::new();
    let mut len = 0u32;
    for c in token.chars() {
        *frequencies.entry(c).or_insert(0) += 1;
        len += 1;
    }

    let len = len as f64;
    let mut entropy = 0.0;

    for &count in frequencies.values() {
        let p = count as f64 / len;
        entropy -= p * p.log2();
    }

    entropy
}
