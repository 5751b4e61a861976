//! Small in-crate token-set similarity scorer for the resolver's optional
//! lexical blocking step, grounded in `original_source`'s use of
//! `rapidfuzz.fuzz.token_set_ratio`. No crate in the teacher's stack covers
//! this, so a minimal local implementation stands in rather than reaching
//! outside the corpus for a fuzzy-matching dependency.

use std::collections::BTreeSet;

fn tokens(s: &str) -> BTreeSet<String> {
    s.to_lowercase()
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Token-set ratio in `[0, 100]`: the similarity of the intersection
/// against each side's token set, taking the best of the two comparisons
/// (mirrors `rapidfuzz`'s token-set approach of neutralizing word-order and
/// subset/superset differences).
pub fn token_set_ratio(a: &str, b: &str) -> u32 {
    let tokens_a = tokens(a);
    let tokens_b = tokens(b);

    if tokens_a.is_empty() && tokens_b.is_empty() {
        return 100;
    }
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0;
    }

    let intersection: BTreeSet<&String> = tokens_a.intersection(&tokens_b).collect();
    let sorted_intersection = intersection.iter().cloned().cloned().collect::<Vec<_>>().join(" ");
    let sorted_a = tokens_a.iter().cloned().collect::<Vec<_>>().join(" ");
    let sorted_b = tokens_b.iter().cloned().collect::<Vec<_>>().join(" ");

    let ratio_a_vs_intersection = ratio(&sorted_intersection, &sorted_a);
    let ratio_b_vs_intersection = ratio(&sorted_intersection, &sorted_b);
    let ratio_a_vs_b = ratio(&sorted_a, &sorted_b);

    ratio_a_vs_intersection
        .max(ratio_b_vs_intersection)
        .max(ratio_a_vs_b)
}

/// Simple normalized Levenshtein-distance-based ratio in `[0, 100]`.
fn ratio(a: &str, b: &str) -> u32 {
    let distance = levenshtein(a, b);
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 100;
    }
    (((max_len - distance.min(max_len)) as f64 / max_len as f64) * 100.0).round() as u32
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (m, n) = (a.len(), b.len());

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_100() {
        assert_eq!(token_set_ratio("Apple Inc", "Apple Inc"), 100);
    }

    #[test]
    fn word_order_does_not_hurt_score() {
        let reordered = token_set_ratio("Inc Apple", "Apple Inc");
        assert_eq!(reordered, 100);
    }

    #[test]
    fn disjoint_strings_score_low() {
        assert!(token_set_ratio("Apple Inc", "Banana Republic") < 50);
    }
}
