//! Textual similarity scoring
//!
//! Case-insensitive matching-block ratio: `2 * M / T`, where `M` is the total
//! length of the matching blocks found by repeatedly taking the longest common
//! contiguous block and recursing on both sides of it, and `T` is the combined
//! length of both strings.

use std::collections::HashMap;

/// Score how similar two strings are, in `[0, 1]`
///
/// Returns `0.0` when either side is empty and `1.0` for strings that are
/// equal ignoring case. The result does not depend on argument order.
pub fn score(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let total = a.len() + b.len();

    // Tie-breaking inside the block search favours the first argument, so
    // take the better of both orientations to stay symmetric.
    let matched = matched_len(&a, &b).max(matched_len(&b, &a));
    2.0 * matched as f64 / total as f64
}

/// Total length of all matching blocks between `a` and `b`
fn matched_len(a: &[char], b: &[char]) -> usize {
    let mut positions: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, ch) in b.iter().enumerate() {
        positions.entry(*ch).or_default().push(j);
    }

    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, &positions, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }

    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`
///
/// Among equally long blocks the one starting earliest in `a` wins, then the
/// one starting earliest in `b`.
fn longest_match(
    a: &[char],
    b_positions: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // Length of the match ending at (i - 1, j) for the previous row
    let mut run_lengths: HashMap<usize, usize> = HashMap::new();

    for (i, ch) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next_lengths = HashMap::new();
        if let Some(js) = b_positions.get(ch) {
            for &j in js {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| run_lengths.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_lengths.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        run_lengths = next_lengths;
    }

    (best_i, best_j, best_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_inputs_score_zero() {
        assert_eq!(score("", "anything"), 0.0);
        assert_eq!(score("anything", ""), 0.0);
        assert_eq!(score("", ""), 0.0);
    }

    #[test]
    fn test_identical_ignoring_case_scores_one() {
        assert_eq!(score("Task Manager", "task manager"), 1.0);
        assert_eq!(score("x", "X"), 1.0);
    }

    #[test]
    fn test_disjoint_strings_score_zero() {
        assert_eq!(score("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_known_ratios() {
        // "bcd" is the only block: 2 * 3 / 8
        assert!(approx(score("abcd", "bcde"), 0.75));
        // "task" + "manager": 2 * 11 / 28
        assert!(approx(score("task-manager", "Task Manager Pro"), 22.0 / 28.0));
    }

    #[test]
    fn test_blocks_are_found_on_both_sides_of_the_longest() {
        // longest "manager", then "task" to its left
        let a: Vec<char> = "task-manager".chars().collect();
        let b: Vec<char> = "task manager pro".chars().collect();
        assert_eq!(matched_len(&a, &b), 11);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            ("abcd", "bcde"),
            ("AI-Powered: rust analyzer", "rust-analyzer"),
            ("aaab", "abaa"),
            ("Viral App: photo booth", "photobooth-pro"),
            ("ab", "ba"),
        ];
        for (a, b) in pairs {
            assert_eq!(score(a, b), score(b, a), "asymmetric for {a:?} / {b:?}");
        }
    }

    #[test]
    fn test_score_stays_in_unit_range() {
        let samples = ["a", "ab", "hello world", "HELLO", "zzzz", "wörld", "İstanbul"];
        for a in samples {
            for b in samples {
                let s = score(a, b);
                assert!((0.0..=1.0).contains(&s), "{a:?} / {b:?} -> {s}");
            }
        }
    }
}
