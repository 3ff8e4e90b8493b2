//! Batching engine and result mergers for bulk operations
//!
//! Bulk inputs are split into contiguous, order-preserving chunks of at
//! most [`MAX_BATCH_SIZE`] items; the per-batch responses are folded back
//! into one logical result so a large bulk operation looks atomic to the
//! caller.

use crate::resources::phone::BulkLookupResponse;
use serde_json::Value;
use std::collections::HashSet;

/// Maximum number of items submitted in one network request
pub const MAX_BATCH_SIZE: usize = 5000;

/// Split `items` into contiguous chunks of at most `size` elements.
///
/// The chunks partition the input exactly: concatenated in order they equal
/// the original sequence, every chunk except possibly the last has `size`
/// elements, and `chunks.len() == ceil(items.len() / size)`.
pub fn chunk<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    debug_assert!(size > 0, "chunk size must be positive");
    items.chunks(size).map(|c| c.to_vec()).collect()
}

/// Unwrap a single-element array into its inner object.
///
/// The upstream sometimes returns `[{...}]` where `{...}` is expected; each
/// partial result is normalized before typed deserialization.
pub fn normalize_partial(value: Value) -> Value {
    match value {
        Value::Array(mut items) if items.len() == 1 => items.remove(0),
        other => other,
    }
}

/// Merge per-batch bulk lookup responses into one logical response.
///
/// Scalar counters sum, list fields concatenate in batch order, and map
/// fields take a right-biased union. Keys are disjoint across batches by
/// construction, so the right bias only matters for malformed upstream data.
pub fn merge_bulk(parts: Vec<BulkLookupResponse>) -> BulkLookupResponse {
    let mut merged = BulkLookupResponse::default();
    for part in parts {
        merged.numbers += part.numbers;
        merged.matches += part.matches;
        merged.clean += part.clean;
        merged.suppressed.extend(part.suppressed);
        merged.codes.extend(part.codes);
    }
    merged
}

/// Merged outcome of an email bulk check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedEmailResult {
    /// Every address the upstream reported as good, in batch order
    pub good: Vec<String>,
    /// Every submitted address not reported good, in submission order
    pub bad: Vec<String>,
}

/// Derive the merged email result from per-batch `good` lists.
///
/// The upstream only ever reports the good side, so `bad` is computed as
/// the set difference of the submitted addresses minus the union of all
/// good addresses, compared case-insensitively. `good` is the plain
/// concatenation of the per-batch lists, not deduplicated.
pub fn merge_email(good_parts: Vec<Vec<String>>, submitted: &[String]) -> MergedEmailResult {
    let good: Vec<String> = good_parts.into_iter().flatten().collect();
    let good_set: HashSet<String> = good.iter().map(|g| g.to_lowercase()).collect();

    let bad = submitted
        .iter()
        .filter(|s| !good_set.contains(&s.to_lowercase()))
        .cloned()
        .collect();

    MergedEmailResult { good, bad }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::phone::SuppressedNumber;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_chunk_partitions_exactly() {
        let items: Vec<u32> = (0..12).collect();
        let chunks = chunk(&items, 5);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 5);
        assert_eq!(chunks[1].len(), 5);
        assert_eq!(chunks[2].len(), 2);

        let rejoined: Vec<u32> = chunks.into_iter().flatten().collect();
        assert_eq!(rejoined, items);
    }

    #[test]
    fn test_chunk_exact_multiple() {
        let items: Vec<u32> = (0..10).collect();
        let chunks = chunk(&items, 5);

        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.len() == 5));
    }

    #[test]
    fn test_chunk_single_partial_batch() {
        let items = vec!["a", "b", "c"];
        let chunks = chunk(&items, 5000);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], items);
    }

    #[test]
    fn test_chunk_count_matches_ceil() {
        for n in [1usize, 4999, 5000, 5001, 10000, 12000] {
            let items: Vec<usize> = (0..n).collect();
            let chunks = chunk(&items, MAX_BATCH_SIZE);
            assert_eq!(chunks.len(), n.div_ceil(MAX_BATCH_SIZE), "n = {n}");
        }
    }

    #[test]
    fn test_normalize_unwraps_single_element_array() {
        let wrapped = serde_json::json!([{"numbers": 2}]);
        assert_eq!(normalize_partial(wrapped), serde_json::json!({"numbers": 2}));

        let object = serde_json::json!({"numbers": 2});
        assert_eq!(normalize_partial(object.clone()), object);

        let multi = serde_json::json!([1, 2]);
        assert_eq!(normalize_partial(multi.clone()), multi);
    }

    fn bulk(numbers: u64, matches: u64, suppressed: Vec<(&str, &str)>) -> BulkLookupResponse {
        BulkLookupResponse {
            numbers,
            matches,
            clean: numbers - matches,
            suppressed: suppressed
                .iter()
                .map(|(phone, code)| SuppressedNumber {
                    phone: phone.to_string(),
                    code: code.to_string(),
                    reason: String::new(),
                })
                .collect(),
            codes: suppressed
                .iter()
                .map(|(phone, code)| (phone.to_string(), code.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_merge_bulk_sums_counters_and_concatenates() {
        let parts = vec![
            bulk(5000, 2, vec![("2223334444", "L"), ("5556667777", "C")]),
            bulk(5000, 1, vec![("8889990000", "L")]),
            bulk(2000, 0, vec![]),
        ];

        let merged = merge_bulk(parts);

        assert_eq!(merged.numbers, 12000);
        assert_eq!(merged.matches, 3);
        assert_eq!(merged.clean, 11997);
        assert_eq!(
            merged
                .suppressed
                .iter()
                .map(|s| s.phone.as_str())
                .collect::<Vec<_>>(),
            vec!["2223334444", "5556667777", "8889990000"]
        );
        assert_eq!(merged.codes.len(), 3);
        assert_eq!(merged.codes["8889990000"], "L");
    }

    #[test]
    fn test_merge_bulk_union_is_right_biased() {
        // Disjoint keys by construction; a duplicate key takes the later value
        let parts = vec![
            bulk(1, 1, vec![("2223334444", "L")]),
            bulk(1, 1, vec![("2223334444", "C")]),
        ];

        let merged = merge_bulk(parts);
        assert_eq!(merged.codes["2223334444"], "C");
    }

    #[test]
    fn test_merge_email_derives_bad() {
        let submitted = vec!["a@x.com".to_string(), "b@x.com".to_string()];
        let merged = merge_email(vec![vec!["a@x.com".to_string()]], &submitted);

        assert_eq!(merged.good, vec!["a@x.com"]);
        assert_eq!(merged.bad, vec!["b@x.com"]);
    }

    #[test]
    fn test_merge_email_case_insensitive() {
        let submitted = vec!["A@X.com".to_string(), "b@x.com".to_string()];
        let merged = merge_email(vec![vec!["a@x.COM".to_string()]], &submitted);

        assert_eq!(merged.good, vec!["a@x.COM"]);
        assert_eq!(merged.bad, vec!["b@x.com"]);
    }

    #[test]
    fn test_merge_email_across_batches() {
        let submitted: Vec<String> = ["a@x.com", "b@x.com", "c@x.com", "d@x.com"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let merged = merge_email(
            vec![vec!["a@x.com".to_string()], vec!["c@x.com".to_string()]],
            &submitted,
        );

        assert_eq!(merged.good, vec!["a@x.com", "c@x.com"]);
        assert_eq!(merged.bad, vec!["b@x.com", "d@x.com"]);
    }

    #[test]
    fn test_merge_email_no_overlap() {
        let submitted: Vec<String> = (0..50).map(|i| format!("u{i}@x.com")).collect();
        let good_half: Vec<String> = submitted.iter().take(25).cloned().collect();
        let merged = merge_email(vec![good_half], &submitted);

        let good_set: HashSet<_> = merged.good.iter().map(|g| g.to_lowercase()).collect();
        assert!(merged
            .bad
            .iter()
            .all(|b| !good_set.contains(&b.to_lowercase())));
        assert_eq!(merged.good.len() + merged.bad.len(), submitted.len());
    }
}
