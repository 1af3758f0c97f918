//! Ingredient merging: the reconciliation step of the pipeline.
//!
//! Every ingredient list that leaves this module satisfies the output
//! invariants: lowercase, whitespace-trimmed, no empties, no duplicates,
//! lexicographically sorted. A `BTreeSet` gives dedup + ordering in one pass.

use std::collections::BTreeSet;

/// Normalise one ingredient list: lowercase, trim, drop empties,
/// deduplicate, sort.
pub fn normalize_list(items: &[String]) -> Vec<String> {
    merge(&[items])
}

/// Merge several ingredient lists into one deduplicated, sorted union.
pub fn merge(sources: &[&[String]]) -> Vec<String> {
    let mut set = BTreeSet::new();
    for source in sources {
        for item in source.iter() {
            let cleaned = item.trim().to_lowercase();
            if !cleaned.is_empty() {
                set.insert(cleaned);
            }
        }
    }
    set.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn merge_dedupes_case_insensitively() {
        let a = v(&["Garlic", "olive oil"]);
        let b = v(&["garlic", "  Olive Oil ", "basil"]);
        assert_eq!(merge(&[&a, &b]), v(&["basil", "garlic", "olive oil"]));
    }

    #[test]
    fn merge_drops_empty_and_whitespace_entries() {
        let a = v(&["", "  ", "salt"]);
        assert_eq!(merge(&[&a]), v(&["salt"]));
    }

    #[test]
    fn merge_output_is_sorted() {
        let a = v(&["zucchini", "anchovy", "mozzarella"]);
        let merged = merge(&[&a]);
        let mut sorted = merged.clone();
        sorted.sort();
        assert_eq!(merged, sorted);
    }

    #[test]
    fn merge_of_three_sources() {
        let verified = v(&["chicken", "rice"]);
        let mentioned = v(&["Rice", "naan"]);
        let suggested = v(&["garam masala", "chicken"]);
        assert_eq!(
            merge(&[&verified, &mentioned, &suggested]),
            v(&["chicken", "garam masala", "naan", "rice"])
        );
    }

    #[test]
    fn normalize_list_lowercases_and_sorts() {
        assert_eq!(
            normalize_list(&v(&["Basmati Rice", " cumin", "Basmati rice"])),
            v(&["basmati rice", "cumin"])
        );
    }
}
