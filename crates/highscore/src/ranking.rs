use crate::{Entry, MAX_NAME_LEN};
use net_tetris_types::ANONYMOUS_NAME;

/// Trim, default blank names, and cap the length at [`MAX_NAME_LEN`] characters
pub fn normalize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ANONYMOUS_NAME.to_string();
    }
    trimmed.chars().take(MAX_NAME_LEN).collect()
}

/// Insert `entry`, keep the list sorted by score descending and cut it to
/// `keep` entries. Ties keep their existing order, so a new entry ranks
/// below older entries with the same score.
pub fn insert_ranked(list: &mut Vec<Entry>, entry: Entry, keep: usize) {
    list.push(entry);
    // sort_by is stable
    list.sort_by(|a, b| b.score.cmp(&a.score));
    list.truncate(keep);
}

/// True if `list` has fewer than `keep` entries or `score` beats the
/// `keep`-th one. `list` must be ranked best first.
pub fn qualifies(list: &[Entry], score: u32, keep: usize) -> bool {
    if keep == 0 {
        return false;
    }
    match list.get(keep - 1) {
        None => true,
        Some(last) => score > last.score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn entry(name: &str, score: u32) -> Entry {
        Entry {
            name: name.to_string(),
            score,
            when: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_ranked_descending() {
        let mut list = Vec::new();
        for (name, score) in [("a", 50), ("b", 90), ("c", 10)] {
            insert_ranked(&mut list, entry(name, score), 10);
        }
        let scores: Vec<u32> = list.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![90, 50, 10]);
    }

    #[test]
    fn test_ties_keep_arrival_order() {
        let mut list = Vec::new();
        insert_ranked(&mut list, entry("first", 70), 10);
        insert_ranked(&mut list, entry("second", 70), 10);
        assert_eq!(list[0].name, "first");
        assert_eq!(list[1].name, "second");
    }

    #[test]
    fn test_truncates_to_keep() {
        let mut list = Vec::new();
        for score in 0..15 {
            insert_ranked(&mut list, entry("p", score * 10), 10);
        }
        assert_eq!(list.len(), 10);
        assert_eq!(list[0].score, 140);
        assert_eq!(list[9].score, 50);
    }

    #[test]
    fn test_qualifies() {
        let short: Vec<Entry> = (0..3).map(|i| entry("p", 100 - i)).collect();
        assert!(qualifies(&short, 0, 10));

        let full: Vec<Entry> = (0..10).map(|i| entry("p", 1000 - i * 100)).collect();
        // Tenth entry scores 100.
        assert!(!qualifies(&full, 100, 10));
        assert!(qualifies(&full, 101, 10));
        assert!(!qualifies(&full, 5, 0));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Ada  "), "Ada");
        assert_eq!(normalize_name("   "), "Anonymous");
        assert_eq!(normalize_name(""), "Anonymous");
        let long = "x".repeat(40);
        assert_eq!(normalize_name(&long).len(), 20);
        // Counted in characters, not bytes.
        let wide = "é".repeat(25);
        assert_eq!(normalize_name(&wide).chars().count(), 20);
    }
}
