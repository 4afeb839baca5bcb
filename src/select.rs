//! Pure selection operations over an Entry collection.
//!
//! Each operation consumes the collection and returns a new one with only
//! `selected` flags changed; nothing here touches the filesystem.

use crate::entry::Entry;

/// Select every entry at or above the size threshold (inclusive).
///
/// Entries below the threshold keep their current selection. Favorites
/// are never auto-selected.
pub fn select_by_size(entries: Vec<Entry>, min_bytes: u64) -> Vec<Entry> {
    entries
        .into_iter()
        .map(|mut entry| {
            if !entry.is_favorite && entry.size_bytes() >= min_bytes {
                entry.selected = true;
            }
            entry
        })
        .collect()
}

/// Select every entry whose age in whole days is at least `min_days`.
///
/// Age is floor-divided from the last-modified timestamp; entries with no
/// timestamp are left alone. Favorites are never auto-selected.
pub fn select_by_age(entries: Vec<Entry>, min_days: i64) -> Vec<Entry> {
    entries
        .into_iter()
        .map(|mut entry| {
            if !entry.is_favorite && entry.age_days().map(|d| d >= min_days).unwrap_or(false) {
                entry.selected = true;
            }
            entry
        })
        .collect()
}

/// Set every entry's selection to `value`.
pub fn select_all(entries: Vec<Entry>, value: bool) -> Vec<Entry> {
    entries
        .into_iter()
        .map(|mut entry| {
            entry.selected = value;
            entry
        })
        .collect()
}

/// Flip every entry's selection.
pub fn invert_selection(entries: Vec<Entry>) -> Vec<Entry> {
    entries
        .into_iter()
        .map(|mut entry| {
            entry.selected = !entry.selected;
            entry
        })
        .collect()
}

/// Flip exactly one entry's selection. An out-of-range index is a no-op.
pub fn toggle_one(mut entries: Vec<Entry>, index: usize) -> Vec<Entry> {
    if let Some(entry) = entries.get_mut(index) {
        entry.selected = !entry.selected;
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::SizeState;
    use chrono::{Duration, Utc};
    use std::path::PathBuf;

    fn entry(name: &str, bytes: u64, age_days: i64) -> Entry {
        Entry {
            path: PathBuf::from(format!("/work/{}/node_modules", name)),
            project_path: PathBuf::from(format!("/work/{}", name)),
            project_name: name.to_string(),
            project_version: None,
            repo_root: PathBuf::from(format!("/work/{}", name)),
            size: SizeState::Resolved {
                bytes,
                package_count: 1,
                total_package_count: 1,
                accelerated: false,
            },
            last_modified: Some(Utc::now() - Duration::days(age_days)),
            selected: false,
            is_favorite: false,
        }
    }

    fn selected_names(entries: &[Entry]) -> Vec<&str> {
        entries
            .iter()
            .filter(|e| e.selected)
            .map(|e| e.project_name.as_str())
            .collect()
    }

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn test_select_by_size_threshold_is_inclusive() {
        let entries = vec![
            entry("a", 100 * MIB, 1),
            entry("b", 500 * MIB, 1),
            entry("c", 1000 * MIB, 1),
        ];
        let entries = select_by_size(entries, 500 * MIB);
        assert_eq!(selected_names(&entries), vec!["b", "c"]);
    }

    #[test]
    fn test_select_by_size_keeps_existing_selection() {
        let mut entries = vec![entry("small", 10, 1), entry("big", 1000, 1)];
        entries[0].selected = true;
        let entries = select_by_size(entries, 500);
        assert_eq!(selected_names(&entries), vec!["small", "big"]);
    }

    #[test]
    fn test_select_by_size_skips_favorites() {
        let mut entries = vec![entry("fav", 1000 * MIB, 1), entry("other", 1000 * MIB, 1)];
        entries[0].is_favorite = true;
        let entries = select_by_size(entries, 1);
        assert_eq!(selected_names(&entries), vec!["other"]);
    }

    #[test]
    fn test_select_by_age() {
        let entries = vec![entry("new", 10, 2), entry("old", 10, 45), entry("edge", 10, 30)];
        let entries = select_by_age(entries, 30);
        assert_eq!(selected_names(&entries), vec!["old", "edge"]);
    }

    #[test]
    fn test_select_all_is_idempotent() {
        let entries = select_all(vec![entry("a", 1, 1), entry("b", 2, 2)], true);
        let again = select_all(entries.clone(), true);
        let flags: Vec<bool> = entries.iter().map(|e| e.selected).collect();
        let flags_again: Vec<bool> = again.iter().map(|e| e.selected).collect();
        assert_eq!(flags, vec![true, true]);
        assert_eq!(flags, flags_again);
    }

    #[test]
    fn test_invert_selection_round_trips() {
        let mut entries = vec![entry("a", 1, 1), entry("b", 2, 2), entry("c", 3, 3)];
        entries[1].selected = true;
        let original: Vec<bool> = entries.iter().map(|e| e.selected).collect();

        let inverted = invert_selection(entries);
        assert_eq!(
            inverted.iter().map(|e| e.selected).collect::<Vec<_>>(),
            vec![true, false, true]
        );

        let back = invert_selection(inverted);
        assert_eq!(back.iter().map(|e| e.selected).collect::<Vec<_>>(), original);
    }

    #[test]
    fn test_toggle_one() {
        let entries = toggle_one(vec![entry("a", 1, 1), entry("b", 2, 2)], 1);
        assert_eq!(selected_names(&entries), vec!["b"]);
        let entries = toggle_one(entries, 1);
        assert!(selected_names(&entries).is_empty());
    }

    #[test]
    fn test_toggle_one_out_of_range_is_noop() {
        let entries = toggle_one(vec![entry("a", 1, 1)], 5);
        assert!(selected_names(&entries).is_empty());
    }
}
