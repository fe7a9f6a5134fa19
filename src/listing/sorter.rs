use std::cmp::Ordering;

use super::{DirectoryEntry, SortKey};

/// Order `entries` by `key`, then move directories ahead of files.
///
/// Both passes are stable. `reversed` swaps the comparator's operands.
pub fn sort_entries(entries: &mut [DirectoryEntry], key: SortKey, reversed: bool) {
    entries.sort_by(|a, b| {
        let (a, b) = if reversed { (b, a) } else { (a, b) };
        compare(a, b, key)
    });

    entries.sort_by_key(|entry| !entry.is_dir);
}

fn compare(a: &DirectoryEntry, b: &DirectoryEntry, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => compare_ignore_ascii_case(&a.name, &b.name),
        SortKey::Size => a.size_bytes.cmp(&b.size_bytes),
        SortKey::Date => a.modified_at.cmp(&b.modified_at),
    }
}

fn compare_ignore_ascii_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn at(secs: u64) -> std::time::SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn names(entries: &[DirectoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    fn sample() -> Vec<DirectoryEntry> {
        vec![
            DirectoryEntry::file("dwarf.txt", 2048, at(300)),
            DirectoryEntry::dir("Apple", at(100)),
            DirectoryEntry::file("banana.txt", 10, at(200)),
        ]
    }

    #[test]
    fn name_is_case_insensitive() {
        let mut entries = vec![
            DirectoryEntry::file("b", 0, at(0)),
            DirectoryEntry::file("A", 0, at(0)),
            DirectoryEntry::file("C", 0, at(0)),
        ];
        sort_entries(&mut entries, SortKey::Name, false);
        assert_eq!(names(&entries), vec!["A", "b", "C"]);

        sort_entries(&mut entries, SortKey::Name, true);
        assert_eq!(names(&entries), vec!["C", "b", "A"]);
    }

    #[test]
    fn directories_always_come_first() {
        for key in [SortKey::Name, SortKey::Size, SortKey::Date] {
            for reversed in [false, true] {
                let mut entries = sample();
                sort_entries(&mut entries, key, reversed);
                assert!(entries[0].is_dir, "{key} reversed={reversed}");
                assert!(entries[1..].iter().all(|e| !e.is_dir));
            }
        }
    }

    #[test]
    fn date_orders_by_modification_time() {
        let mut entries = sample();
        sort_entries(&mut entries, SortKey::Date, false);
        assert_eq!(names(&entries), vec!["Apple", "banana.txt", "dwarf.txt"]);

        sort_entries(&mut entries, SortKey::Date, true);
        assert_eq!(names(&entries), vec!["Apple", "dwarf.txt", "banana.txt"]);
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let input = vec![
            DirectoryEntry::file("x", 5, at(7)),
            DirectoryEntry::dir("d2", at(7)),
            DirectoryEntry::file("X", 5, at(7)),
            DirectoryEntry::dir("D2", at(7)),
            DirectoryEntry::file("y", 5, at(7)),
        ];

        for key in [SortKey::Size, SortKey::Date] {
            for reversed in [false, true] {
                let mut entries = input.clone();
                sort_entries(&mut entries, key, reversed);
                assert_eq!(names(&entries), vec!["d2", "D2", "x", "X", "y"]);
            }
        }

        for reversed in [false, true] {
            let mut entries = input.clone();
            sort_entries(&mut entries, SortKey::Name, reversed);
            let expected = if reversed {
                vec!["d2", "D2", "y", "x", "X"]
            } else {
                vec!["d2", "D2", "x", "X", "y"]
            };
            assert_eq!(names(&entries), expected);
        }
    }
}
