//! Property-based tests for core harvesting behavior.
//!
//! These tests use proptest to generate arbitrary inputs and verify that
//! storage naming, extension handling, and walk accounting hold up across
//! a wide range of cases.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use cabwalk_core::config::normalize_extension;
use cabwalk_core::test_utils::FakeExpander;
use cabwalk_core::{ContentStore, FrontierWalker, HarvestConfig, UpdateEntry};
use chrono::NaiveDate;
use proptest::prelude::*;
use std::fs;
use tempfile::TempDir;

fn create_test_store() -> (TempDir, ContentStore) {
    let temp = TempDir::new().expect("failed to create temp dir");
    let store = ContentStore::new(temp.path().join("data"));
    (temp, store)
}

proptest! {
    /// Destination paths are a pure function of their inputs.
    #[test]
    fn prop_destination_is_deterministic(
        archive in "[a-z0-9_.-]{1,20}",
        payload in "[a-z0-9_-]{1,20}",
        extension in "[a-zA-Z0-9]{1,6}"
    ) {
        let (_temp, store) = create_test_store();
        let first = store.destination(&archive, &payload, &extension);
        let second = store.destination(&archive, &payload, &extension);
        prop_assert_eq!(&first, &second);

        let parent = store.root().join(normalize_extension(&extension));
        prop_assert_eq!(first.parent().unwrap(), &parent);
        prop_assert_eq!(
            first.file_name().unwrap().to_string_lossy(),
            format!("{archive}__{payload}")
        );
    }

    /// Normalizing an extension twice changes nothing.
    #[test]
    fn prop_normalize_extension_idempotent(raw in "\\.{0,3}[a-zA-Z0-9]{0,8}") {
        let once = normalize_extension(&raw);
        let twice = normalize_extension(&once);
        prop_assert_eq!(&once, &twice);
        prop_assert!(!once.starts_with('.'), "normalized form keeps no leading dot");
        prop_assert_eq!(once.clone(), once.to_ascii_lowercase());
    }

    /// The first deposit under a name wins; later ones are reported as
    /// duplicates and leave the stored bytes untouched.
    #[test]
    fn prop_first_deposit_wins(
        first in prop::collection::vec(any::<u8>(), 0..512),
        second in prop::collection::vec(any::<u8>(), 0..512)
    ) {
        let (temp, store) = create_test_store();
        store.ensure_layout(&["cpl".to_string()]).unwrap();

        let staged = temp.path().join("x.cpl");
        fs::write(&staged, &first).unwrap();
        let deposit = store.deposit(&staged, "root.msu", "cpl").unwrap();
        prop_assert!(deposit.is_stored());

        fs::write(&staged, &second).unwrap();
        let deposit = store.deposit(&staged, "root.msu", "cpl").unwrap();
        prop_assert!(!deposit.is_stored(), "second deposit must be a duplicate");

        let stored = fs::read(store.destination("root.msu", "x.cpl", "cpl")).unwrap();
        prop_assert_eq!(stored, first);
    }

    /// Every distinct payload across the cabinet frontier ends up stored
    /// exactly once.
    #[test]
    fn prop_distinct_payloads_all_stored(
        names in prop::collection::hash_set("[a-z]{3,10}", 1..6)
    ) {
        let temp = TempDir::new().unwrap();
        let cabinets: Vec<String> = names.iter().map(|n| format!("{n}.cab")).collect();
        let cabinet_refs: Vec<&str> = cabinets.iter().map(String::as_str).collect();

        let mut fake = FakeExpander::new().with_archive("root.msu", &cabinet_refs);
        for name in &names {
            fake = fake.with_archive(&format!("{name}.cab"), &[&format!("{name}.cpl")]);
        }

        let config = HarvestConfig {
            store_root: temp.path().join("data"),
            ..HarvestConfig::default()
        };
        let walker = FrontierWalker::new(fake, config);

        let root = temp.path().join("root.msu");
        fs::write(&root, b"msu").unwrap();
        let report = walker.process_archive(&root).unwrap();

        prop_assert_eq!(report.cabinets_processed, names.len());
        prop_assert_eq!(report.files_stored, names.len());
        prop_assert_eq!(report.duplicates_skipped, 0);
        for name in &names {
            let stored = temp
                .path()
                .join("data")
                .join("cpl")
                .join(format!("root.msu__{name}.cpl"));
            prop_assert!(stored.is_file(), "missing payload for {}", name);
        }
    }

    /// The staleness check agrees with plain day arithmetic.
    #[test]
    fn prop_staleness_matches_day_arithmetic(
        days_back in 0i64..400,
        window in 0i64..400
    ) {
        let today = NaiveDate::from_ymd_opt(2020, 10, 1).unwrap();
        let release = today - chrono::Duration::days(days_back);
        let entry = UpdateEntry::new(release);
        prop_assert_eq!(entry.released_within(window, today), days_back < window);
    }
}
