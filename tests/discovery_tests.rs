//! Data-record to asset discovery over generated inventories.

use std::collections::HashSet;

use inventory_enrich::config::DiscoveryConfig;
use inventory_enrich::discovery::MatchReason;
use inventory_enrich::model::{Asset, AssetCategory, ConfidenceTier, Criticality, DataRecord};
use inventory_enrich::AssetDiscoveryMatcher;
use proptest::prelude::*;

const LOCATIONS: &[&str] = &["", "eu-west-1", "EU-WEST-1 rack 2", "AWS S3", "file share"];
const OWNERS: &[&str] = &["", "IT", "it", "Finance"];

fn category() -> impl Strategy<Value = AssetCategory> {
    prop_oneof![
        Just(AssetCategory::Server),
        Just(AssetCategory::Database),
        Just(AssetCategory::Application),
        Just(AssetCategory::Filesystem),
        Just(AssetCategory::Network),
    ]
}

fn assets() -> impl Strategy<Value = Vec<Asset>> {
    prop::collection::vec(
        (
            category(),
            0..LOCATIONS.len(),
            0..OWNERS.len(),
            any::<bool>(),
        ),
        0..6,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (cat, loc, owner, critical))| {
                let crit = if critical { Criticality::High } else { Criticality::Low };
                Asset::new(format!("a{i}"), format!("Asset {i}"), cat, crit)
                    .with_location(LOCATIONS[loc])
                    .with_owner(OWNERS[owner])
            })
            .collect()
    })
}

fn records() -> impl Strategy<Value = Vec<DataRecord>> {
    prop::collection::vec((0..LOCATIONS.len(), 0..OWNERS.len()), 1..5).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (loc, owner))| {
                DataRecord::new(format!("d{i}"), format!("Record {i}"))
                    .with_location(LOCATIONS[loc])
                    .with_owner(OWNERS[owner])
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn discovery_is_deterministic(existing in assets(), records in records()) {
        let matcher = AssetDiscoveryMatcher::new();
        let first = matcher.discover(&records, &existing);
        let second = matcher.discover(&records, &existing);

        prop_assert_eq!(first.confidence, second.confidence);
        prop_assert_eq!(first.suggested_mappings(), second.suggested_mappings());
        let ids = |r: &inventory_enrich::DiscoveryResult| {
            r.discovered_assets.iter().map(|a| a.id.clone()).collect::<Vec<_>>()
        };
        prop_assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn every_record_gets_distinct_candidates(existing in assets(), records in records()) {
        let result = AssetDiscoveryMatcher::new().discover(&records, &existing);
        prop_assert_eq!(result.mappings.len(), records.len());

        let known: HashSet<&str> = existing.iter().map(|a| a.id.as_str()).collect();
        for mapping in result.mappings.values() {
            prop_assert!(!mapping.candidates.is_empty());
            let ids: Vec<&str> = mapping.asset_ids().collect();
            let unique: HashSet<&str> = ids.iter().copied().collect();
            prop_assert_eq!(unique.len(), ids.len());

            match mapping.synthesized {
                Some(ref asset) => {
                    prop_assert_eq!(ids, vec![asset.id.as_str()]);
                    prop_assert_eq!(mapping.candidates[0].reason, MatchReason::Synthesized);
                }
                None => {
                    prop_assert!(ids.iter().all(|id| known.contains(id)));
                }
            }
        }
    }
}

#[test]
fn test_location_and_owner_outrank_location_only() {
    let existing = vec![
        Asset::new("loc", "Reports", AssetCategory::Server, Criticality::Low)
            .with_location("eu-west-1"),
        Asset::new("both", "Orders", AssetCategory::Server, Criticality::Low)
            .with_location("EU-WEST-1 rack 2")
            .with_owner("finance"),
    ];
    let record = DataRecord::new("d1", "Invoices")
        .with_location("eu-west-1")
        .with_owner("Finance");

    let result = AssetDiscoveryMatcher::new().discover(&[record], &existing);
    let mapping = result.mapping("d1").unwrap();
    let reasons: Vec<MatchReason> = mapping.candidates.iter().map(|c| c.reason).collect();
    assert_eq!(reasons, vec![MatchReason::LocationAndOwner, MatchReason::Location]);
    assert_eq!(mapping.asset_ids().collect::<Vec<_>>(), vec!["both", "loc"]);
    // Two low-criticality matches still count as strong
    assert!(mapping.high_confidence);
    assert_eq!(result.confidence, ConfidenceTier::High);
}

#[test]
fn test_category_matching_can_be_disabled() {
    let existing = vec![Asset::new("db", "Warehouse", AssetCategory::Database, Criticality::Low)];
    let record = DataRecord::new("d1", "Telemetry").with_location("Auth Service");

    let defaults = AssetDiscoveryMatcher::new().discover(&[record.clone()], &existing);
    assert_eq!(
        defaults.mapping("d1").unwrap().candidates[0].reason,
        MatchReason::Category
    );

    let config = DiscoveryConfig {
        match_categories: Vec::new(),
        ..DiscoveryConfig::default()
    };
    let strict = AssetDiscoveryMatcher::with_config(config).discover(&[record], &existing);
    let synthesized = strict.discovered_assets.first().unwrap();
    assert_eq!(synthesized.id, "asset-discovered-d1");
    assert_eq!(synthesized.category, AssetCategory::Application);
    // Internal record, medium criticality, single asset: weak
    assert_eq!(strict.confidence, ConfidenceTier::Low);
}
