//! End-to-end enrichment over the inventory fixtures.

use std::path::{Path, PathBuf};

use inventory_enrich::cli::{self, EnrichOptions};
use inventory_enrich::config::{AppConfig, OutputFormat};
use inventory_enrich::discovery::MatchReason;
use inventory_enrich::model::{Asset, ClassificationLevel, ConfidenceTier, DataRecord};
use inventory_enrich::{EnrichmentOrchestrator, SbomStatus};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture(name: &str) -> PathBuf {
    Path::new(FIXTURES_DIR).join(name)
}

fn inventory() -> (Vec<Asset>, Vec<DataRecord>) {
    let assets = cli::load_items(&fixture("assets.json"), "asset").expect("assets fixture");
    let records = cli::load_items(&fixture("records.json"), "data record").expect("records fixture");
    (assets, records)
}

fn orchestrator() -> EnrichmentOrchestrator {
    let config = AppConfig::builder()
        .baseline_directory(fixture("baseline-sboms"))
        .build();
    EnrichmentOrchestrator::from_config(&config).expect("orchestrator")
}

#[tokio::test]
async fn test_data_to_assets_maps_records() {
    let (assets, records) = inventory();
    let result = orchestrator().data_to_assets(&records, &assets).await;

    // The id-less asset row is skipped, not fatal
    assert!(result.success, "errors: {:?}", result.errors);
    assert_eq!(result.warnings.len(), 1);

    let discovery = result.discovery.as_ref().expect("discovery ran");
    assert_eq!(discovery.mappings.len(), 3);
    assert!(discovery.discovered_assets.is_empty());
    assert_eq!(discovery.confidence, ConfidenceTier::High);

    let customers = discovery.mapping("rec-customers").unwrap();
    let reasons: Vec<(&str, MatchReason)> = customers
        .candidates
        .iter()
        .map(|c| (c.asset_id.as_str(), c.reason))
        .collect();
    assert_eq!(
        reasons,
        vec![
            ("asset-portal", MatchReason::LocationAndOwner),
            ("asset-orders-db", MatchReason::Location),
        ]
    );

    // Nothing shares the archive's location, so only category candidates remain
    let archive = discovery.mapping("rec-archive").unwrap();
    assert!(archive
        .candidates
        .iter()
        .all(|c| c.reason == MatchReason::Category));
    assert_eq!(
        archive.asset_ids().collect::<Vec<_>>(),
        vec!["asset-portal", "asset-orders-db"]
    );
}

#[tokio::test]
async fn test_assets_to_data_classifies_and_resolves() {
    let (assets, records) = inventory();
    let result = orchestrator().assets_to_data(&assets, &records).await;
    assert!(result.success);

    let classification = result.classification.as_ref().unwrap();
    assert_eq!(classification.items_classified, 2);
    assert_eq!(classification.items_unclassified, 1);
    assert_eq!(
        classification.get("rec-customers").unwrap().suggested_classification,
        ClassificationLevel::Restricted
    );
    let orders = classification.get("rec-orders").unwrap();
    assert_eq!(orders.suggested_classification, ClassificationLevel::Confidential);
    assert_eq!(orders.based_on_assets, vec!["asset-orders-db"]);

    let sbom = result.sbom_results.as_ref().unwrap();
    let statuses: Vec<(&str, SbomStatus)> = sbom
        .iter()
        .map(|r| (r.asset_id.as_str(), r.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("asset-portal", SbomStatus::UploadRequired),
            ("asset-react", SbomStatus::AutoGenerated),
            ("asset-legacy", SbomStatus::AlreadyExists),
        ]
    );

    let react = &sbom[1];
    assert_eq!(react.component_count, Some(3));
    assert_eq!(
        react.baseline_match.as_ref().map(|b| b.id.as_str()),
        Some("baseline-react-18")
    );
    let document = react.sbom_data.as_ref().unwrap();
    assert_eq!(document["metadata"]["component"]["version"], "18.2.0");
    assert_eq!(document["assetReference"]["assetId"], "asset-react");
}

#[tokio::test]
async fn test_bidirectional_shares_index_load() {
    let (assets, records) = inventory();
    let orchestrator = orchestrator();
    let result = orchestrator.run_bidirectional(&records, &assets).await;

    assert!(result.success());
    assert!(orchestrator.resolver().catalog().is_loaded());
    assert_eq!(
        result.data_to_assets.sbom_status_counts(),
        result.assets_to_data.sbom_status_counts()
    );
}

#[tokio::test]
async fn test_missing_baseline_directory_degrades() {
    let (assets, records) = inventory();
    let config = AppConfig::builder()
        .baseline_directory(fixture("no-such-dir"))
        .build();
    let result = EnrichmentOrchestrator::from_config(&config)
        .unwrap()
        .assets_to_data(&assets, &records)
        .await;

    assert!(result.success);
    let sbom = result.sbom_results.unwrap();
    assert!(sbom
        .iter()
        .all(|r| r.status != SbomStatus::AutoGenerated));
}

#[tokio::test]
async fn test_cli_enrich_summary_output() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("summary.txt");
    let config = AppConfig::builder()
        .baseline_directory(fixture("baseline-sboms"))
        .output_format(OutputFormat::Summary)
        .build();
    let options = EnrichOptions {
        assets: Some(fixture("assets.json")),
        records: Some(fixture("records.json")),
        direction: None,
        output_file: Some(out.clone()),
        quiet: true,
    };

    let success = cli::run_enrich(options, &config).await.unwrap();
    assert!(success);

    let text = std::fs::read_to_string(out).unwrap();
    assert!(text.contains("Enrichment data-to-assets [ok]"));
    assert!(text.contains("Enrichment assets-to-data [ok]"));
    assert!(text.contains("SBOM: upload-required 1, auto-generated 1, already-exists 1"));
}
