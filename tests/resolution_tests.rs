//! Baseline SBOM resolution against the fixture baseline directory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use inventory_enrich::model::{Asset, AssetCategory, BaselineIndex, Criticality};
use inventory_enrich::parsers::normalize;
use inventory_enrich::sbom::{BaselineSource, FileBaselineSource};
use inventory_enrich::{BaselineCatalog, Result, SbomResolver, SbomStatus};
use serde_json::Value;

const BASELINE_DIR: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/baseline-sboms"
);

/// Directory-backed source that counts payload fetches.
struct CountingPayloads {
    inner: FileBaselineSource,
    payloads: Arc<AtomicUsize>,
}

#[async_trait]
impl BaselineSource for CountingPayloads {
    async fn fetch_index(&self) -> Result<BaselineIndex> {
        self.inner.fetch_index().await
    }

    async fn fetch_payload(&self, path: &str) -> Result<Value> {
        self.payloads.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_payload(path).await
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }
}

fn resolver() -> (SbomResolver, Arc<AtomicUsize>) {
    let payloads = Arc::new(AtomicUsize::new(0));
    let source = CountingPayloads {
        inner: FileBaselineSource::new(BASELINE_DIR),
        payloads: Arc::clone(&payloads),
    };
    (
        SbomResolver::new(Arc::new(BaselineCatalog::new(source))),
        payloads,
    )
}

#[tokio::test]
async fn test_resolving_twice_fetches_once() {
    let (resolver, payloads) = resolver();
    let baselines = resolver.catalog().load_index().await;
    let mut asset = Asset::new("a1", "react", AssetCategory::Software, Criticality::Medium);

    let first = resolver.resolve(&asset, &baselines.baseline_sboms).await;
    assert_eq!(first.status, SbomStatus::AutoGenerated);
    assert_eq!(payloads.load(Ordering::SeqCst), 1);

    asset.sbom_data = first.sbom_data;
    let second = resolver.resolve(&asset, &baselines.baseline_sboms).await;
    assert_eq!(second.status, SbomStatus::AlreadyExists);
    assert!(second.sbom_data.is_none());
    assert_eq!(payloads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_ecosystem_fallback_uses_purl_type() {
    let (resolver, _) = resolver();
    let asset = Asset::new("a2", "Inventory Service", AssetCategory::Software, Criticality::Low)
        .with_tag("python");

    let results = resolver.resolve_inventory(&[asset]).await;
    assert_eq!(results.len(), 1);
    let resolution = &results[0];
    assert_eq!(resolution.status, SbomStatus::AutoGenerated);
    assert_eq!(
        resolution.baseline_match.as_ref().map(|b| b.id.as_str()),
        Some("baseline-flask-3")
    );
    assert_eq!(resolution.component_count, Some(3));

    let sbom = resolution.sbom_data.as_ref().unwrap();
    assert_eq!(sbom["assetReference"]["assetId"], "a2");
    assert_eq!(sbom["assetReference"]["baselineSource"], "flask");
    assert_eq!(normalize(sbom).len(), 3);
}

#[tokio::test]
async fn test_unmatched_and_non_software_assets() {
    let (resolver, payloads) = resolver();
    let assets = vec![
        Asset::new("a3", "Billing Portal", AssetCategory::Application, Criticality::High),
        Asset::new("a4", "Core Switch", AssetCategory::Network, Criticality::High),
    ];

    let results = resolver.resolve_inventory(&assets).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].asset_id, "a3");
    assert_eq!(results[0].status, SbomStatus::UploadRequired);
    assert_eq!(payloads.load(Ordering::SeqCst), 0);

    let baselines = resolver.catalog().load_index().await;
    let single = resolver.resolve(&assets[1], &baselines.baseline_sboms).await;
    assert_eq!(single.status, SbomStatus::NotSoftware);
}
