//! Cached access to the baseline index.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::OnceCell;

use super::source::{BaselineSource, StaticBaselineSource};
use crate::error::{ErrorContext, Result};
use crate::model::{
    BaselineIndex, BaselineSbom, BusinessApplication, ComponentUsage, ComponentUsageRank,
};

/// The baseline index, loaded at most once and shared by all callers.
///
/// Concurrent first callers wait on the same in-flight load. A load that
/// fails is not cached, so the next caller tries again; a missing index is
/// cached as an empty one.
pub struct BaselineCatalog {
    source: Box<dyn BaselineSource>,
    index: OnceCell<Arc<BaselineIndex>>,
}

impl std::fmt::Debug for BaselineCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaselineCatalog")
            .field("source", &self.source.describe())
            .field("loaded", &self.index.initialized())
            .finish()
    }
}

impl Default for BaselineCatalog {
    /// A catalog with no baselines.
    fn default() -> Self {
        Self::new(StaticBaselineSource::empty())
    }
}

impl BaselineCatalog {
    pub fn new(source: impl BaselineSource + 'static) -> Self {
        Self::from_boxed(Box::new(source))
    }

    #[must_use]
    pub fn from_boxed(source: Box<dyn BaselineSource>) -> Self {
        Self {
            source,
            index: OnceCell::new(),
        }
    }

    /// A catalog around an already-loaded index.
    #[must_use]
    pub fn with_index(index: BaselineIndex) -> Self {
        Self::new(StaticBaselineSource::new(index))
    }

    #[must_use]
    pub fn source(&self) -> &dyn BaselineSource {
        self.source.as_ref()
    }

    /// Whether the index has been loaded and cached.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.index.initialized()
    }

    /// Load the index, reporting transport and parse failures.
    pub async fn try_load_index(&self) -> Result<Arc<BaselineIndex>> {
        let index = self
            .index
            .get_or_try_init(|| async {
                match self.source.fetch_index().await {
                    Ok(index) => {
                        tracing::info!(
                            "Loaded {} baseline SBOMs from {}",
                            index.baseline_sboms.len(),
                            self.source.describe()
                        );
                        Ok(Arc::new(index))
                    }
                    Err(e) if e.is_not_found() => {
                        tracing::warn!(
                            "Baseline SBOM index not available at {}, using empty index",
                            self.source.describe()
                        );
                        Ok(Arc::new(BaselineIndex::empty("Empty baseline index")))
                    }
                    Err(e) => Err(e),
                }
            })
            .await
            .with_context(|| format!("loading baseline index from {}", self.source.describe()))?;
        Ok(Arc::clone(index))
    }

    /// Load the index, degrading to an empty one on failure.
    pub async fn load_index(&self) -> Arc<BaselineIndex> {
        match self.try_load_index().await {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!("Error loading baseline SBOM index: {e}");
                Arc::new(BaselineIndex::empty("Empty baseline index (error)"))
            }
        }
    }

    /// Forget the cached index so the next call reloads it.
    pub fn clear_cache(&mut self) {
        self.index.take();
    }

    /// Fetch a baseline's raw SBOM payload. Payloads are not cached.
    pub async fn fetch_payload(&self, baseline: &BaselineSbom) -> Result<Value> {
        self.source
            .fetch_payload(&baseline.path)
            .await
            .with_context(|| format!("loading baseline SBOM '{}'", baseline.name))
    }

    pub async fn all_baselines(&self) -> Vec<BaselineSbom> {
        self.load_index().await.baseline_sboms.clone()
    }

    pub async fn by_ecosystem(&self, ecosystem: &str) -> Vec<BaselineSbom> {
        self.filter_baselines(|b| {
            b.effective_ecosystem()
                .is_some_and(|e| e.eq_ignore_ascii_case(ecosystem))
        })
        .await
    }

    pub async fn by_category(&self, category: &str) -> Vec<BaselineSbom> {
        self.filter_baselines(|b| {
            b.category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category))
        })
        .await
    }

    /// Case-insensitive search over name and description.
    pub async fn search(&self, query: &str) -> Vec<BaselineSbom> {
        let query = query.to_lowercase();
        self.filter_baselines(|b| {
            b.name.to_lowercase().contains(&query)
                || b.description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&query))
        })
        .await
    }

    pub async fn by_id(&self, id: &str) -> Option<BaselineSbom> {
        self.load_index()
            .await
            .baseline_sboms
            .iter()
            .find(|b| b.id == id)
            .cloned()
    }

    /// Ecosystem keys declared by the index.
    pub async fn ecosystems(&self) -> Vec<String> {
        self.load_index().await.ecosystems.keys().cloned().collect()
    }

    /// Category keys declared by the index.
    pub async fn categories(&self) -> Vec<String> {
        self.load_index().await.categories.keys().cloned().collect()
    }

    pub async fn business_applications(&self) -> Vec<BusinessApplication> {
        self.load_index().await.business_applications.clone()
    }

    pub async fn business_app_by_id(&self, id: &str) -> Option<BusinessApplication> {
        self.load_index()
            .await
            .business_applications
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    pub async fn business_apps_by_category(&self, category: &str) -> Vec<BusinessApplication> {
        self.filter_apps(|a| a.category == category).await
    }

    pub async fn business_apps_by_industry(&self, industry: &str) -> Vec<BusinessApplication> {
        self.filter_apps(|a| a.industry.iter().any(|i| i == industry))
            .await
    }

    pub async fn search_business_apps(&self, query: &str) -> Vec<BusinessApplication> {
        self.filter_apps(|a| a.matches_query(query)).await
    }

    /// Applications that use the given component, per the dependency mappings.
    pub async fn apps_using_component(&self, component_id: &str) -> Vec<ComponentUsage> {
        self.load_index()
            .await
            .dependency_mappings
            .by_component
            .get(component_id)
            .map(|m| m.used_by.clone())
            .unwrap_or_default()
    }

    /// Direct then transitive dependencies of an application.
    pub async fn component_dependencies(&self, app_id: &str) -> Vec<String> {
        self.load_index()
            .await
            .dependency_mappings
            .by_application
            .get(app_id)
            .map(|m| {
                m.direct_dependencies
                    .iter()
                    .chain(&m.transitive_dependencies)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Components ranked by usage count, highest first.
    pub async fn top_components_by_usage(&self, limit: usize) -> Vec<ComponentUsageRank> {
        let index = self.load_index().await;
        let mut ranked: Vec<ComponentUsageRank> = index
            .dependency_mappings
            .by_component
            .iter()
            .map(|(id, m)| ComponentUsageRank {
                component_id: id.clone(),
                usage_count: m.usage_count,
                heat_map_score: m.heat_map_score,
            })
            .collect();
        ranked.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));
        ranked.truncate(limit);
        ranked
    }

    async fn filter_baselines<F>(&self, keep: F) -> Vec<BaselineSbom>
    where
        F: Fn(&BaselineSbom) -> bool,
    {
        self.load_index()
            .await
            .baseline_sboms
            .iter()
            .filter(|b| keep(b))
            .cloned()
            .collect()
    }

    async fn filter_apps<F>(&self, keep: F) -> Vec<BusinessApplication>
    where
        F: Fn(&BusinessApplication) -> bool,
    {
        self.load_index()
            .await
            .business_applications
            .iter()
            .filter(|a| keep(a))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EnrichError, FetchErrorKind};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `failures` index loads, then serves an index.
    struct FlakySource {
        failures: usize,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl BaselineSource for FlakySource {
        async fn fetch_index(&self) -> Result<BaselineIndex> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(EnrichError::fetch(
                    "index.json",
                    FetchErrorKind::NetworkError("connection reset".to_string()),
                ));
            }
            Ok(BaselineIndex::from_baselines(vec![BaselineSbom::new(
                "b1", "react", "18.2.0", "react.json",
            )]))
        }

        async fn fetch_payload(&self, path: &str) -> Result<Value> {
            Err(EnrichError::fetch(path, FetchErrorKind::NotFound(path.to_string())))
        }

        fn describe(&self) -> String {
            "flaky".to_string()
        }
    }

    fn sample_index() -> BaselineIndex {
        serde_json::from_value(json!({
            "version": "1.0.0",
            "baselineSBOMs": [
                {"id": "react", "name": "React", "version": "18.2.0", "ecosystem": "npm",
                 "category": "framework", "path": "npm/react.json",
                 "description": "UI library"},
                {"id": "django", "name": "Django", "version": "5.0.0",
                 "category": "framework", "path": "pypi/django.json",
                 "purl": "pkg:pypi/django@5.0.0"}
            ],
            "businessApplications": [
                {"id": "crm", "name": "Acme CRM", "category": "sales",
                 "industry": ["retail"], "path": "apps/crm.json",
                 "vendor": "Acme", "functions": ["Lead tracking"],
                 "usage": {"heatMapScore": 0.8}}
            ],
            "dependencyMappings": {
                "byComponent": {
                    "lodash": {"usedBy": [{"appId": "crm", "appName": "Acme CRM",
                                           "usage": "utility", "criticality": "low"}],
                               "usageCount": 4, "heatMapScore": 0.4},
                    "react": {"usedBy": [], "usageCount": 9, "heatMapScore": 0.9}
                },
                "byApplication": {
                    "crm": {"directDependencies": ["react"],
                            "transitiveDependencies": ["lodash"]}
                }
            },
            "ecosystems": {"npm": "Node.js", "pypi": "Python"},
            "categories": {"framework": "Frameworks"}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let catalog = BaselineCatalog::new(FlakySource {
            failures: 1,
            calls: Arc::clone(&calls),
        });

        assert!(catalog.try_load_index().await.is_err());
        assert!(!catalog.is_loaded());
        // Degraded, then retried successfully
        assert_eq!(catalog.load_index().await.baseline_sboms.len(), 1);
        assert!(catalog.is_loaded());
        catalog.load_index().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_load_failure_degrades_to_empty() {
        let catalog = BaselineCatalog::new(FlakySource {
            failures: usize::MAX,
            calls: Arc::new(AtomicUsize::new(0)),
        });
        assert!(catalog.load_index().await.is_empty());
        assert!(catalog.all_baselines().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_index_is_cached_empty() {
        let catalog = BaselineCatalog::default();
        assert!(catalog.try_load_index().await.unwrap().is_empty());
        assert!(catalog.is_loaded());
    }

    #[tokio::test]
    async fn test_clear_cache_reloads() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut catalog = BaselineCatalog::new(FlakySource {
            failures: 0,
            calls: Arc::clone(&calls),
        });
        catalog.load_index().await;
        catalog.clear_cache();
        assert!(!catalog.is_loaded());
        catalog.load_index().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_baseline_queries() {
        let catalog = BaselineCatalog::with_index(sample_index());

        assert_eq!(catalog.all_baselines().await.len(), 2);
        assert_eq!(catalog.by_ecosystem("NPM").await[0].id, "react");
        // Ecosystem falls back to the purl type
        assert_eq!(catalog.by_ecosystem("pypi").await[0].id, "django");
        assert_eq!(catalog.by_category("framework").await.len(), 2);
        assert_eq!(catalog.search("ui lib").await.len(), 1);
        assert_eq!(catalog.by_id("django").await.unwrap().version, "5.0.0");
        assert!(catalog.by_id("vue").await.is_none());
        assert_eq!(catalog.ecosystems().await, vec!["npm", "pypi"]);
        assert_eq!(catalog.categories().await, vec!["framework"]);
    }

    #[tokio::test]
    async fn test_business_app_queries() {
        let catalog = BaselineCatalog::with_index(sample_index());

        assert_eq!(catalog.business_applications().await.len(), 1);
        assert!(catalog.business_app_by_id("crm").await.is_some());
        assert_eq!(catalog.business_apps_by_category("sales").await.len(), 1);
        assert_eq!(catalog.business_apps_by_industry("retail").await.len(), 1);
        assert_eq!(catalog.search_business_apps("lead").await.len(), 1);

        let users = catalog.apps_using_component("lodash").await;
        assert_eq!(users[0].app_id, "crm");
        assert!(catalog.apps_using_component("ghost").await.is_empty());
        assert_eq!(
            catalog.component_dependencies("crm").await,
            vec!["react", "lodash"]
        );

        let top = catalog.top_components_by_usage(1).await;
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].component_id, "react");
    }
}
