//! Linking data records to the assets that host them.
//!
//! [`AssetDiscoveryMatcher`] ranks existing assets by location, owner and
//! category overlap. A record nothing matches gets a synthesized asset that
//! the host may persist.
//!
//! # Example
//!
//! ```
//! use inventory_enrich::discovery::AssetDiscoveryMatcher;
//! use inventory_enrich::model::{AssetCategory, ClassificationLevel, Criticality, DataRecord};
//!
//! let record = DataRecord::new("d1", "Customer DB")
//!     .with_location("AWS S3")
//!     .with_owner("IT")
//!     .with_classification(ClassificationLevel::Confidential);
//!
//! let result = AssetDiscoveryMatcher::new().discover(&[record], &[]);
//! let asset = &result.discovered_assets[0];
//! assert_eq!(asset.category, AssetCategory::Database);
//! assert_eq!(asset.criticality, Criticality::High);
//! ```

mod matcher;

pub use matcher::{
    AssetDiscoveryMatcher, DiscoveryMapping, DiscoveryResult, MatchCandidate, MatchReason,
};
