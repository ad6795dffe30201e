//! Core data model for inventory enrichment.
//!
//! Assets and data records are owned by the host application; the core only
//! reads them and returns new values. SBOM components are transient, produced
//! by the normalizer from whatever payload shape was supplied. Baselines are
//! read-only reference data loaded once per catalog.

mod baseline;
mod inventory;
mod sbom;

pub use baseline::*;
pub use inventory::*;
pub use sbom::*;
