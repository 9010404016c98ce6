//! Raw data acquisition and reference data.
//!
//! - raw feed rows and the snapshot that bundles them (`raw`)
//! - snapshot sources: HTTP (`covid19india`) and local directory (`source`)
//! - the shared, refreshable snapshot handle (`store`)
//! - region reference data (`catalog`)

pub mod catalog;
pub mod covid19india;
pub mod raw;
pub mod source;
pub mod store;

pub use covid19india::{Covid19IndiaClient, FeedUrls};
pub use raw::{DistrictRow, NationalRow, RawField, RawSnapshot, StateRow};
pub use source::{LocalDirSource, SnapshotSource, source_for};
pub use store::{RefreshHandle, SnapshotStore};
