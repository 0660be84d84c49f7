pub mod artifact_store;
pub mod observability;
pub mod snapshots;
pub mod window_cache;

pub use artifact_store::FileArtifactStore;
pub use snapshots::SnapshotDirectory;
pub use window_cache::RecentWindowCache;
