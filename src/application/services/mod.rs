pub mod auto_sync;
pub mod catalog_sync;
pub mod reconcile;
pub mod status;

pub use auto_sync::{AutoSyncService, AutoSyncStatus, RefreshDecision};
pub use catalog_sync::{CatalogSyncPipeline, RefreshOutcome};
pub use reconcile::ReconcileService;
pub use status::{StatusService, SyncStatusSnapshot};
