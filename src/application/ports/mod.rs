pub mod catalog_store;
pub mod config_store;
pub mod connectivity;
pub mod remote_api;
pub mod report_store;

pub use catalog_store::CatalogStore;
pub use config_store::{ConfigStore, LAST_AUTO_SYNC_KEY};
pub use connectivity::{ConnectivityObserver, OnlineCallback};
pub use remote_api::{
    CreateReportInput, CreatedReport, OfflineResourcePayload, PromotionMapping, RemoteApi,
    RemoteClassification, RemoteLabel, RemoteResource, RemoteUnit, ReportResourceInput,
};
pub use report_store::ReportStore;
