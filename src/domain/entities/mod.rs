pub mod catalog;
pub mod report;

pub use catalog::{
    build_classification_tree, CatalogCounts, CatalogSnapshot, ClassificationNode,
    ClassificationRecord, OfflineResourceFields, ResourceRecord, UnitRecord,
};
pub use report::{
    count_images, EvaluatedResource, OfflineReport, OfflineReportDraft, OfflineReportPatch,
    ReportStats,
};
