mod evidence;
mod origin;
mod resource_status;
mod sync_state;
pub mod temp_code;

pub use evidence::EvidenceBlob;
pub use origin::Origin;
pub use resource_status::ResourceStatus;
pub use sync_state::ReportSyncState;
pub use temp_code::{generate_temp_code, generate_temp_id, is_temp_code, TEMP_CODE_PREFIX};
