pub mod config_store;
pub mod local_store;

pub use config_store::SqliteConfigStore;
pub use local_store::{LocalStore, TableCount};
