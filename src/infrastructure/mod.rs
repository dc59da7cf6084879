pub mod catalog;
pub mod database;
pub mod reports;
