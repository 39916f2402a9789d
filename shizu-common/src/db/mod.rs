//! Database bootstrap, table descriptions, models and the persistence helper

pub mod init;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod store;

pub use init::*;
pub use models::*;
