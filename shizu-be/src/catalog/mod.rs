//! Entity CRUD with reference integrity
//!
//! Creates and updates are validated before writing. Deletes either remove
//! dependent slots (DJs, promos, events) or clear the columns that pointed at
//! the deleted entity (files, themes), inside one transaction.

pub mod djs;
pub mod events;
pub mod files;
pub mod promos;
pub mod themes;
