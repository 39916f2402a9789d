//! # Shizu Common Library
//!
//! Shared code for the Shizu event-production backend:
//! - Error taxonomy
//! - Bootstrap configuration and media directory resolution
//! - Database bootstrap, declarative table descriptions and models
//! - Generic persistence helper

pub mod config;
pub mod db;
pub mod error;

pub use error::{EntityKind, Error, Result};
