//! HTTP API handlers for shizu-be

pub mod buildinfo;
pub mod djs;
pub mod events;
pub mod export;
pub mod files;
pub mod health;
pub mod import;
pub mod lineup;
pub mod promos;
pub mod settings;
pub mod themes;

pub use buildinfo::{buildinfo_routes, BuildInfo};
pub use djs::dj_routes;
pub use events::event_routes;
pub use export::export_routes;
pub use files::file_routes;
pub use health::health_routes;
pub use import::import_routes;
pub use lineup::lineup_routes;
pub use promos::promo_routes;
pub use settings::settings_routes;
pub use themes::theme_routes;
