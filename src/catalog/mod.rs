//! Read-only catalog data consumed by the booking engine.
//!
//! Destinations, vehicles, driver tiers, extras, insurance plans, delivery
//! options, packages and the commission table are all maintained elsewhere;
//! this module loads and caches them.

pub mod models;
pub mod provider;
pub mod queries;

pub use models::{CatalogSnapshot, FlowKind};
pub use provider::get_catalog;
