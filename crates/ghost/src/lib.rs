//! Banner class-search scraper and room occupancy API for GMU.
//!
//! A scrape walks every subject of one term through the registration
//! portal, normalizes the offered sections and folds their meetings into
//! per-room weekly schedules. The read API serves those schedules.

pub mod banner;
pub mod buildings;
pub mod config;
pub mod model;
pub mod pipeline;
pub mod server;
pub mod store;
pub mod types;
