//! Core library for the `itinerary` tool.
//!
//! This crate defines:
//! - The itinerary document model and its validation
//! - A single-file JSON store with a built-in default document
//! - Spreadsheet export and the expense ledger behind it
//! - Configuration handling
//!
//! It is used by `itinerary-cli`, but can also be reused by other binaries or services.

pub mod budget;
pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod schedule;
pub mod store;

pub use config::{Config, ServerConfig};
pub use error::{ItineraryError, Result};
pub use model::{Day, Itinerary, Stop, TripMeta, Weather};
pub use report::Report;
pub use store::ItineraryStore;
