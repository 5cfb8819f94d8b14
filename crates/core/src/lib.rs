#![warn(clippy::all, missing_docs)]

//! Core logic for the folio portfolio tooling.
//!
//! The build-time half pulls the game catalog, infers categories and
//! technology tags, and writes a games file snapshot. The runtime half loads
//! that snapshot with bounded retries and renders it as project cards.

pub mod catalog;
pub mod config;
pub mod filter;
pub mod games_file;
pub mod loader;
pub mod models;
pub mod render;

#[cfg(test)]
mod test_support;

pub use catalog::{CatalogFetcher, FetchError, FetchOutcome, Normalizer};
pub use config::AppConfig;
pub use filter::FilterState;
pub use games_file::GamesFile;
pub use loader::{GamesLoader, LoadOutcome, LoadPhase, LoadReport, RetryPolicy};
pub use models::{Category, NormalizedGame};
pub use render::RenderedPage;
