//! Core library surface for the artwork table.
//!
//! `api` fetches and normalizes pages from the artworks endpoint, `selection`
//! and `controller` own pagination and the cross-page selection registry, and
//! `ui` renders it all in the terminal. Everything below `ui` is usable
//! without a terminal.
pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod models;
pub mod selection;
pub mod ui;

/// Fetching layer: the source trait and its HTTP implementation.
pub use api::{ArticClient, ArtworkSource};

pub use config::{Cli, Config};
pub use controller::{LoadOutcome, LoadRequest, TableController};
pub use error::FetchError;
pub use logging::init_logging;

/// The two domain types other layers pass around.
pub use models::{Artwork, ArtworkPage};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
