//! Ratatui front-end: a paginated artwork table with a checkbox column and a
//! panel listing every selection made on any page.

mod app;
mod forms;
mod helpers;
mod loader;
mod terminal;

pub use app::App;
pub use terminal::run_app;
