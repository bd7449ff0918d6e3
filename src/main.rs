//! Binary entry point: resolve configuration, start logging and the async
//! runtime used for page fetches, then drive the Ratatui event loop until the
//! user exits.
use std::sync::Arc;

use anyhow::Context;
use artwork_table::{
    init_logging, run_app, App, ArticClient, ArtworkSource, Cli, Config, TableController,
};
use clap::Parser;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli)?;
    let _log_guard = init_logging(&config.log_directory(), &config.log.filter)?;
    info!(
        endpoint = %config.api.endpoint,
        rows_per_page = config.table.rows_per_page,
        start_page = config.table.start_page,
        "starting artwork table"
    );

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let client = ArticClient::new(&config.api).context("failed to build HTTP client")?;
    let source: Arc<dyn ArtworkSource> = Arc::new(client);

    let controller = TableController::new(config.table.start_page, config.table.rows_per_page);
    let mut app = App::new(controller, config.table.rows_per_page_options.clone());
    run_app(&mut app, source, runtime.handle())
}
