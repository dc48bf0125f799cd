use crate::{commands::Commands, config::JobConfig, error::CliError, output::JsonLinesSink};
use clap::Parser;
use connectors::netsuite::client::SuiteQlClient;
use engine_core::state::{StateStore, file_store::JsonFileStateStore};
use engine_processing::{runner::ExtractionRun, streams::gl_detail::GlDetailStream};
use std::sync::Arc;
use tracing::Level;

mod commands;
mod config;
mod error;
mod output;

#[derive(Parser)]
#[command(name = "suitesync", version = "0.1.0", about = "NetSuite GL extraction tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Logs go to stderr; stdout is reserved for the record stream.
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sync {
            config,
            state,
            output,
        } => {
            let config = JobConfig::load(&config).await?;
            let credentials = config.credentials()?;
            let client = SuiteQlClient::new(credentials, config.settings.request_timeout())?;

            let sink = match output {
                Some(path) => JsonLinesSink::file(&path)?,
                None => JsonLinesSink::stdout(),
            };
            let store: Arc<dyn StateStore> = Arc::new(JsonFileStateStore::new(&state));

            let run = ExtractionRun::new(
                Arc::new(client),
                Arc::new(GlDetailStream),
                store,
                sink,
                config.settings,
            );
            let summary = run.run().await?;
            output::print_summary(&summary);
        }

        Commands::Bookmark { state, json } => {
            let store = JsonFileStateStore::new(&state);
            let bookmark = store
                .load()
                .await?
                .ok_or(CliError::NoBookmark(state))?;
            output::print_bookmark(&bookmark, json)?;
        }
    }

    Ok(())
}
