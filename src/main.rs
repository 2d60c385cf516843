//! FridgeNutri
//!
//! An MCP server for day-by-day recipe tracking and diet scoring.

use std::sync::Arc;

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use fridgenutri::analysis::HttpAnalysisService;
use fridgenutri::build_info;
use fridgenutri::config::AppConfig;
use fridgenutri::db::{self, Database};
use fridgenutri::mcp::FridgeNutriService;
use fridgenutri::store::{LedgerStore, SqliteKvStore};
use fridgenutri::tools::Session;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("fridgenutri=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let config = AppConfig::from_env()?;
    eprintln!("Database path: {}", config.database_path.display());
    eprintln!("Analysis service: {}", config.analysis_url);

    eprintln!("Initializing database...");
    let database = Database::open(&config.database_path)?;
    database.with_conn(|conn| {
        let version = db::migrations::get_schema_version(conn)?;
        eprintln!("Database schema version: {}", version);
        Ok(())
    })?;

    let store = LedgerStore::new(Arc::new(SqliteKvStore::new(database)));
    let today = chrono::Local::now().date_naive();
    let session = Session::open(store, today, config.initial_days, config.goal_defaults);

    let analysis = HttpAnalysisService::new(config.analysis_url.clone(), config.analysis_timeout)?;

    let service = FridgeNutriService::new(
        config.database_path,
        config.analysis_url,
        Arc::new(session),
        Arc::new(analysis),
    );

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
