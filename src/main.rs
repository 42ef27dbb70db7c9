//! NutriCare
//!
//! An MCP server for health intake and diet recommendations.

use std::sync::Arc;

use nutricare::build_info;
use nutricare::config::AppConfig;
use nutricare::db::{self, Database};
use nutricare::llm::{GeminiClient, TextGenerator};
use nutricare::mcp::NutriCareService;
use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("nutricare=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let config = AppConfig::from_env()?;
    let db_path = config.database_path.clone();
    eprintln!("Database path: {}", db_path.display());

    // Ensure data directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    eprintln!("Initializing database...");
    let database = Database::new(&db_path)?;

    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        let version = db::migrations::get_schema_version(conn)?;
        eprintln!("Database schema version: {}", version);
        Ok(())
    })?;

    let generator: Option<Arc<dyn TextGenerator>> = match config.gemini {
        Some(gemini) => {
            let client = GeminiClient::new(gemini)?;
            eprintln!("AI recommendations: enabled ({})", client.endpoint());
            Some(Arc::new(client))
        }
        None => {
            eprintln!("AI recommendations: disabled (NUTRICARE_GEMINI_API_KEY not set)");
            None
        }
    };

    let service = NutriCareService::new(db_path, database, generator);

    // Create stdio transport
    let transport = (stdin(), stdout());

    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}
