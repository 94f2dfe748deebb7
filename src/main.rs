use clap::Parser;
use lapras_mcp::services::config::{Config, ConfigOverrides};

/// MCP server exposing LAPRAS job search and profile management over stdio.
///
/// The API key is read from LAPRAS_API_KEY.
#[derive(Debug, Parser)]
#[command(name = "lapras-mcp", version, about)]
struct Cli {
    /// Upstream API base URL (overrides LAPRAS_API_BASE_URL).
    #[arg(long)]
    base_url: Option<String>,

    /// One of off, error, warn, info, debug (overrides LOG_LEVEL).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = match Config::resolve(ConfigOverrides {
        base_url: cli.base_url,
        log_level: cli.log_level,
    }) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("lapras-mcp: {}", err);
            std::process::exit(1);
        }
    };
    if let Err(err) = lapras_mcp::mcp::server::run_stdio(config).await {
        eprintln!("lapras-mcp: {}", err);
        std::process::exit(1);
    }
}
