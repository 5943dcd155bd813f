//! Domino Server CLI
//!
//! Starts the HTTP server for causal-graph expansion.

use domino_server::{config::ServerConfig, start_server, ServerError};
use std::env;
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        // Load from specified config file
        let config_path = &args[2];
        ServerConfig::from_file(config_path)?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        // Use default development configuration
        eprintln!("Warning: No config file specified, using default configuration");
        eprintln!("Usage: domino-server --config <path-to-config.toml>");
        eprintln!();
        ServerConfig::default_test_config()
    };

    // Start the server
    start_server(config).await?;

    Ok(())
}

fn print_help() {
    println!("Domino Server - Causal Graph Expansion");
    println!();
    println!("USAGE:");
    println!("    domino-server --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    OPENAI_API_KEY     API key for the model provider");
    println!("                       (variable name configurable via model.api_key_env)");
    println!();
    println!("EXAMPLE:");
    println!("    domino-server --config config/server.toml");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file may contain:");
    println!("    - bind_address: IP address to bind (e.g., '127.0.0.1')");
    println!("    - bind_port: Port number (e.g., 8000)");
    println!("    - narrative_enabled: Include a narrative paragraph (default: true)");
    println!("    - [model]: base_url, model, temperature, request_timeout_secs");
    println!("    - [engine]: direct_count, downstream_count, max_fanout, max_retries");
    println!();
}
