//! kvmctl - Command-line interface for the kvmd update subsystem

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9527";

/// Error code the daemon uses for "update already in progress"
const CONFLICT: i32 = 4002;

#[derive(Parser)]
#[command(name = "kvmctl")]
#[command(about = "kvmd device management CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "KVMD_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Software update operations
    Update {
        #[command(subcommand)]
        action: UpdateAction,
    },
}

#[derive(Subcommand)]
enum UpdateAction {
    /// Launch a software update in the background
    Start,

    /// Show whether an update is running or how the last one ended
    Status,
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RPC error ({}): {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcError {}

#[derive(Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct StatusRow {
    status: String,
    #[tabled(display_with = "display_error")]
    update_error: Option<String>,
}

fn display_error(error: &Option<String>) -> String {
    error.clone().unwrap_or_else(|| "-".to_string())
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        return Err(error.into());
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

async fn update_start(rpc_url: &str) -> Result<()> {
    match call_rpc(rpc_url, "update.start.v1", json!({})).await {
        Ok(_) => {
            println!("{}", "✓ Update launched".green().bold());
            println!("  Run `kvmctl update status` to follow progress.");
            Ok(())
        }
        Err(e) => match e.downcast_ref::<JsonRpcError>() {
            Some(rpc) if rpc.code == CONFLICT => {
                println!("{}", "○ An update is already in progress".yellow().bold());
                Ok(())
            }
            _ => Err(e),
        },
    }
}

async fn update_status(rpc_url: &str) -> Result<()> {
    let result = call_rpc(rpc_url, "update.status.v1", json!({})).await?;
    let row: StatusRow = serde_json::from_value(result)?;

    let headline = match (row.status.as_str(), row.update_error.is_some()) {
        ("IN_PROGRESS", _) => "Update in progress".cyan().bold(),
        ("DONE", false) => "Last update succeeded".green().bold(),
        ("DONE", true) => "Last update failed".red().bold(),
        _ => "No update has run".normal(),
    };
    println!("{}", headline);
    println!();
    println!("{}", Table::new(vec![row]));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Update { action } => match action {
            UpdateAction::Start => update_start(&cli.rpc_url).await?,
            UpdateAction::Status => update_status(&cli.rpc_url).await?,
        },
    }

    Ok(())
}
