use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use rmcp::model::JsonObject;

use crate::clients::invoker::RemoteInvoker;
use crate::core::tool::ToolBackend;
use crate::infra::boot;
use crate::infra::config::Config;
use crate::infra::runtime::limits::make_http_client;

#[derive(Parser)]
#[command(name = "tool-bridge")]
#[command(about = "Expose an HTTP tool service as a stdio MCP server")]
#[command(version)]
pub struct Cli {
    /// Upstream base URL (overrides BRIDGE_BASE_URL and the config file)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the catalog and serve MCP over stdio (default)
    Serve,
    /// Fetch the catalog and print the translated tool list as JSON
    List,
    /// Invoke one upstream tool and print the result as JSON
    Call {
        /// Tool name, forwarded as-is
        name: String,
        /// Arguments as a JSON object
        #[arg(short, long)]
        args: Option<String>,
    },
    /// Validate and print the resolved configuration
    Config,
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    run_commands(cli.command.unwrap_or(Commands::Serve), cli.base_url).await
}

pub async fn run_commands(command: Commands, base_url: Option<String>) -> ExitCode {
    let cfg = match resolve_config(base_url) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("tool-bridge: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match command {
        Commands::Serve => match boot::run_server(&cfg).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "startup failed");
                eprintln!("tool-bridge: {e}");
                ExitCode::FAILURE
            }
        },
        Commands::List => match list_tools(&cfg).await {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("tool-bridge: {e:#}");
                ExitCode::FAILURE
            }
        },
        Commands::Call { name, args } => match call_tool(&cfg, &name, args.as_deref()).await {
            Ok((json, is_error)) => {
                println!("{json}");
                if is_error {
                    ExitCode::FAILURE
                } else {
                    ExitCode::SUCCESS
                }
            }
            Err(e) => {
                eprintln!("tool-bridge: {e:#}");
                ExitCode::FAILURE
            }
        },
        Commands::Config => {
            println!("base_url       = {}", cfg.base_url);
            println!("fetch_attempts = {}", cfg.fetch_attempts);
            println!("fetch_delay_ms = {}", cfg.fetch_delay.as_millis());
            ExitCode::SUCCESS
        }
    }
}

fn resolve_config(base_url: Option<String>) -> anyhow::Result<Config> {
    let mut cfg = Config::from_env()?;
    if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
        cfg.base_url = url;
    }
    Ok(cfg)
}

async fn list_tools(cfg: &Config) -> anyhow::Result<String> {
    let server = boot::start(cfg).await?;
    let tools = server.list_tool_descriptors();
    serde_json::to_string_pretty(&tools).context("serializing tool list")
}

fn parse_args(raw: Option<&str>) -> anyhow::Result<JsonObject> {
    let Some(raw) = raw else {
        return Ok(JsonObject::new());
    };
    let value: serde_json::Value = serde_json::from_str(raw).context("--args is not valid JSON")?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(anyhow!("--args must be a JSON object, got {other}")),
    }
}

async fn call_tool(cfg: &Config, name: &str, raw_args: Option<&str>) -> anyhow::Result<(String, bool)> {
    let args = parse_args(raw_args)?;
    let backend: Arc<dyn ToolBackend> =
        Arc::new(RemoteInvoker::new(cfg.base_url.clone(), make_http_client()?));
    let out = backend.call(name, args).await;
    let json = serde_json::to_string_pretty(&out).context("serializing result")?;
    Ok((json, out.is_error))
}
