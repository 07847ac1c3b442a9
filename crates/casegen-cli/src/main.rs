//! casegen CLI - structured API test cases from OpenAPI specs

mod input;
mod logging;
mod server;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use casegen_core::{Config, Generator, OfflineGenerator, analyze, handle, to_http_file};
use casegen_gateway::GeminiGateway;

#[derive(Parser)]
#[command(name = "casegen")]
#[command(about = "Generate structured API test cases from OpenAPI specs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: .casegen.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Listen address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate test cases for a spec file
    Generate {
        /// OpenAPI spec (JSON or YAML)
        spec: PathBuf,

        /// Never call the provider; use the fallback rules
        #[arg(long)]
        offline: bool,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Base URL variable name used in .http output
        #[arg(long, default_value = "base_url")]
        base_url_var: String,
    },

    /// Initialize config file
    Init,

    /// Show configuration and check the provider
    Doctor {
        /// Send a test prompt to the provider
        #[arg(long)]
        ping: bool,
    },

    /// Export JSON Schema for the result envelope
    Schema,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Http,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    Ok(config.apply_env(|name| std::env::var(name).ok()))
}

fn build_generator(config: &Config, offline: bool) -> Result<Arc<dyn Generator>> {
    if offline {
        return Ok(Arc::new(OfflineGenerator));
    }
    let gateway = GeminiGateway::new(&config.provider)?;
    if !gateway.is_configured() {
        info!("No provider credential configured; test cases will come from fallback rules");
    }
    Ok(Arc::new(gateway))
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Serve { host, port } => {
            let config = load_config(cli.config.as_deref())?;
            logging::init_logging(&config.logging, cli.verbose)?;

            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let addr: SocketAddr = format!("{host}:{port}")
                .parse()
                .with_context(|| format!("Invalid listen address {host}:{port}"))?;

            let generator = build_generator(&config, false)?;
            let router = server::build_router(server::AppState::new(generator));

            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("Cannot bind {addr}"))?;
            info!("casegen listening on http://{}", addr);

            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await?;
            info!("Server stopped");
            Ok(0)
        }

        Commands::Generate {
            spec,
            offline,
            format,
            out,
            base_url_var,
        } => {
            let config = load_config(cli.config.as_deref())?;
            logging::init_logging(&config.logging, cli.verbose)?;

            let raw = input::load_spec(&spec)?;
            let generator = build_generator(&config, offline)?;
            let envelope = handle(&raw, generator.as_ref()).await;

            if !envelope.is_success() {
                eprintln!("Error: {}", envelope.message);
                return Ok(1);
            }
            eprintln!("{}", envelope.message);

            let rendered = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&envelope)?,
                OutputFormat::Http => {
                    let operations = analyze(&raw)?;
                    to_http_file(&operations, &envelope.test_cases, &base_url_var)
                }
            };

            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("Cannot write {}", path.display()))?;
                    eprintln!("Wrote {}", path.display());
                }
                None => println!("{rendered}"),
            }
            Ok(0)
        }

        Commands::Init => {
            let config_path = ".casegen.toml";
            if Path::new(config_path).exists() {
                eprintln!("{config_path} already exists");
                return Ok(1);
            }

            std::fs::write(config_path, Config::example())?;
            println!("Created {config_path}");
            println!("\nEdit the file to configure:");
            println!("  - provider.api_key: Gemini API key (or set GEMINI_API_KEY)");
            println!("  - server.host / server.port: listen address for `casegen serve`");
            println!("  - logging.level: log filter");
            Ok(0)
        }

        Commands::Doctor { ping } => {
            println!("casegen doctor");
            println!("==============\n");

            let config_path = cli.config.clone().or_else(Config::default_path);
            match &config_path {
                Some(path) => println!("[OK] Config file ({})", path.display()),
                None => println!("[--] Config file (using defaults)"),
            }

            let config = load_config(cli.config.as_deref())?;
            let gateway = GeminiGateway::new(&config.provider)?;
            println!("[OK] Provider endpoint ({})", config.provider.endpoint);
            println!(
                "[{}] Provider credential",
                if gateway.is_configured() { "OK" } else { "--" }
            );

            let mut code = 0;
            if ping {
                match gateway.ping().await {
                    Ok(reply) => println!("[OK] Provider ping ({})", reply.trim()),
                    Err(e) => {
                        println!("[NG] Provider ping: {e}");
                        code = 1;
                    }
                }
            }

            if !gateway.is_configured() {
                println!("\nWithout a credential, test cases come from the fallback rules.");
                println!("Set GEMINI_API_KEY or run:");
                println!("  casegen init");
            }
            Ok(code)
        }

        Commands::Schema => {
            let schema = casegen_core::case::generate_schema();
            println!("{schema}");
            Ok(0)
        }
    }
}
