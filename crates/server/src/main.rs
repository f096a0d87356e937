//! Canopy
//!
//! Sustainability research agent: three parallel web researchers and one
//! synthesis agent, behind a terminal front-end and a small web form.

mod cli;
mod form;

use canopy_core::swarm::{Pipeline, RadkitExecutor, Runner};
use canopy_core::{initialize, AppConfig};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Clone)]
#[command(author, version, about = "Canopy - Parallel Sustainability Research Agent")]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Clone)]
enum CliCommand {
    /// Generate the report once in the terminal (default)
    Run,
    /// Serve the research form
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = AppConfig::load(&AppConfig::default_path()).await?;
    let env = initialize(&config);

    let executor = Arc::new(RadkitExecutor::new(env.model.clone()));
    let runner = Runner::from_environment(&env, Pipeline::default(), executor);

    match args.command.unwrap_or(CliCommand::Run) {
        CliCommand::Run => {
            println!("╔══════════════════════════════════════╗");
            println!("║    SUSTAINABILITY RESEARCH AGENT     ║");
            println!("╚══════════════════════════════════════╝");
            cli::run_cli(&env, &runner, &mut std::io::stdout()).await
        }
        CliCommand::Serve { port } => form::serve(env, runner, port).await,
    }
}
