//! CloudFront Caller Info
//!
//! Renders the viewer metadata CloudFront injects into origin requests
//! (location, device flags, client address, edge POP) as a dashboard,
//! optionally gated on a shared secret and other edge provenance signals.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌────────────────────────────────────────────────┐
//!                   │                 CALLER INFO                     │
//!   Viewer          │                                                 │
//!     │   CloudFront│  ┌─────────┐    ┌──────────┐    ┌───────────┐  │
//!     └──▶ edge ────┼─▶│  http   │───▶│classifier│───▶│   pages   │──┼──▶ HTML / JSON
//!                   │  │ server  │    │  gate +  │    │  render   │  │
//!                   │  └─────────┘    │normalize │    └───────────┘  │
//!                   │                 └──────────┘                    │
//!                   │  ┌──────────────────────────────────────────┐  │
//!                   │  │ config (+watcher) · observability ·      │  │
//!                   │  │ lifecycle (startup/shutdown/signals)     │  │
//!                   │  └──────────────────────────────────────────┘  │
//!                   └────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use edge_caller_info::lifecycle::{self, StartupOptions};

#[derive(Parser)]
#[command(name = "edge-caller-info")]
#[command(about = "Display CloudFront viewer information", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "CALLER_INFO_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    lifecycle::run(StartupOptions {
        config_path: args.config,
        bind_address: args.bind,
    })
    .await?;

    Ok(())
}
