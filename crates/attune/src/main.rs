// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attune - a fixed-duration, two-party remote session service.
//!
//! This is the binary entry point for the Attune server.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shutdown;

use clap::{Parser, Subcommand};

/// Attune - a fixed-duration, two-party remote session service.
#[derive(Parser, Debug)]
#[command(name = "attune", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Attune server.
    Serve,
    /// Inspect the Attune configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration inspection actions.
#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the config file locations in load order.
    Path,
    /// Print the effective configuration as TOML.
    Show,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match attune_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            attune_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("attune serve failed: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Path => print_config_paths(),
            ConfigAction::Show => match toml::to_string_pretty(&config) {
                Ok(rendered) => print!("{rendered}"),
                Err(e) => {
                    eprintln!("attune config show failed: {e}");
                    std::process::exit(1);
                }
            },
        },
        None => {
            println!("attune: use --help for available commands");
        }
    }
}

/// Prints the config lookup locations, lowest precedence first.
fn print_config_paths() {
    println!("/etc/attune/attune.toml");
    if let Some(config_dir) = dirs::config_dir() {
        println!("{}", config_dir.join("attune/attune.toml").display());
    }
    println!("./attune.toml");
}
