pub mod commands;
pub mod logging;

use clap::{Parser, Subcommand};
use dropcart_core::config::{AppConfig, LoadOptions};
use std::process::ExitCode;

use crate::commands::total::CartStep;

#[derive(Debug, Parser)]
#[command(
    name = "dropcart",
    about = "Dropcart cart pricing CLI",
    long_about = "Browse the beverage catalog, price carts with the pack discount rule, and inspect configuration.",
    after_help = "Examples:\n  dropcart catalog\n  dropcart total add:vodka-70cl:2 add:ice-2kg:2 add:tonic-1l:2\n  dropcart doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List catalog products in display order")]
    Catalog {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Apply add/remove steps to an empty cart and print the price breakdown")]
    Total {
        #[arg(
            value_name = "STEP",
            help = "Ordered cart steps: add:<product-id>[:<count>] or remove:<product-id>[:<count>]"
        )]
        steps: Vec<CartStep>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution"
    )]
    Config,
    #[command(about = "Validate config, catalog ingestion, and the pricing self-check")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    if let Ok(config) = AppConfig::load(LoadOptions::default()) {
        logging::init(&config);
    }

    let result = match cli.command {
        Command::Catalog { json } => commands::catalog::run(json),
        Command::Total { steps, json } => commands::total::run(&steps, json),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
