pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "leadwise",
    about = "Leadwise analytics assistant CLI",
    long_about = "Ask questions of the customer leads database, manage migrations and demo \
                  data, and inspect runtime readiness.",
    after_help = "Examples:\n  leadwise ask \"Top 10 converted leads and their Lead Source breakdown\"\n  leadwise ask \"show me the champions\" --clarify \"Champions customer segment\"\n  leadwise doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run one assistant turn against the leads database")]
    Ask {
        #[arg(help = "The natural-language request")]
        request: String,
        #[arg(
            long,
            help = "Answer to apply if the turn suspends on a clarification question"
        )]
        clarify: Option<String>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo lead dataset")]
    Seed,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, model provider readiness, and DB connectivity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Ask { request, clarify, json } => {
            commands::ask::run(&request, clarify.as_deref(), json)
        }
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => commands::CommandResult::raw(commands::config::run()),
        Command::Doctor { json } => commands::CommandResult::raw(commands::doctor::run(json)),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
