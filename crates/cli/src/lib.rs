pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "nippo",
    about = "Nippo operator CLI",
    long_about = "Inspect configuration, check Slack readiness, and submit daily reports from a terminal.",
    after_help = "Examples:\n  nippo doctor --json\n  nippo config\n  nippo submit --name 山田 --start 10:00 --end 19:00 --dry-run"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config and Slack credential readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
        #[arg(long, help = "Also read one history message to confirm channel access")]
        live: bool,
    },
    #[command(about = "Compose a daily report and post it into the day's thread")]
    Submit(commands::submit::SubmitArgs),
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json, live } => commands::doctor::run(json, live),
        Command::Submit(args) => commands::submit::run(args),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
