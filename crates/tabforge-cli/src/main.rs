//! Tabforge CLI - declarative column transformations.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};
use logging::{LogConfig, init_logging};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&LogConfig::from_verbosity(cli.verbose)) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let result = match cli.command {
        Commands::Apply {
            file,
            rules,
            output,
            format,
            today,
            reject_length,
        } => commands::apply::run(file, rules, output, format, today, reject_length),

        Commands::Diff {
            file,
            rules,
            limit,
            today,
        } => commands::diff::run(file, rules, limit, today),

        Commands::Check { rules, json } => commands::check::run(rules, json),

        Commands::Sql { file } => commands::sql::run(file),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
