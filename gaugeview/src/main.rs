mod commands;
mod handlers;
mod output;
mod svg;

use clap::Parser;
use commands::Cli;
use handlers::handle_command;
use output::print_error;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    if let Err(err) = handle_command(cli.command) {
        print_error(&err.to_string());
        std::process::exit(1);
    }
    Ok(())
}
