//! Infobox CLI - read infobox fields and plan knowledge-base imports.

use clap::Parser;
use infobox_cli::commands;
use infobox_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; RUST_LOG wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> infobox_cli::Result<()> {
    // Load config, falling back to defaults
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::path()?,
    };
    let mut config = Config::load_from(&config_path)?;

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Tokens(args) => commands::execute_tokens(args, &formatter)?,
        Command::Extract(args) => commands::execute_extract(args, &config, &formatter)?,
        Command::Plan(args) => commands::execute_plan(args, &config, &formatter)?,
        Command::Date(args) => commands::execute_date(args, &config, &formatter)?,
        Command::Coord(args) => commands::execute_coord(args, &formatter)?,
        Command::Store(args) => commands::execute_store(args, &config, &formatter)?,
        Command::Config(args) => {
            commands::execute_config(args, &mut config, &config_path, &formatter)?
        }
    }

    Ok(())
}
