//! CLI command definitions and argument parsing.

use crate::config::OutputFormat;
use clap::{Args, Parser, Subcommand};
use infobox_domain::Locale;
use std::path::PathBuf;

/// Infobox CLI - Read infobox fields and plan knowledge-base imports.
#[derive(Debug, Parser)]
#[command(name = "infobox")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "INFOBOX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (names and ids only)
    Quiet,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => OutputFormat::Table,
            CliFormat::Json => OutputFormat::Json,
            CliFormat::Quiet => OutputFormat::Quiet,
        }
    }
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the field names each infobox of an article defines
    Tokens(TokensArgs),

    /// Read typed field values out of an article's infoboxes
    Extract(ExtractArgs),

    /// Plan which extracted values to write to a record
    Plan(PlanArgs),

    /// Normalize a date value
    Date(DateArgs),

    /// Compute a coordinate from template parameters
    Coord(CoordArgs),

    /// Manage the knowledge-base store
    Store(StoreArgs),

    /// Show or change CLI and import configuration
    Config(ConfigArgs),
}

/// Article markup source.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// Article markup file; stdin when absent or `-`
    pub file: Option<PathBuf>,
}

/// Import configuration source.
#[derive(Debug, Args)]
pub struct ImportConfigArgs {
    /// Built-in field mapping
    #[arg(long, value_enum, conflicts_with = "import_config")]
    pub preset: Option<PresetArg>,

    /// Field mapping file (TOML)
    #[arg(long)]
    pub import_config: Option<PathBuf>,

    /// Article language, overriding the import config
    #[arg(short, long)]
    pub locale: Option<Locale>,
}

/// Built-in import configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PresetArg {
    /// No field mapping
    Default,
    /// Ship infoboxes
    Ships,
    /// Historic place infoboxes
    HistoricPlaces,
}

/// Arguments for the tokens command.
#[derive(Debug, Parser)]
pub struct TokensArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Accept field names with inner spaces (`| Ship builder =`)
    #[arg(long)]
    pub spaced_names: bool,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub import: ImportConfigArgs,
}

/// Arguments for the plan command.
#[derive(Debug, Parser)]
pub struct PlanArgs {
    /// Record to import into (e.g. Q42)
    #[arg(short, long)]
    pub entity: String,

    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub import: ImportConfigArgs,

    /// Knowledge-base database, overriding the configured one
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Source article title, for the reference URL
    #[arg(long, requires = "revision")]
    pub title: Option<String>,

    /// Source article revision id, for the reference URL
    #[arg(long, requires = "title")]
    pub revision: Option<u64>,

    /// Date used by the future-date check (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub today: Option<String>,
}

/// Arguments for the date command.
#[derive(Debug, Parser)]
pub struct DateArgs {
    /// Raw value, e.g. "12 May 1990" or "{{birth date|1990|5|12}}"
    pub value: String,

    /// Language of month names
    #[arg(short, long)]
    pub locale: Option<Locale>,
}

/// Arguments for the coord command.
#[derive(Debug, Parser)]
pub struct CoordArgs {
    /// Parameters as written in the template, e.g. "40|26|46|N|79|58|56|W"
    pub params: String,
}

/// Arguments for the store command.
#[derive(Debug, Parser)]
pub struct StoreArgs {
    /// Knowledge-base database, overriding the configured one
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: StoreCommand,
}

/// Store subcommands.
#[derive(Debug, Subcommand)]
pub enum StoreCommand {
    /// Load a JSON knowledge-base snapshot
    Import {
        /// Snapshot file
        path: PathBuf,
    },

    /// List a record's label and stored claims
    Show {
        /// Record id (e.g. Q42)
        entity: String,
    },

    /// List the records in the store
    List,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the CLI configuration
    Show,

    /// Change a CLI setting
    Set {
        /// Setting name (color, format, locale, import_config, database)
        key: String,

        /// New value; empty clears a path
        value: String,
    },

    /// Print a built-in import configuration as TOML
    Preset {
        /// Preset to print
        #[arg(value_enum)]
        name: PresetArg,
    },

    /// Check an import configuration file
    Validate {
        /// Import configuration file (TOML)
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_plan() {
        let cli = Cli::try_parse_from([
            "infobox", "plan", "--entity", "Q42", "--preset", "ships", "--title", "HMS Example",
            "--revision", "12345", "article.txt",
        ])
        .unwrap();

        let Command::Plan(args) = cli.command else {
            panic!("expected plan command");
        };
        assert_eq!(args.entity, "Q42");
        assert_eq!(args.import.preset, Some(PresetArg::Ships));
        assert_eq!(args.revision, Some(12345));
        assert_eq!(args.input.file, Some(PathBuf::from("article.txt")));
    }

    #[test]
    fn test_title_requires_revision() {
        let result = Cli::try_parse_from(["infobox", "plan", "--entity", "Q1", "--title", "Example"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_preset_conflicts_with_file() {
        let result = Cli::try_parse_from([
            "infobox", "extract", "--preset", "ships", "--import-config", "fields.toml",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_locale_argument() {
        let cli = Cli::try_parse_from(["infobox", "date", "1er janvier 1901", "--locale", "fr"]).unwrap();
        let Command::Date(args) = cli.command else {
            panic!("expected date command");
        };
        assert_eq!(args.locale, Some(Locale::Fr));

        assert!(Cli::try_parse_from(["infobox", "date", "1901", "--locale", "pt"]).is_err());
    }
}
