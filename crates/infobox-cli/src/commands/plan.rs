//! Plan command implementation.

use super::{read_input, resolve_import_config};
use crate::cli::PlanArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use chrono::NaiveDate;
use infobox_domain::EntityId;
use infobox_extractor::{ImportPlan, ImportRequest, Importer};
use infobox_store::SqliteStore;
use tracing::{debug, warn};

/// Execute the plan command.
pub fn execute_plan(args: PlanArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let import = resolve_import_config(&args.import, config)?;
    let database = match &args.database {
        Some(path) => path.clone(),
        None => config.database_path()?,
    };
    if !database.exists() {
        warn!("Database {} does not exist; planning against an empty store", database.display());
    }
    debug!("Opening store at {}", database.display());
    let store = SqliteStore::new(&database)?;

    let article = read_input(&args.input)?;
    let mut request = ImportRequest::new(article, parse_entity(&args.entity)?);
    if let (Some(title), Some(revision)) = (args.title, args.revision) {
        request = request.with_source(title, revision);
    }

    let mut importer = Importer::new(&store, &store, import)?;
    if let Some(today) = &args.today {
        importer = importer.with_today(parse_today(today)?);
    }

    let plan: ImportPlan = importer.plan(&request)?;
    println!("{}", formatter.format_plan(&plan)?);
    Ok(())
}

/// Parse a record id argument.
pub fn parse_entity(raw: &str) -> Result<EntityId> {
    EntityId::parse(raw).map_err(|e| CliError::InvalidInput(e.to_string()))
}

fn parse_today(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| CliError::InvalidInput(format!("Invalid date '{}': {}", raw, e)))
}
