//! Store command implementation.

use super::plan::parse_entity;
use crate::cli::{StoreArgs, StoreCommand};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use infobox_domain::{ClaimStore, EntityLabelLookup, LookupError};
use infobox_store::SqliteStore;

/// Execute the store command.
pub fn execute_store(args: StoreArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let database = match &args.database {
        Some(path) => path.clone(),
        None => config.database_path()?,
    };
    if let Some(parent) = database.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut store = SqliteStore::new(&database)?;

    match args.command {
        StoreCommand::Import { path } => {
            let claims = store.import_file(&path)?;
            println!(
                "{}",
                formatter.success(&format!("Imported {} claim(s) into {}", claims, database.display()))
            );
        }
        StoreCommand::Show { entity } => {
            let entity = parse_entity(&entity)?;
            let label = match store.lookup(&entity) {
                Ok(label) => Some(label),
                Err(LookupError::NotFound(_)) => None,
                Err(e @ LookupError::Unavailable(_)) => return Err(CliError::InvalidInput(e.to_string())),
            };
            let claims = store.existing_claims(&entity)?;
            println!("{}", formatter.format_claims(&entity, label.as_ref(), &claims)?);
        }
        StoreCommand::List => {
            println!("{}", formatter.format_entities(&store.entities()?)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;

    #[test]
    fn test_import_then_show() {
        let dir = tempfile::tempdir().unwrap();
        let database = dir.path().join("kb").join("store.db");
        let snapshot = dir.path().join("snapshot.json");
        std::fs::write(
            &snapshot,
            r#"{ "entities": { "Q1": { "labels": { "en": "Old Mill" },
                "claims": [ { "property": "P571", "target": { "type": "time", "value": "1850" } } ] } } }"#,
        )
        .unwrap();

        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let config = Config::default();
        let run = |command| {
            execute_store(
                StoreArgs {
                    database: Some(database.clone()),
                    command,
                },
                &config,
                &formatter,
            )
        };

        run(StoreCommand::Import { path: snapshot.clone() }).unwrap();
        run(StoreCommand::Show { entity: "Q1".to_string() }).unwrap();
        run(StoreCommand::List).unwrap();
        assert!(matches!(
            run(StoreCommand::Show { entity: "nonsense".to_string() }),
            Err(CliError::InvalidInput(_))
        ));

        let store = SqliteStore::new(&database).unwrap();
        assert_eq!(store.existing_claims(&infobox_domain::EntityId::numbered(1)).unwrap().len(), 1);
    }
}
