//! Command implementations.

pub mod config;
pub mod coord;
pub mod date;
pub mod extract;
pub mod plan;
pub mod store;
pub mod tokens;

pub use self::config::execute_config;
pub use self::coord::execute_coord;
pub use self::date::execute_date;
pub use self::extract::execute_extract;
pub use self::plan::execute_plan;
pub use self::store::execute_store;
pub use self::tokens::execute_tokens;

use crate::cli::{ImportConfigArgs, InputArgs, PresetArg};
use crate::config::Config;
use crate::error::{CliError, Result};
use infobox_domain::MarkupBlock;
use infobox_extractor::{find_infoboxes, ImportConfig};
use std::fs;
use std::io::Read;
use std::path::Path;

/// Read article markup from the given file, or stdin.
pub fn read_input(input: &InputArgs) -> Result<String> {
    match &input.file {
        Some(path) if path.as_os_str() != "-" => Ok(fs::read_to_string(path)?),
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Infobox blocks of an article; input without an infobox is read as one block.
pub fn blocks_of(article: &str) -> Vec<MarkupBlock<'_>> {
    let blocks = find_infoboxes(article);
    if blocks.is_empty() && !article.trim().is_empty() {
        vec![MarkupBlock::new(article)]
    } else {
        blocks
    }
}

/// Built-in import configuration.
pub fn preset(name: PresetArg) -> ImportConfig {
    match name {
        PresetArg::Default => ImportConfig::default(),
        PresetArg::Ships => ImportConfig::ships(),
        PresetArg::HistoricPlaces => ImportConfig::historic_places(),
    }
}

/// Load and validate an import configuration file.
pub fn load_import_config(path: &Path) -> Result<ImportConfig> {
    let text = fs::read_to_string(path)?;
    let config = ImportConfig::from_toml(&text).map_err(CliError::Config)?;
    config
        .validate()
        .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))?;
    Ok(config)
}

/// Import configuration chosen by the arguments, then the CLI config.
///
/// A preset or file keeps its own locale unless `--locale` is given; the
/// unmapped default takes the configured locale.
pub fn resolve_import_config(args: &ImportConfigArgs, config: &Config) -> Result<ImportConfig> {
    let mut import = if let Some(name) = args.preset {
        preset(name)
    } else if let Some(path) = args.import_config.as_ref().or(config.settings.import_config.as_ref()) {
        load_import_config(path)?
    } else {
        ImportConfig {
            locale: config.settings.locale,
            ..ImportConfig::default()
        }
    };

    if let Some(locale) = args.locale {
        import.locale = locale;
    }
    Ok(import)
}

#[cfg(test)]
mod tests {
    use super::*;
    use infobox_domain::Locale;

    fn args(preset: Option<PresetArg>, locale: Option<Locale>) -> ImportConfigArgs {
        ImportConfigArgs {
            preset,
            import_config: None,
            locale,
        }
    }

    #[test]
    fn test_blocks_fall_back_to_whole_input() {
        assert_eq!(blocks_of("| name = Example\n| built = 1850").len(), 1);
        assert!(blocks_of("  \n").is_empty());

        let article = "{{Infobox ship\n| name = A\n}}\n{{Infobox ship\n| name = B\n}}";
        assert_eq!(blocks_of(article).len(), 2);
    }

    #[test]
    fn test_resolve_default_uses_configured_locale() {
        let mut config = Config::default();
        config.settings.locale = Locale::De;

        let import = resolve_import_config(&args(None, None), &config).unwrap();
        assert_eq!(import.locale, Locale::De);
        assert!(import.fields.is_empty());
    }

    #[test]
    fn test_resolve_preset_with_locale_override() {
        let import = resolve_import_config(&args(Some(PresetArg::Ships), Some(Locale::It)), &Config::default()).unwrap();
        assert_eq!(import.locale, Locale::It);
        assert!(import.events.contains_key("launched"));
    }

    #[test]
    fn test_load_import_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("places.toml");
        fs::write(&path, ImportConfig::historic_places().to_toml().unwrap()).unwrap();

        let mut config = Config::default();
        config.settings.import_config = Some(path);
        let import = resolve_import_config(&args(None, None), &config).unwrap();
        assert_eq!(import, ImportConfig::historic_places());
    }

    #[test]
    fn test_invalid_import_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "locale = 42").unwrap();
        assert!(matches!(load_import_config(&path), Err(CliError::Config(_))));

        assert!(matches!(load_import_config(&dir.path().join("absent.toml")), Err(CliError::Io(_))));
    }
}
