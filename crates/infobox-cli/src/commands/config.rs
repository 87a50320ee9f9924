//! Config command implementation.

use super::{load_import_config, preset};
use crate::cli::{ConfigArgs, ConfigCommand};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
pub fn execute_config(
    args: ConfigArgs,
    config: &mut Config,
    config_path: &Path,
    formatter: &Formatter,
) -> Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let text = toml::to_string_pretty(config)
                .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
            println!("{}", formatter.info(&config_path.display().to_string()));
            println!("{}", text);
        }
        ConfigCommand::Set { key, value } => {
            config.set(&key, &value)?;
            config.save_to(config_path)?;
            println!("{}", formatter.success(&format!("Set {} = {}", key, value)));
        }
        ConfigCommand::Preset { name } => {
            println!("{}", preset(name).to_toml().map_err(CliError::Config)?);
        }
        ConfigCommand::Validate { path } => {
            let import = load_import_config(&path)?;
            println!(
                "{}",
                formatter.success(&format!(
                    "{} is valid: {} field(s), {} event(s)",
                    path.display(),
                    import.fields.len(),
                    import.events.len()
                ))
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::PresetArg;
    use crate::config::OutputFormat;

    #[test]
    fn test_set_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let mut config = Config::default();

        let args = ConfigArgs {
            command: ConfigCommand::Set {
                key: "format".to_string(),
                value: "json".to_string(),
            },
        };
        execute_config(args, &mut config, &path, &formatter).unwrap();

        assert_eq!(Config::load_from(&path).unwrap().settings.format, OutputFormat::Json);
    }

    #[test]
    fn test_presets_validate() {
        let dir = tempfile::tempdir().unwrap();
        for name in [PresetArg::Default, PresetArg::Ships, PresetArg::HistoricPlaces] {
            let path = dir.path().join("preset.toml");
            std::fs::write(&path, preset(name).to_toml().unwrap()).unwrap();
            assert_eq!(load_import_config(&path).unwrap(), preset(name));
        }
    }
}
