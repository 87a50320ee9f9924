//! Date command implementation.

use crate::cli::DateArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use infobox_extractor::normalize_date;

/// Execute the date command.
pub fn execute_date(args: DateArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let locale = args.locale.unwrap_or(config.settings.locale);
    let date = normalize_date(&args.value, locale).map_err(|e| CliError::InvalidInput(e.to_string()))?;
    println!("{}", formatter.format_date(&date)?);
    Ok(())
}
