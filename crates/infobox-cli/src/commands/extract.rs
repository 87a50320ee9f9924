//! Extract command implementation.

use super::{blocks_of, read_input, resolve_import_config};
use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use infobox_extractor::{ImportConfig, InfoboxRecord, ValueExtractor};

/// Execute the extract command.
pub fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let import = resolve_import_config(&args.import, config)?;
    let article = read_input(&args.input)?;
    let records = extract_records(&article, &import);
    println!("{}", formatter.format_records(&records)?);
    Ok(())
}

/// Typed values of each infobox, read with the classes `import` maps them to.
pub fn extract_records(article: &str, import: &ImportConfig) -> Vec<InfoboxRecord> {
    let extractor = ValueExtractor::from_config(import);
    blocks_of(article)
        .into_iter()
        .map(|block| extractor.extract_record(block, |token| import.extraction_class(token.as_str())))
        .collect()
}
