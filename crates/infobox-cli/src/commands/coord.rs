//! Coord command implementation.

use crate::cli::CoordArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use infobox_domain::Coordinate;
use infobox_extractor::calc_coordinate;

/// Execute the coord command.
pub fn execute_coord(args: CoordArgs, formatter: &Formatter) -> Result<()> {
    let coordinate = parse_params(&args.params)?;
    println!("{}", formatter.format_coordinate(&coordinate)?);
    Ok(())
}

/// Coordinate from `|`-separated parameters, with or without the `{{coord}}` wrapper.
pub fn parse_params(raw: &str) -> Result<Coordinate> {
    let body = raw.trim().trim_start_matches("{{").trim_end_matches("}}");
    let params: Vec<&str> = body.split('|').map(str::trim).collect();
    let params = match params.first() {
        Some(name) if name.eq_ignore_ascii_case("coord") => &params[1..],
        _ => &params[..],
    };
    calc_coordinate(params).map_err(|e| CliError::InvalidInput(e.to_string()))
}
