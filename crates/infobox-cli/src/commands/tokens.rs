//! Tokens command implementation.

use super::{blocks_of, read_input};
use crate::cli::TokensArgs;
use crate::error::Result;
use crate::output::Formatter;
use infobox_domain::PropertyToken;
use infobox_extractor::{Tokenizer, TokenizerOptions};

/// Execute the tokens command.
pub fn execute_tokens(args: TokensArgs, formatter: &Formatter) -> Result<()> {
    let article = read_input(&args.input)?;
    let blocks = field_names(&article, args.spaced_names);
    println!("{}", formatter.format_tokens(&blocks)?);
    Ok(())
}

/// Field names of each infobox in `article`.
pub fn field_names(article: &str, spaced_names: bool) -> Vec<Vec<PropertyToken>> {
    let tokenizer = Tokenizer::new(TokenizerOptions { spaced_names });
    blocks_of(article)
        .into_iter()
        .map(|block| tokenizer.tokenize(block))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_per_block() {
        let article = "{{Infobox ship\n| Ship name = Example\n| Ship builder = [[Yard]]\n}}";

        let plain = field_names(article, false);
        assert!(plain[0].is_empty());

        let spaced = field_names(article, true);
        assert_eq!(spaced[0], vec![PropertyToken::new("Ship name"), PropertyToken::new("Ship builder")]);
    }
}
