//! Date normalizer: raw infobox date text to a [`PartialDate`]

use crate::error::{DateError, FutureDate};
use chrono::{Datelike, NaiveDate};
use infobox_domain::{Locale, PartialDate};

const EN_MONTHS: &[(&str, u32)] = &[
    ("january", 1), ("february", 2), ("march", 3), ("april", 4), ("may", 5), ("june", 6),
    ("july", 7), ("august", 8), ("september", 9), ("october", 10), ("november", 11), ("december", 12),
    ("jan", 1), ("feb", 2), ("mar", 3), ("apr", 4), ("jun", 6), ("jul", 7), ("aug", 8),
    ("sep", 9), ("sept", 9), ("oct", 10), ("nov", 11), ("dec", 12),
];

const FR_MONTHS: &[(&str, u32)] = &[
    ("janvier", 1), ("février", 2), ("fevrier", 2), ("mars", 3), ("avril", 4), ("mai", 5),
    ("juin", 6), ("juillet", 7), ("août", 8), ("aout", 8), ("septembre", 9), ("octobre", 10),
    ("novembre", 11), ("décembre", 12), ("decembre", 12),
    ("janv", 1), ("févr", 2), ("fevr", 2), ("avr", 4), ("juil", 7), ("sept", 9), ("oct", 10),
    ("nov", 11), ("déc", 12), ("dec", 12),
];

const IT_MONTHS: &[(&str, u32)] = &[
    ("gennaio", 1), ("febbraio", 2), ("marzo", 3), ("aprile", 4), ("maggio", 5), ("giugno", 6),
    ("luglio", 7), ("agosto", 8), ("settembre", 9), ("ottobre", 10), ("novembre", 11), ("dicembre", 12),
    ("gen", 1), ("feb", 2), ("mar", 3), ("apr", 4), ("mag", 5), ("giu", 6), ("lug", 7),
    ("ago", 8), ("set", 9), ("ott", 10), ("nov", 11), ("dic", 12),
];

const DE_MONTHS: &[(&str, u32)] = &[
    ("januar", 1), ("jänner", 1), ("februar", 2), ("märz", 3), ("maerz", 3), ("april", 4),
    ("mai", 5), ("juni", 6), ("juli", 7), ("august", 8), ("september", 9), ("oktober", 10),
    ("november", 11), ("dezember", 12),
    ("jan", 1), ("feb", 2), ("mär", 3), ("apr", 4), ("jun", 6), ("jul", 7), ("aug", 8),
    ("sep", 9), ("sept", 9), ("okt", 10), ("nov", 11), ("dez", 12),
];

const ES_MONTHS: &[(&str, u32)] = &[
    ("enero", 1), ("febrero", 2), ("marzo", 3), ("abril", 4), ("mayo", 5), ("junio", 6),
    ("julio", 7), ("agosto", 8), ("septiembre", 9), ("setiembre", 9), ("octubre", 10),
    ("noviembre", 11), ("diciembre", 12),
    ("ene", 1), ("feb", 2), ("mar", 3), ("abr", 4), ("may", 5), ("jun", 6), ("jul", 7),
    ("ago", 8), ("sep", 9), ("sept", 9), ("oct", 10), ("nov", 11), ("dic", 12),
];

/// Ordinal suffixes that may follow a day number (`12th`, `1er`, `3º`)
const ORDINAL_SUFFIXES: &[&str] = &["st", "nd", "rd", "th", "er", "re", "º", "°", "."];

fn month_table(locale: Locale) -> &'static [(&'static str, u32)] {
    match locale {
        Locale::En => EN_MONTHS,
        Locale::Fr => FR_MONTHS,
        Locale::It => IT_MONTHS,
        Locale::De => DE_MONTHS,
        Locale::Es => ES_MONTHS,
    }
}

/// Resolve a month name or abbreviation, trying `locale` first, then English
pub fn resolve_month(token: &str, locale: Locale) -> Option<u32> {
    let name = token.trim().trim_end_matches('.').to_lowercase();
    if name.is_empty() {
        return None;
    }
    [locale, Locale::En]
        .into_iter()
        .flat_map(month_table)
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, month)| *month)
}

/// Normalize a raw date expression
///
/// Accepted forms:
/// - a value opening with a date sub-template whose parameters are
///   `year|month|day`, the month as a number or a name
///   (`{{birth date|1990|5|12|df=y}}`), also with two or one parameter;
///   other parameters are read as date text (`{{date|4 March 1950}}`)
/// - ISO `YYYY-MM-DD` and `YYYY-MM`
/// - three tokens (day, month name or number, year, in any usual order),
///   two tokens (month, year) or one token (year)
///
/// Templates after the date (`{{citation needed}}`), commas, link brackets
/// and trailing prose in parentheses are ignored.
///
/// # Examples
///
/// ```
/// use infobox_domain::{Locale, PartialDate};
/// use infobox_extractor::normalize_date;
///
/// assert_eq!(normalize_date("12 May 1990", Locale::En).unwrap(), PartialDate::ymd(1990, 5, 12).unwrap());
/// assert_eq!(normalize_date("mai 1990", Locale::Fr).unwrap(), PartialDate::year_month(1990, 5).unwrap());
/// ```
pub fn normalize_date(raw: &str, locale: Locale) -> Result<PartialDate, DateError> {
    let raw = raw.trim();

    if let Some(params) = template_params(raw) {
        if let Some(date) = numeric_params(&params, locale)? {
            return Ok(date);
        }
        return normalize_text(&params.join(" "), locale);
    }

    normalize_text(&without_templates(raw), locale)
}

/// Reject dates after `today` (a later year, or the same year and a later month)
pub fn check_not_future(date: &PartialDate, today: NaiveDate) -> Result<(), FutureDate> {
    let year = date.year_value();
    let later_month = date.month().is_some_and(|m| m > today.month());
    if year > today.year() || (year == today.year() && later_month) {
        return Err(FutureDate {
            date: *date,
            today,
        });
    }
    Ok(())
}

/// Positional parameters of the template `raw` opens with, named ones dropped
///
/// `None` when `raw` does not open with a template or it has no positional
/// parameters.
fn template_params(raw: &str) -> Option<Vec<String>> {
    let body = raw.strip_prefix("{{")?;
    let end = body.find("}}").unwrap_or(body.len());
    let params: Vec<String> = body[..end]
        .split('|')
        .skip(1)
        .map(str::trim)
        .filter(|p| !p.is_empty() && !p.contains('='))
        .map(str::to_string)
        .collect();
    Some(params).filter(|p| !p.is_empty())
}

/// `year|month|day` parameters: a numeric year, a month number or name, a
/// numeric day
///
/// `Ok(None)` when the parameters have some other shape.
fn numeric_params(params: &[String], locale: Locale) -> Result<Option<PartialDate>, DateError> {
    let mut params = params.iter().map(String::as_str);

    let Some(year) = params.next().filter(|p| is_number(p)) else {
        return Ok(None);
    };
    let year = parse_number::<i32>(year)?;

    let month = match params.next() {
        None => return Ok(Some(PartialDate::year(year)?)),
        Some(p) if is_number(p) => parse_number(p)?,
        Some(p) => match resolve_month(p, locale) {
            Some(month) => month,
            None => return Ok(None),
        },
    };

    let date = match params.next() {
        None => PartialDate::year_month(year, month)?,
        Some(p) if is_number(p) => PartialDate::ymd(year, month, parse_number(p)?)?,
        Some(_) => return Ok(None),
    };
    Ok(Some(date))
}

/// `raw` with every `{{...}}` span removed, nested ones included
fn without_templates(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut depth = 0usize;
    let mut rest = raw;

    while let Some(c) = rest.chars().next() {
        if rest.starts_with("{{") {
            if depth == 0 {
                text.push(' ');
            }
            depth += 1;
            rest = &rest[2..];
        } else if depth > 0 && rest.starts_with("}}") {
            depth -= 1;
            rest = &rest[2..];
        } else {
            if depth == 0 {
                text.push(c);
            }
            rest = &rest[c.len_utf8()..];
        }
    }
    text
}

fn normalize_text(raw: &str, locale: Locale) -> Result<PartialDate, DateError> {
    let cleaned = clean(raw);
    if cleaned.is_empty() {
        return Err(DateError::Empty);
    }

    let tokens: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|t| !is_connector(t, locale))
        .collect();
    match tokens.as_slice() {
        [single] => single_token(single),
        [a, b] => month_year(a, b, locale),
        [a, b, c] => full_date([*a, *b, *c], locale),
        _ => Err(DateError::Shape(cleaned.clone())),
    }
}

/// Filler words some locales put between date parts (`5 de mayo de 1862`)
fn is_connector(token: &str, locale: Locale) -> bool {
    match locale {
        Locale::Es => matches!(token.to_lowercase().as_str(), "de" | "del"),
        _ => false,
    }
}

/// Drop commas and brackets, cut at the first character no date uses
fn clean(raw: &str) -> String {
    let stripped = raw.replace([',', '[', ']'], " ");
    let end = stripped
        .char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || c.is_whitespace() || matches!(c, '-' | '.' | '°' | 'º')))
        .map(|(i, _)| i)
        .unwrap_or(stripped.len());
    stripped[..end].trim().to_string()
}

fn parse_number<T: std::str::FromStr>(token: &str) -> Result<T, DateError> {
    token
        .trim()
        .parse()
        .map_err(|_| DateError::Number(token.to_string()))
}

fn parse_day(token: &str) -> Result<u32, DateError> {
    let lowered = token.to_lowercase();
    let digits = ORDINAL_SUFFIXES
        .iter()
        .find_map(|suffix| lowered.strip_suffix(suffix))
        .unwrap_or(lowered.as_str());
    parse_number(digits)
}

fn is_number(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

/// A year, or an ISO `YYYY-MM[-DD]` date
fn single_token(token: &str) -> Result<PartialDate, DateError> {
    if let Ok(date) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
        return Ok(PartialDate::ymd(date.year(), date.month(), date.day())?);
    }

    let parts: Vec<&str> = token.split('-').collect();
    match parts.as_slice() {
        [year] => Ok(PartialDate::year(parse_number(year.trim_end_matches('.'))?)?),
        [year, month] if is_number(year) && is_number(month) => {
            Ok(PartialDate::year_month(parse_number(year)?, parse_number(month)?)?)
        }
        [year, month, day] if is_number(year) && is_number(month) && is_number(day) => {
            // out-of-range components fall through to the domain error
            Ok(PartialDate::ymd(parse_number(year)?, parse_number(month)?, parse_number(day)?)?)
        }
        _ => Err(DateError::Shape(token.to_string())),
    }
}

fn month_of(token: &str, locale: Locale) -> Result<u32, DateError> {
    if let Some(month) = resolve_month(token, locale) {
        return Ok(month);
    }
    if is_number(token) {
        return parse_number(token);
    }
    Err(DateError::Month(token.to_string()))
}

/// `May 1990` or `1990 May`
fn month_year(a: &str, b: &str, locale: Locale) -> Result<PartialDate, DateError> {
    let (month, year) = if resolve_month(a, locale).is_some() || (is_number(a) && a.len() <= 2) {
        (a, b)
    } else {
        (b, a)
    };
    let year = parse_number(year.trim_end_matches('.'))?;
    Ok(PartialDate::year_month(year, month_of(month, locale)?)?)
}

/// Day, month and year in one of the usual orders
fn full_date(tokens: [&str; 3], locale: Locale) -> Result<PartialDate, DateError> {
    let named = tokens.iter().position(|t| resolve_month(t, locale).is_some());

    let (day, month, year) = match named {
        Some(m) => {
            let rest: Vec<&str> = (0..3).filter(|i| *i != m).map(|i| tokens[i]).collect();
            // 12 May 1990, May 12 1990, 1990 May 12, 1990 12 May
            if looks_like_year(rest[0]) && !looks_like_year(rest[1]) {
                (rest[1], tokens[m], rest[0])
            } else {
                (rest[0], tokens[m], rest[1])
            }
        }
        // 1990 05 12
        None if tokens[0].len() == 4 => (tokens[2], tokens[1], tokens[0]),
        // 12 05 1990
        None => (tokens[0], tokens[1], tokens[2]),
    };

    let year = parse_number(year.trim_end_matches('.'))?;
    Ok(PartialDate::ymd(year, month_of(month, locale)?, parse_day(day)?)?)
}

/// Three or more digits, or a number no day can be
fn looks_like_year(token: &str) -> bool {
    let digits = token.trim_end_matches('.');
    is_number(digits) && (digits.len() >= 3 || digits.parse::<u32>().is_ok_and(|n| n > 31))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> PartialDate {
        PartialDate::ymd(y, m, d).unwrap()
    }

    fn en(raw: &str) -> Result<PartialDate, DateError> {
        normalize_date(raw, Locale::En)
    }

    #[test]
    fn test_three_token_orders() {
        assert_eq!(en("12 May 1990"), Ok(ymd(1990, 5, 12)));
        assert_eq!(en("May 12, 1990"), Ok(ymd(1990, 5, 12)));
        assert_eq!(en("12th May 1990"), Ok(ymd(1990, 5, 12)));
        assert_eq!(en("1990 May 12"), Ok(ymd(1990, 5, 12)));
        assert_eq!(en("1990 12 May"), Ok(ymd(1990, 5, 12)));
        assert_eq!(en("12 05 1990"), Ok(ymd(1990, 5, 12)));
        assert_eq!(en("1990 05 12"), Ok(ymd(1990, 5, 12)));
    }

    #[test]
    fn test_two_and_one_tokens() {
        assert_eq!(en("May 1990").ok(), PartialDate::year_month(1990, 5).ok());
        assert_eq!(en("1990 Sept.").ok(), PartialDate::year_month(1990, 9).ok());
        assert_eq!(en("1990").ok(), PartialDate::year(1990).ok());
    }

    #[test]
    fn test_templates() {
        assert_eq!(en("{{birth date|1990|5|12|df=y}}"), Ok(ymd(1990, 5, 12)));
        assert_eq!(en("{{Start date|df=yes|1950|3}}").ok(), PartialDate::year_month(1950, 3).ok());
        assert_eq!(en("{{circa|1850}}").ok(), PartialDate::year(1850).ok());
        assert_eq!(en("{{date|4 March 1950}}"), Ok(ymd(1950, 3, 4)));
        assert_eq!(en("{{Birth date|1990|May|12}}"), Ok(ymd(1990, 5, 12)));
        assert_eq!(
            normalize_date("{{date de naissance|1901|janvier}}", Locale::Fr).ok(),
            PartialDate::year_month(1901, 1).ok()
        );
    }

    #[test]
    fn test_template_never_loses_month_and_day() {
        // an unknown month name is a failure, not a year-only date
        assert!(matches!(en("{{Birth date|1990|Mai|12}}"), Err(DateError::Month(_))));
        assert!(matches!(en("{{Start date|1950|3|mid}}"), Err(DateError::Number(_) | DateError::Month(_))));
    }

    #[test]
    fn test_trailing_templates_are_ignored() {
        assert_eq!(en("12 May 1990 {{citation needed}}"), Ok(ymd(1990, 5, 12)));
        assert_eq!(en("12 May 1990{{sfn|Smith|2001|p=5}}"), Ok(ymd(1990, 5, 12)));
        assert_eq!(en("1901{{efn|Rebuilt in {{circa|1950}}}}").ok(), PartialDate::year(1901).ok());
        assert_eq!(en("{{circa}} 1850").ok(), PartialDate::year(1850).ok());
        assert_eq!(en("{{citation needed}}"), Err(DateError::Empty));
    }

    #[test]
    fn test_without_templates() {
        assert_eq!(without_templates("a{{b|{{c}}}}d").trim(), "a d");
        assert_eq!(without_templates("no templates"), "no templates");
        assert_eq!(without_templates("open {{ended").trim(), "open");
    }

    #[test]
    fn test_iso() {
        assert_eq!(en("1990-05-12"), Ok(ymd(1990, 5, 12)));
        assert_eq!(en("1990-05").ok(), PartialDate::year_month(1990, 5).ok());
    }

    #[test]
    fn test_trailing_prose_is_ignored() {
        assert_eq!(en("12 May 1990 (aged 30)"), Ok(ymd(1990, 5, 12)));
        assert_eq!(en("[[12 May]] [[1990]]"), Ok(ymd(1990, 5, 12)));
    }

    #[test]
    fn test_locales() {
        assert_eq!(normalize_date("1er janvier 1901", Locale::Fr), Ok(ymd(1901, 1, 1)));
        assert_eq!(normalize_date("4 agosto 1950", Locale::It), Ok(ymd(1950, 8, 4)));
        assert_eq!(normalize_date("3. März 1920", Locale::De), Ok(ymd(1920, 3, 3)));
        assert_eq!(normalize_date("5 de mayo de 1862", Locale::Es), Ok(ymd(1862, 5, 5)));
        // English names are understood whatever the locale
        assert_eq!(normalize_date("12 May 1990", Locale::It), Ok(ymd(1990, 5, 12)));
    }

    #[test]
    fn test_parse_failures() {
        assert_eq!(en(""), Err(DateError::Empty));
        assert_eq!(en("(unknown)"), Err(DateError::Empty));
        assert!(matches!(en("12 Foo 1990"), Err(DateError::Number(_) | DateError::Month(_))));
        assert!(matches!(en("one two three four"), Err(DateError::Shape(_))));
        assert!(matches!(en("0 May 1990"), Err(DateError::Invalid(_))));
        assert!(matches!(en("30 February 1990"), Err(DateError::Invalid(_))));
        assert!(matches!(en("0"), Err(DateError::Invalid(_))));
        assert!(matches!(en("{{birth date|1990|0|12}}"), Err(DateError::Invalid(_))));
    }

    #[test]
    fn test_future_gate() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert!(check_not_future(&PartialDate::year(2024).unwrap(), today).is_ok());
        assert!(check_not_future(&ymd(2024, 6, 30), today).is_ok());
        assert!(check_not_future(&PartialDate::year_month(2024, 7).unwrap(), today).is_err());
        assert!(check_not_future(&PartialDate::year(2025).unwrap(), today).is_err());
        assert!(check_not_future(&ymd(1990, 12, 31), today).is_ok());
    }

    #[test]
    fn test_resolve_month() {
        assert_eq!(resolve_month("Sept.", Locale::En), Some(9));
        assert_eq!(resolve_month("août", Locale::Fr), Some(8));
        assert_eq!(resolve_month("August", Locale::Fr), Some(8));
        assert_eq!(resolve_month("août", Locale::En), None);
    }
}
