//! Row-level grammar for bank-statement export files
//!
//! Export files arrive as loosely structured spreadsheets: each data row is a
//! comma-joined line in the first cell, with shifting columns and more than
//! one marker convention. The classifier here turns one raw row into either a
//! `ParsedRow` or a named skip reason; mapping to mutation drafts happens in
//! [`super::parser`].

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Marker substring identifying an outflow amount token
const OUTFLOW_MARKER: &str = "DB";
/// Marker substring identifying an inflow amount token
const INFLOW_MARKER: &str = "CR";

/// One spreadsheet cell as delivered by the upstream file reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl Cell {
    /// The cell's text content, if it is a text cell
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

/// Successfully classified statement row, amount still positive
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub date: NaiveDate,
    pub description: String,
    pub amount: BigDecimal,
}

/// Why a row was discarded without failing the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// First cell is not text or does not start with a `DD/MM[/YYYY]` date
    NotDated,
    /// Fewer than four comma tokens
    TooFewTokens,
    /// Neither candidate amount token carries a CR/DB marker
    NoAmountMarker,
    /// Resolved amount token carries the CR marker; this pipeline only
    /// ingests outflows
    Inflow,
    /// Amount is unparsable or not strictly positive after stripping
    BadAmount,
}

/// Outcome of classifying one raw row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Parsed(ParsedRow),
    Skip(SkipReason),
}

/// Classify one raw statement row.
///
/// `reference_year` fills in the year for 2-part `DD/MM` dates.
pub fn classify_row(text: &str, reference_year: i32) -> RowOutcome {
    let tokens = tokenize(text);

    let date = match tokens.first().and_then(|t| parse_date_prefix(t, reference_year)) {
        Some(date) => date,
        None => return RowOutcome::Skip(SkipReason::NotDated),
    };

    if tokens.len() < 4 {
        return RowOutcome::Skip(SkipReason::TooFewTokens);
    }

    let description = strip_quotes(&tokens[1]).to_string();

    // Column positions shift between export variants: the marker usually
    // rides on token[3], but some files push it to token[4].
    let marked = [&tokens[3]]
        .into_iter()
        .chain(tokens.get(4))
        .map(|t| strip_quotes(t))
        .find(|t| has_marker(t));
    let amount_token = match marked {
        Some(token) => token,
        None => return RowOutcome::Skip(SkipReason::NoAmountMarker),
    };

    if amount_token.contains(INFLOW_MARKER) {
        return RowOutcome::Skip(SkipReason::Inflow);
    }

    match parse_amount(amount_token) {
        Some(amount) => RowOutcome::Parsed(ParsedRow {
            date,
            description,
            amount,
        }),
        None => RowOutcome::Skip(SkipReason::BadAmount),
    }
}

/// Quote-aware comma split; tokens are trimmed but keep their quotes
pub(crate) fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => {
                tokens.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    tokens.push(current.trim().to_string());
    tokens
}

/// Strip one pair of surrounding double quotes, if present
pub(crate) fn strip_quotes(token: &str) -> &str {
    let trimmed = token.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
}

fn has_marker(token: &str) -> bool {
    token.contains(OUTFLOW_MARKER) || token.contains(INFLOW_MARKER)
}

/// Parse a `DD/MM[/YYYY]`-style date prefix.
///
/// Three parts give the full date; two parts assume `reference_year`.
/// Trailing non-digit characters after the month or year are tolerated
/// (`DD/MM/YYYY...` shapes); a calendar-invalid date yields `None`.
fn parse_date_prefix(token: &str, reference_year: i32) -> Option<NaiveDate> {
    let parts: Vec<&str> = token.trim().split('/').collect();

    let (day_part, month_part, year_part) = match parts.as_slice() {
        [d, m] => (*d, *m, None),
        [d, m, y] => (*d, *m, Some(*y)),
        _ => return None,
    };

    let day: u32 = day_part.trim().parse().ok()?;
    let month: u32 = leading_digits(month_part).parse().ok()?;
    let year: i32 = match year_part {
        Some(y) => {
            let digits = leading_digits(y);
            if digits.len() < 4 {
                return None;
            }
            digits[..4].parse().ok()?
        }
        None => reference_year,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

fn leading_digits(s: &str) -> &str {
    let end = s
        .trim()
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.trim().len());
    &s.trim()[..end]
}

/// Parse an amount token that carried the outflow marker.
///
/// The marker and locale thousands separators (`.` and `,`) are simply
/// stripped, not reformatted; the remainder must parse as a strictly
/// positive decimal.
fn parse_amount(token: &str) -> Option<BigDecimal> {
    let cleaned: String = token
        .replace(OUTFLOW_MARKER, "")
        .chars()
        .filter(|c| !matches!(c, '.' | ',' | ' '))
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let amount = BigDecimal::from_str(&cleaned).ok()?;
    if amount > BigDecimal::from(0) {
        Some(amount)
    } else {
        None
    }
}
