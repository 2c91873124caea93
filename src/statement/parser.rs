//! Statement parsing: one uploaded spreadsheet into canonical mutation drafts

use chrono::Datelike;

use crate::statement::row::{classify_row, Cell, RowOutcome};
use crate::types::*;

/// Minimum raw row count for a file to be considered a statement at all
const MIN_RAW_ROWS: usize = 5;

/// Parses the first sheet of a bank-statement export into unmatched
/// [`MutationRecord`] drafts.
///
/// Parsing is synchronous and runs to completion before anything is
/// persisted; a file-level rejection leaves no partial state behind.
/// Malformed rows are skipped silently; only the file-wide outcome is
/// surfaced.
pub struct StatementParser {
    /// Year assumed for 2-part `DD/MM` dates
    reference_year: i32,
}

impl StatementParser {
    /// Create a parser using the current year for 2-part dates
    pub fn new() -> Self {
        Self {
            reference_year: chrono::Utc::now().year(),
        }
    }

    /// Create a parser with a fixed reference year
    pub fn with_reference_year(reference_year: i32) -> Self {
        Self { reference_year }
    }

    /// Parse a raw first-sheet cell grid into ordered unmatched drafts.
    ///
    /// Returns `ReconError::FileFormat` when the file has fewer than
    /// `MIN_RAW_ROWS` raw rows, and the distinct `ReconError::NoDebitRows`
    /// when the file shape was plausible but no outflow row survived
    /// classification.
    pub fn parse(
        &self,
        grid: &[Vec<Cell>],
        business_id: &str,
        branch_id: Option<&str>,
        imported_by: &str,
    ) -> ReconResult<Vec<MutationRecord>> {
        if grid.len() < MIN_RAW_ROWS {
            return Err(ReconError::FileFormat(format!(
                "statement has {} rows, at least {} required",
                grid.len(),
                MIN_RAW_ROWS
            )));
        }

        let mut drafts = Vec::new();
        for row in grid {
            let text = match row.first().and_then(Cell::as_text) {
                Some(text) => text,
                None => continue,
            };

            match classify_row(text, self.reference_year) {
                RowOutcome::Parsed(parsed) => drafts.push(MutationRecord::draft(
                    business_id.to_string(),
                    branch_id.map(str::to_string),
                    parsed.date,
                    parsed.description,
                    parsed.amount,
                    imported_by.to_string(),
                )),
                RowOutcome::Skip(_) => continue,
            }
        }

        if drafts.is_empty() {
            return Err(ReconError::NoDebitRows);
        }

        Ok(drafts)
    }
}

impl Default for StatementParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn text_row(line: &str) -> Vec<Cell> {
        vec![Cell::from(line)]
    }

    /// A plausible export: header clutter, debit rows, one credit row.
    fn sample_grid() -> Vec<Vec<Cell>> {
        vec![
            text_row("Laporan Rekening Koran"),
            text_row("Periode: Januari 2024"),
            text_row(r#"02/01/2024,"Bayar Listrik",123,"150.000 DB""#),
            text_row(r#"03/01/2024,"Setoran Tunai",123,"200.000 CR""#),
            text_row(r#"05/01/2024,"Transfer Kas Cabang",123,"500.000 DB""#),
            text_row("Saldo Akhir,,,"),
        ]
    }

    #[test]
    fn test_rejects_file_with_too_few_rows() {
        let parser = StatementParser::with_reference_year(2024);
        let grid = vec![
            text_row(r#"02/01/2024,"Bayar Listrik",123,"150.000 DB""#),
            text_row(r#"03/01/2024,"Bayar Air",123,"50.000 DB""#),
        ];

        let err = parser.parse(&grid, "biz1", None, "op1").unwrap_err();
        assert!(matches!(err, ReconError::FileFormat(_)));
    }

    #[test]
    fn test_no_debit_rows_is_distinct_from_invalid_file() {
        let parser = StatementParser::with_reference_year(2024);
        let grid = vec![
            text_row("Laporan Rekening Koran"),
            text_row("Periode: Januari 2024"),
            text_row(r#"03/01/2024,"Setoran Tunai",123,"200.000 CR""#),
            text_row(r#"04/01/2024,"Bunga",123,"1.000 CR""#),
            text_row("Saldo Akhir,,,"),
        ];

        let err = parser.parse(&grid, "biz1", None, "op1").unwrap_err();
        assert!(matches!(err, ReconError::NoDebitRows));
    }

    #[test]
    fn test_parses_debit_rows_only() {
        let parser = StatementParser::with_reference_year(2024);
        let drafts = parser
            .parse(&sample_grid(), "biz1", Some("branch1"), "op1")
            .unwrap();

        assert_eq!(drafts.len(), 2);
        for draft in &drafts {
            assert!(draft.amount < BigDecimal::from(0));
            assert_eq!(draft.direction, Direction::Debit);
            assert_eq!(draft.status, MutationStatus::Unmatched);
            assert_eq!(draft.business_id, "biz1");
            assert_eq!(draft.branch_id.as_deref(), Some("branch1"));
            assert_eq!(draft.imported_by, "op1");
        }

        let first = &drafts[0];
        assert_eq!(first.transaction_date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(first.description, "Bayar Listrik");
        assert_eq!(first.amount, BigDecimal::from(-150000));
    }

    #[test]
    fn test_non_text_first_cells_are_skipped() {
        let parser = StatementParser::with_reference_year(2024);
        let grid = vec![
            vec![Cell::Number(1.0), Cell::from("junk")],
            vec![Cell::Empty],
            text_row("Periode: Januari 2024"),
            text_row(r#"02/01/2024,"Bayar Listrik",123,"150.000 DB""#),
            vec![Cell::Bool(true)],
        ];

        let drafts = parser.parse(&grid, "biz1", None, "op1").unwrap();
        assert_eq!(drafts.len(), 1);
    }

    #[test]
    fn test_two_part_date_assumes_reference_year() {
        let parser = StatementParser::with_reference_year(2025);
        let grid = vec![
            text_row("header"),
            text_row("header"),
            text_row(r#"05/03,"Bayar Air",123,"10.000 DB""#),
            text_row("footer"),
            text_row("footer"),
        ];

        let drafts = parser.parse(&grid, "biz1", None, "op1").unwrap();
        assert_eq!(
            drafts[0].transaction_date,
            NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()
        );
    }

    #[test]
    fn test_default_parser_uses_current_year() {
        let parser = StatementParser::new();
        let grid = vec![
            text_row("header"),
            text_row("header"),
            text_row(r#"05/03,"Bayar Air",123,"10.000 DB""#),
            text_row("footer"),
            text_row("footer"),
        ];

        let drafts = parser.parse(&grid, "biz1", None, "op1").unwrap();
        assert_eq!(
            drafts[0].transaction_date.year(),
            chrono::Utc::now().year()
        );
    }

    #[test]
    fn test_identical_rows_produce_identical_dedup_keys() {
        let parser = StatementParser::with_reference_year(2024);
        let first = parser.parse(&sample_grid(), "biz1", None, "op1").unwrap();
        let second = parser.parse(&sample_grid(), "biz1", None, "op1").unwrap();

        let first_keys: Vec<_> = first.iter().map(|d| d.dedup_key.clone()).collect();
        let second_keys: Vec<_> = second.iter().map(|d| d.dedup_key.clone()).collect();
        assert_eq!(first_keys, second_keys);

        // Drafts themselves are distinct records.
        assert_ne!(first[0].id, second[0].id);
    }
}
