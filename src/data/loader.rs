use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;

use super::error::{DataError, Result};
use super::model::{Dataset, MatchRecord, RawMatchRow, REQUIRED_COLUMNS};

/// Date layout of `date_rencontre`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const CURRENCY_SYMBOL: char = '€';

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the betting dataset from a semicolon-delimited file with a header row.
///
/// The first row that fails cleaning aborts the load; there is no partial
/// dataset.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let file = File::open(path).map_err(|source| DataError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = load_reader(file)?;
    log::info!(
        "Loaded {} matches ({} sports, {} competitions) from {}",
        dataset.len(),
        dataset.sports.len(),
        dataset.competitions.len(),
        path.display()
    );
    Ok(dataset)
}

/// Same as [`load_file`] over any byte source.
pub fn load_reader<R: Read>(source: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|col| !headers.iter().any(|h| h == **col))
    {
        return Err(DataError::MissingColumn(missing.to_string()));
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let raw: RawMatchRow = row.deserialize(Some(&headers))?;
        records.push(clean_row(raw, line)?);
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Cleaning
// ---------------------------------------------------------------------------

/// Apply the cleaning rules in order: amount, counts, date.
pub fn clean_row(raw: RawMatchRow, line: u64) -> Result<MatchRecord> {
    let mises = clean_amount(&raw.mises).ok_or_else(|| DataError::MalformedAmount {
        line,
        value: raw.mises.clone(),
    })?;
    let n_mises = clean_count(&raw.n_mises).ok_or_else(|| DataError::MalformedCount {
        line,
        column: "n_mises",
        value: raw.n_mises.clone(),
    })?;
    let n_joueurs = clean_count(&raw.n_joueurs).ok_or_else(|| DataError::MalformedCount {
        line,
        column: "n_joueurs",
        value: raw.n_joueurs.clone(),
    })?;
    let date_rencontre = parse_date(&raw.date_rencontre).ok_or_else(|| DataError::MalformedDate {
        line,
        value: raw.date_rencontre.clone(),
    })?;

    Ok(MatchRecord {
        sport: raw.sport,
        competition: raw.competition,
        date_rencontre,
        equipe_1: raw.equipe_1,
        equipe_2: raw.equipe_2,
        mises,
        n_mises,
        n_joueurs,
    })
}

/// Strip the currency symbol and every whitespace character, then parse a
/// non-negative finite decimal.
pub fn clean_amount(raw: &str) -> Option<f64> {
    let residual: String = raw
        .chars()
        .filter(|c| *c != CURRENCY_SYMBOL && !c.is_whitespace())
        .collect();
    let value = residual.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Strip every whitespace character (the thousands separator), then parse a
/// non-negative integer.
pub fn clean_count(raw: &str) -> Option<u64> {
    let residual: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    residual.parse::<u64>().ok()
}

/// Parse `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "sport;competition;date_rencontre;equipe_1;equipe_2;mises;n_mises;n_joueurs";

    fn load_str(body: &str) -> Result<Dataset> {
        load_reader(format!("{HEADER}\n{body}").as_bytes())
    }

    #[test]
    fn cleans_the_reference_row() {
        let ds = load_str("Football;L1;2023-01-01;X;Y;1 000€;10;5\n").unwrap();
        assert_eq!(ds.len(), 1);
        let r = &ds.records[0];
        assert_eq!(r.mises, 1000.0);
        assert_eq!(r.n_mises, 10);
        assert_eq!(r.n_joueurs, 5);
        assert_eq!(r.date_rencontre, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
    }

    #[test]
    fn strips_separators_and_symbol_anywhere() {
        assert_eq!(clean_amount("12 345 678.00 €"), Some(12_345_678.0));
        assert_eq!(clean_amount("€ 2 500.5"), Some(2500.5));
        // narrow no-break space, as written by French locales
        assert_eq!(clean_amount("1\u{202f}234\u{a0}€"), Some(1234.0));
        assert_eq!(clean_count(" 1 234 567 "), Some(1_234_567));
    }

    #[test]
    fn cleaning_is_idempotent() {
        for raw in ["1 000€", "2 500.5 €", "0€"] {
            let once = clean_amount(raw).unwrap();
            assert_eq!(clean_amount(&once.to_string()), Some(once));
        }
        for raw in ["12 000", "7"] {
            let once = clean_count(raw).unwrap();
            assert_eq!(clean_count(&once.to_string()), Some(once));
        }
        let d = parse_date("2022-12-18").unwrap();
        assert_eq!(parse_date(&d.format(DATE_FORMAT).to_string()), Some(d));
    }

    #[test]
    fn rejects_negative_and_non_numeric_values() {
        assert_eq!(clean_amount("-5€"), None);
        assert_eq!(clean_amount("abc"), None);
        assert_eq!(clean_amount("€"), None);
        assert_eq!(clean_count("-1"), None);
        assert_eq!(clean_count("1.5"), None);
        assert_eq!(parse_date("18/12/2022"), None);
    }

    #[test]
    fn malformed_fields_abort_with_line_number() {
        let body = "Football;L1;2023-01-01;X;Y;1 000€;10;5\nFootball;L1;2023-01-02;X;Z;lots;10;5\n";
        match load_str(body) {
            Err(DataError::MalformedAmount { line, value }) => {
                assert_eq!(line, 3);
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected: {other:?}"),
        }

        match load_str("Football;L1;2023-01-01;X;Y;1€;ten;5\n") {
            Err(DataError::MalformedCount { column, .. }) => assert_eq!(column, "n_mises"),
            other => panic!("unexpected: {other:?}"),
        }
        match load_str("Football;L1;2023-01-01;X;Y;1€;10;n/a\n") {
            Err(DataError::MalformedCount { column, .. }) => assert_eq!(column, "n_joueurs"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            load_str("Football;L1;01/01/2023;X;Y;1€;10;5\n"),
            Err(DataError::MalformedDate { line: 2, .. })
        ));
    }

    #[test]
    fn missing_column_is_reported() {
        let err = load_reader("sport;competition\nFootball;L1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(col) if col == "date_rencontre"));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, DataError::Load { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "Tennis;Roland Garros;2021-06-13;Djokovic;Tsitsipas;3 456 789€;120 345;45 678").unwrap();
        writeln!(file, "Football;Ligue 1;2022-08-28;PSG;Monaco;2 100 000€;98 000;40 120").unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].n_mises, 120_345);
        assert_eq!(ds.records[1].mises, 2_100_000.0);
        assert_eq!(ds.sports, vec!["Tennis", "Football"]);
    }
}
