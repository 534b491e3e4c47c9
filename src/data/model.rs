use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// RawMatchRow – one row exactly as it sits in the file
// ---------------------------------------------------------------------------

/// Columns the loader requires in the header row.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "sport",
    "competition",
    "date_rencontre",
    "equipe_1",
    "equipe_2",
    "mises",
    "n_mises",
    "n_joueurs",
];

/// Uncleaned text of a dataset row. Amount and counts still carry the
/// currency symbol and space thousands separators.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMatchRow {
    pub sport: String,
    pub competition: String,
    pub date_rencontre: String,
    pub equipe_1: String,
    pub equipe_2: String,
    pub mises: String,
    pub n_mises: String,
    pub n_joueurs: String,
}

// ---------------------------------------------------------------------------
// MatchRecord – one cleaned row
// ---------------------------------------------------------------------------

/// A cleaned match: amounts and counts are numeric, the date is parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub sport: String,
    pub competition: String,
    pub date_rencontre: NaiveDate,
    pub equipe_1: String,
    pub equipe_2: String,
    /// Total amount staked, in euros.
    pub mises: f64,
    /// Number of individual bets.
    pub n_mises: u64,
    /// Number of distinct players.
    pub n_joueurs: u64,
}

impl MatchRecord {
    /// Display key used by the match selector: `"<equipe_1> vs <equipe_2>"`.
    pub fn match_key(&self) -> String {
        format!("{} vs {}", self.equipe_1, self.equipe_2)
    }

    pub fn year(&self) -> i32 {
        self.date_rencontre.year()
    }

    /// Whether `team` plays on either side.
    pub fn involves(&self, team: &str) -> bool {
        self.equipe_1 == team || self.equipe_2 == team
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The loaded, read-only table plus the indices the filter widgets need.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All records in file order.
    pub records: Vec<MatchRecord>,
    /// Unique sports in first-seen order.
    pub sports: Vec<String>,
    /// Unique competitions in first-seen order.
    pub competitions: Vec<String>,
    /// Earliest and latest `date_rencontre`, `None` for an empty table.
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
}

impl Dataset {
    /// Build the widget indices from the cleaned records.
    pub fn from_records(records: Vec<MatchRecord>) -> Self {
        let mut sports: Vec<String> = Vec::new();
        let mut competitions: Vec<String> = Vec::new();
        let mut date_bounds: Option<(NaiveDate, NaiveDate)> = None;

        for rec in &records {
            if !sports.contains(&rec.sport) {
                sports.push(rec.sport.clone());
            }
            if !competitions.contains(&rec.competition) {
                competitions.push(rec.competition.clone());
            }
            let d = rec.date_rencontre;
            date_bounds = Some(match date_bounds {
                Some((lo, hi)) => (lo.min(d), hi.max(d)),
                None => (d, d),
            });
        }

        Dataset {
            records,
            sports,
            competitions,
            date_bounds,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
