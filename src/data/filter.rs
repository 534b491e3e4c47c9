use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{Dataset, MatchRecord};

// ---------------------------------------------------------------------------
// Filter selection: sports, competitions, inclusive date range
// ---------------------------------------------------------------------------

/// The sidebar's current constraints.
///
/// Unlike a "no filter" convention, an empty set selects nothing, and a
/// range with `start > end` is vacuous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    pub sports: BTreeSet<String>,
    pub competitions: BTreeSet<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FilterSelection {
    /// Everything selected over the dataset's own date bounds. A dataset
    /// without rows gets a one-day range at the Unix epoch, which date
    /// pickers can still step around.
    pub fn all(dataset: &Dataset) -> Self {
        let (start, end) = dataset.date_bounds.unwrap_or_else(|| {
            let epoch = NaiveDate::default();
            (epoch, epoch)
        });
        FilterSelection {
            sports: dataset.sports.iter().cloned().collect(),
            competitions: dataset.competitions.iter().cloned().collect(),
            start,
            end,
        }
    }

    /// Whether a single record passes every constraint.
    pub fn retains(&self, rec: &MatchRecord) -> bool {
        passes(rec, &self.sports, &self.competitions, self.start, self.end)
    }

    /// Apply the selection to a record slice.
    pub fn apply<'a>(&self, records: &'a [MatchRecord]) -> FilteredView<'a> {
        filter_records(records, &self.sports, &self.competitions, self.start, self.end)
    }
}

fn passes(
    rec: &MatchRecord,
    sports: &BTreeSet<String>,
    competitions: &BTreeSet<String>,
    start: NaiveDate,
    end: NaiveDate,
) -> bool {
    sports.contains(&rec.sport)
        && competitions.contains(&rec.competition)
        && start <= rec.date_rencontre
        && rec.date_rencontre <= end
}

/// Keep the records whose sport and competition are selected and whose date
/// lies in `[start, end]`.
pub fn filter_records<'a>(
    records: &'a [MatchRecord],
    sports: &BTreeSet<String>,
    competitions: &BTreeSet<String>,
    start: NaiveDate,
    end: NaiveDate,
) -> FilteredView<'a> {
    FilteredView {
        rows: records
            .iter()
            .filter(|rec| passes(rec, sports, competitions, start, end))
            .collect(),
    }
}

/// Return indices of records passing the selection, in load order.
pub fn filtered_indices(dataset: &Dataset, selection: &FilterSelection) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.retains(rec))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// FilteredView – borrowed subset for one recomputation pass
// ---------------------------------------------------------------------------

/// Records matching the current selection, in load order.
#[derive(Debug, Clone, Default)]
pub struct FilteredView<'a> {
    rows: Vec<&'a MatchRecord>,
}

impl<'a> FilteredView<'a> {
    /// Rebuild a view from indices computed by [`filtered_indices`].
    /// Out-of-range indices are skipped.
    pub fn from_indices(dataset: &'a Dataset, indices: &[usize]) -> Self {
        FilteredView {
            rows: indices
                .iter()
                .filter_map(|&i| dataset.records.get(i))
                .collect(),
        }
    }

    pub fn from_records(records: &'a [MatchRecord]) -> Self {
        FilteredView {
            rows: records.iter().collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a MatchRecord> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            record("Football", "Ligue 1", "2021-05-01", ("PSG", "OM"), 100.0, 10, 5),
            record("Tennis", "Roland Garros", "2022-06-01", ("Nadal", "Djokovic"), 200.0, 20, 8),
            record("Football", "Champions League", "2023-03-15", ("PSG", "Bayern"), 300.0, 30, 12),
        ])
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn full_selection_is_identity() {
        let ds = sample();
        let view = FilterSelection::all(&ds).apply(&ds.records);
        let kept: Vec<&MatchRecord> = view.iter().collect();
        let all: Vec<&MatchRecord> = ds.records.iter().collect();
        assert_eq!(kept, all);
    }

    #[test]
    fn inverted_range_is_empty() {
        let ds = sample();
        let mut sel = FilterSelection::all(&ds);
        sel.start = date("2023-12-31");
        sel.end = date("2020-01-01");
        assert!(sel.apply(&ds.records).is_empty());
        assert!(filtered_indices(&ds, &sel).is_empty());
    }

    #[test]
    fn empty_sets_select_nothing() {
        let ds = sample();
        let (lo, hi) = ds.date_bounds.unwrap();
        assert!(filter_records(&ds.records, &BTreeSet::new(), &set(&["Ligue 1"]), lo, hi).is_empty());
        assert!(filter_records(&ds.records, &set(&["Football"]), &BTreeSet::new(), lo, hi).is_empty());
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let ds = sample();
        let view = filter_records(
            &ds.records,
            &set(&["Football", "Tennis"]),
            &set(&["Ligue 1", "Roland Garros", "Champions League"]),
            date("2021-05-01"),
            date("2022-06-01"),
        );
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn sport_and_competition_combine() {
        let ds = sample();
        let mut sel = FilterSelection::all(&ds);
        sel.sports = set(&["Football"]);
        sel.competitions = set(&["Champions League", "Roland Garros"]);
        assert_eq!(filtered_indices(&ds, &sel), vec![2]);

        sel.sports = set(&["Tennis"]);
        sel.competitions = set(&["L1"]);
        assert!(sel.apply(&ds.records).is_empty());
    }

    #[test]
    fn empty_dataset_range_stays_representable() {
        let ds = Dataset::from_records(Vec::new());
        let sel = FilterSelection::all(&ds);
        assert_eq!(sel.start, sel.end);
        // a month grid needs room on both sides of the selected day
        assert!(sel.start.checked_sub_days(chrono::Days::new(7)).is_some());
        assert!(sel.end.checked_add_days(chrono::Days::new(42)).is_some());
        assert!(sel.apply(&ds.records).is_empty());
    }

    #[test]
    fn view_from_indices_skips_out_of_range() {
        let ds = sample();
        let view = FilteredView::from_indices(&ds, &[2, 0, 7]);
        let teams: Vec<&str> = view.iter().map(|r| r.equipe_2.as_str()).collect();
        assert_eq!(teams, vec!["Bayern", "OM"]);
    }
}
