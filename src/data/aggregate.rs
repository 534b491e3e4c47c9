//! Aggregate views over a [`FilteredView`], one per dashboard chart.
//!
//! All functions are pure. An empty view gives an empty result, never an
//! error. Sorted views build their groups in first-seen order and sort
//! stably, so ties keep the order in which the groups first appeared.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::error::{DataError, Result};
use super::filter::FilteredView;
use super::loader::DATE_FORMAT;

// ---------------------------------------------------------------------------
// Result rows
// ---------------------------------------------------------------------------

/// A category with an integer total (bets, appearances).
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub label: String,
    pub value: u64,
}

/// A category with a mean amount.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMean {
    pub label: String,
    pub mean: f64,
}

/// Five-number summary of one competition's stakes plus its outliers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub competition: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Most extreme values still inside `q1 - 1.5 IQR` / `q3 + 1.5 IQR`.
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
    /// Raw stakes in view order.
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearTotal {
    pub year: i32,
    pub n_mises: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub n_mises: u64,
    pub mises: f64,
    pub sport: String,
}

/// One competition's sums for a single team.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamCompetitionTotals {
    pub competition: String,
    pub mises: f64,
    pub n_mises: u64,
    pub n_joueurs: u64,
}

/// Equal-width histogram of stakes with a count-scaled density curve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` bin edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    /// `(x, estimated count)` points, empty when a density cannot be estimated.
    pub kde: Vec<[f64; 2]>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        match self.edges.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }
}

/// A single match formatted for display.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchDetails {
    pub key: String,
    pub sport: String,
    pub competition: String,
    pub date: String,
    pub amount: String,
    pub bets: String,
    pub players: String,
}

// ---------------------------------------------------------------------------
// Grouped views
// ---------------------------------------------------------------------------

/// Sum `n_mises` per competition, descending, first `limit` entries.
pub fn competition_popularity(view: &FilteredView<'_>, limit: usize) -> Vec<CategoryTotal> {
    let mut totals = sum_first_seen(view.iter().map(|r| (r.competition.as_str(), r.n_mises)));
    totals.sort_by(|a, b| b.value.cmp(&a.value));
    totals.truncate(limit);
    totals
}

/// Mean `mises` per competition, descending, every competition.
pub fn average_stake_by_competition(view: &FilteredView<'_>) -> Vec<CategoryMean> {
    let mut order: Vec<&str> = Vec::new();
    let mut acc: HashMap<&str, (f64, u64)> = HashMap::new();
    for rec in view.iter() {
        let entry = acc.entry(rec.competition.as_str()).or_insert_with(|| {
            order.push(rec.competition.as_str());
            (0.0, 0)
        });
        entry.0 += rec.mises;
        entry.1 += 1;
    }

    let mut means: Vec<CategoryMean> = order
        .into_iter()
        .map(|label| {
            let (sum, n) = acc[label];
            CategoryMean {
                label: label.to_string(),
                mean: sum / n as f64,
            }
        })
        .collect();
    means.sort_by(|a, b| b.mean.total_cmp(&a.mean));
    means
}

/// Per-competition stake summaries, alphabetical by competition.
///
/// `only` restricts the output to the given competitions; `None` keeps all.
pub fn stake_distribution(
    view: &FilteredView<'_>,
    only: Option<&BTreeSet<String>>,
) -> Vec<BoxSummary> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for rec in view.iter() {
        if only.is_some_and(|keep| !keep.contains(&rec.competition)) {
            continue;
        }
        groups.entry(rec.competition.as_str()).or_default().push(rec.mises);
    }
    groups
        .into_iter()
        .filter_map(|(competition, values)| box_summary(competition, values))
        .collect()
}

/// Quartiles, whiskers and outliers of `values`; `None` when empty.
pub fn box_summary(competition: &str, values: Vec<f64>) -> Option<BoxSummary> {
    let mut sorted = values.clone();
    sorted.sort_by(f64::total_cmp);
    let (&min, &max) = (sorted.first()?, sorted.last()?);

    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    let lower_whisker = sorted.iter().copied().find(|v| *v >= lo_fence).unwrap_or(q1);
    let upper_whisker = sorted.iter().rev().copied().find(|v| *v <= hi_fence).unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < lo_fence || *v > hi_fence)
        .collect();

    Some(BoxSummary {
        competition: competition.to_string(),
        min,
        q1,
        median,
        q3,
        max,
        lower_whisker,
        upper_whisker,
        outliers,
        values,
    })
}

/// Linear interpolation between closest ranks over sorted, non-empty data.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Sum `n_mises` per calendar year, ascending by year.
pub fn yearly_volume(view: &FilteredView<'_>) -> Vec<YearTotal> {
    let mut years: BTreeMap<i32, u64> = BTreeMap::new();
    for rec in view.iter() {
        *years.entry(rec.year()).or_default() += rec.n_mises;
    }
    years
        .into_iter()
        .map(|(year, n_mises)| YearTotal { year, n_mises })
        .collect()
}

/// Count appearances on either side, descending, first `limit` teams.
///
/// Ties keep first-seen order over all `equipe_1` values followed by all
/// `equipe_2` values. A team facing itself counts twice.
pub fn top_teams(view: &FilteredView<'_>, limit: usize) -> Vec<CategoryTotal> {
    let sides = view
        .iter()
        .map(|r| r.equipe_1.as_str())
        .chain(view.iter().map(|r| r.equipe_2.as_str()));
    let mut counts = sum_first_seen(sides.map(|team| (team, 1)));
    counts.sort_by(|a, b| b.value.cmp(&a.value));
    counts.truncate(limit);
    counts
}

/// Raw `(n_mises, mises)` pairs labelled by sport, in view order.
pub fn bets_vs_stake(view: &FilteredView<'_>) -> Vec<ScatterPoint> {
    view.iter()
        .map(|r| ScatterPoint {
            n_mises: r.n_mises,
            mises: r.mises,
            sport: r.sport.clone(),
        })
        .collect()
}

/// Sums of stakes, bets and players per competition for matches involving
/// `team`, alphabetical by competition.
pub fn team_breakdown(view: &FilteredView<'_>, team: &str) -> Vec<TeamCompetitionTotals> {
    let mut groups: BTreeMap<&str, TeamCompetitionTotals> = BTreeMap::new();
    for rec in view.iter().filter(|r| r.involves(team)) {
        let entry = groups
            .entry(rec.competition.as_str())
            .or_insert_with(|| TeamCompetitionTotals {
                competition: rec.competition.clone(),
                mises: 0.0,
                n_mises: 0,
                n_joueurs: 0,
            });
        entry.mises += rec.mises;
        entry.n_mises += rec.n_mises;
        entry.n_joueurs += rec.n_joueurs;
    }
    groups.into_values().collect()
}

/// Sorted, de-duplicated team names from both sides.
pub fn team_names(view: &FilteredView<'_>) -> Vec<String> {
    view.iter()
        .flat_map(|r| [r.equipe_1.as_str(), r.equipe_2.as_str()])
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Bin stakes into `bins` equal-width bins over `[min, max]` and estimate a
/// Gaussian density at `kde_points` evenly spaced positions.
pub fn stake_histogram(view: &FilteredView<'_>, bins: usize, kde_points: usize) -> Histogram {
    let values: Vec<f64> = view.iter().map(|r| r.mises).collect();
    histogram(&values, bins, kde_points)
}

pub fn histogram(values: &[f64], bins: usize, kde_points: usize) -> Histogram {
    if values.is_empty() || bins == 0 {
        return Histogram::default();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if (max - min).abs() < f64::EPSILON {
        return Histogram {
            edges: vec![min - 0.5, min + 0.5],
            counts: vec![values.len()],
            kde: Vec::new(),
        };
    }

    let width = (max - min) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| min + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for &v in values {
        // last bin is closed on the right
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let kde = kde_curve(values, min, max, kde_points)
        .into_iter()
        .map(|[x, density]| [x, density * values.len() as f64 * width])
        .collect();

    Histogram { edges, counts, kde }
}

/// Gaussian KDE with Scott's bandwidth, evaluated over `[lo, hi]`.
fn kde_curve(values: &[f64], lo: f64, hi: f64, points: usize) -> Vec<[f64; 2]> {
    let n = values.len();
    if n < 2 || points < 2 {
        return Vec::new();
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let sd = var.sqrt();
    if sd <= 0.0 || !sd.is_finite() {
        return Vec::new();
    }

    let bw = sd * (n as f64).powf(-0.2);
    let norm = 1.0 / (n as f64 * bw * (2.0 * std::f64::consts::PI).sqrt());
    let step = (hi - lo) / (points - 1) as f64;
    (0..points)
        .map(|i| {
            let x = lo + step * i as f64;
            let density: f64 = values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bw).powi(2)).exp())
                .sum::<f64>()
                * norm;
            [x, density]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Single-match lookup
// ---------------------------------------------------------------------------

/// Match selector keys, `"<equipe_1> vs <equipe_2>"` in view order.
pub fn match_keys(view: &FilteredView<'_>) -> Vec<String> {
    view.iter().map(|r| r.match_key()).collect()
}

/// The first record whose key equals `key`, formatted for display.
pub fn lookup_match(view: &FilteredView<'_>, key: &str) -> Result<MatchDetails> {
    let rec = view
        .iter()
        .find(|r| r.match_key() == key)
        .ok_or_else(|| DataError::MatchNotFound(key.to_string()))?;

    Ok(MatchDetails {
        key: key.to_string(),
        sport: rec.sport.clone(),
        competition: rec.competition.clone(),
        date: rec.date_rencontre.format(DATE_FORMAT).to_string(),
        amount: format_amount(rec.mises),
        bets: format_count(rec.n_mises),
        players: format_count(rec.n_joueurs),
    })
}

// ---------------------------------------------------------------------------
// Display formatting
// ---------------------------------------------------------------------------

/// `€` plus the amount with comma thousands separators and at least one
/// decimal: `1000.0` → `€1,000.0`.
pub fn format_amount(value: f64) -> String {
    // Display keeps the shortest round-trip digits and never switches to an
    // exponent
    let text = value.to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "0"));
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };
    format!("{sign}€{}.{frac_part}", group_thousands(digits))
}

/// Comma thousands separators: `12345` → `12,345`.
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Sum values per key, keeping keys in first-seen order.
fn sum_first_seen<'k>(pairs: impl Iterator<Item = (&'k str, u64)>) -> Vec<CategoryTotal> {
    let mut index: HashMap<&'k str, usize> = HashMap::new();
    let mut out: Vec<CategoryTotal> = Vec::new();
    for (key, value) in pairs {
        match index.get(key) {
            Some(&i) => out[i].value += value,
            None => {
                index.insert(key, out.len());
                out.push(CategoryTotal {
                    label: key.to_string(),
                    value,
                });
            }
        }
    }
    out
}
