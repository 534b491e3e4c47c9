use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::color::ColorMap;
use crate::data::aggregate::{
    self, BoxSummary, CategoryMean, CategoryTotal, Histogram, MatchDetails, ScatterPoint,
    TeamCompetitionTotals, YearTotal,
};
use crate::data::cache::DatasetCache;
use crate::data::chart::field;
use crate::data::error::DataError;
use crate::data::filter::{filtered_indices, FilterSelection, FilteredView};
use crate::data::model::Dataset;
use crate::settings::DashboardSettings;

// ---------------------------------------------------------------------------
// Derived views for one pass
// ---------------------------------------------------------------------------

/// Every aggregate the dashboard draws, recomputed after each interaction.
#[derive(Debug, Clone, Default)]
pub struct DashboardViews {
    pub popularity: Vec<CategoryTotal>,
    pub average_stake: Vec<CategoryMean>,
    /// Competitions present in the filtered view, first-seen order.
    pub box_options: Vec<String>,
    pub stake_distribution: Vec<BoxSummary>,
    pub yearly: Vec<YearTotal>,
    pub top_teams: Vec<CategoryTotal>,
    pub scatter: Vec<ScatterPoint>,
    pub histogram: Histogram,
    pub teams: Vec<String>,
    pub team_breakdown: Vec<TeamCompetitionTotals>,
    pub match_keys: Vec<String>,
    /// `None` when nothing is selected or the key went stale.
    pub match_details: Option<MatchDetails>,
}

/// Which multiselect a filter action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Sport,
    Competition,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: DashboardSettings,

    /// Source of the current dataset.
    pub dataset_path: Option<PathBuf>,

    cache: DatasetCache,

    /// Sidebar selection; `None` until a dataset is loaded.
    pub selection: Option<FilterSelection>,

    /// Indices of records passing the current selection.
    pub visible_indices: Vec<usize>,

    /// Competitions shown in the box plot.
    pub box_selection: BTreeSet<String>,

    pub selected_team: Option<String>,
    pub selected_match: Option<String>,

    pub views: DashboardViews,

    /// Colours per sport for the scatter plot.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardSettings::default())
    }
}

impl AppState {
    pub fn new(settings: DashboardSettings) -> Self {
        Self {
            settings,
            dataset_path: None,
            cache: DatasetCache::new(),
            selection: None,
            visible_indices: Vec::new(),
            box_selection: BTreeSet::new(),
            selected_team: None,
            selected_match: None,
            views: DashboardViews::default(),
            color_map: None,
            status_message: None,
        }
    }

    /// The loaded dataset, if any.
    pub fn dataset(&self) -> Option<&Dataset> {
        self.cache.current()
    }

    /// File the displayed dataset was read from.
    pub fn cache_path(&self) -> Option<&Path> {
        self.cache.current_path()
    }

    /// Records passing the current selection.
    pub fn filtered_view(&self) -> FilteredView<'_> {
        match self.dataset() {
            Some(ds) => FilteredView::from_indices(ds, &self.visible_indices),
            None => FilteredView::default(),
        }
    }

    /// Load `path` and reset every selection to its default.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        self.cache
            .get(path)
            .map(|_| ())
            .with_context(|| format!("loading dataset {}", path.display()))?;

        self.dataset_path = Some(path.to_path_buf());
        self.reset_selection();
        self.status_message = None;
        Ok(())
    }

    /// Load `path`, reporting failure in the status bar instead of returning it.
    pub fn open(&mut self, path: &Path) {
        if let Err(e) = self.load(path) {
            log::error!("Failed to load file: {e:#}");
            self.status_message = Some(format!("Error: {e:#}"));
        }
    }

    /// Drop the cached dataset and read the current file again.
    pub fn reload(&mut self) {
        let Some(path) = self.dataset_path.clone() else {
            return;
        };
        self.cache.invalidate();
        self.open(&path);
    }

    /// Reload if the file changed on disk since it was cached.
    fn sync_with_disk(&mut self) {
        let Some(path) = self.dataset_path.clone() else {
            return;
        };
        let loads_before = self.cache.loads();
        match self.cache.get(&path).map(|_| ()) {
            Ok(()) if self.cache.loads() != loads_before => {
                log::info!("{} changed on disk, filters reset", path.display());
                self.status_message = None;
                self.reset_selection();
            }
            Ok(()) => {}
            Err(e) => {
                let e = anyhow::Error::new(e).context(format!("reloading {}", path.display()));
                log::error!("{e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    fn reset_selection(&mut self) {
        let Some(ds) = self.cache.current() else {
            return;
        };
        self.selection = Some(FilterSelection::all(ds));
        self.color_map = Some(ColorMap::new(field::SPORT, &ds.sports));
        self.box_selection = ds.competitions.iter().cloned().collect();
        self.views.box_options = ds.competitions.clone();
        self.selected_team = None;
        self.selected_match = None;
        self.recompute();
    }

    /// Run one filter + aggregate pass after an interaction.
    pub fn refilter(&mut self) {
        self.sync_with_disk();
        self.recompute();
    }

    fn recompute(&mut self) {
        let (Some(ds), Some(selection)) = (self.cache.current(), self.selection.as_ref()) else {
            self.visible_indices.clear();
            self.views = DashboardViews::default();
            return;
        };
        let settings = &self.settings;

        let indices = filtered_indices(ds, selection);
        let view = FilteredView::from_indices(ds, &indices);
        log::debug!("Filtered view: {} of {} matches", view.len(), ds.len());

        let box_options = competitions_in(&view);
        let box_selection = carry_selection(&self.box_selection, &self.views.box_options, &box_options);

        let teams = aggregate::team_names(&view);
        let selected_team = keep_or_first(self.selected_team.as_deref(), &teams);

        let match_keys = aggregate::match_keys(&view);
        let selected_match = keep_or_first(self.selected_match.as_deref(), &match_keys);
        let match_details = selected_match
            .as_deref()
            .map(|key| aggregate::lookup_match(&view, key))
            .and_then(|found| match found {
                Ok(details) => Some(details),
                Err(DataError::MatchNotFound(key)) => {
                    log::debug!("No match '{key}' in the filtered view");
                    None
                }
                Err(e) => {
                    log::warn!("Match lookup failed: {e}");
                    None
                }
            });

        let views = DashboardViews {
            popularity: aggregate::competition_popularity(&view, settings.top_n),
            average_stake: aggregate::average_stake_by_competition(&view),
            stake_distribution: aggregate::stake_distribution(&view, Some(&box_selection)),
            box_options,
            yearly: aggregate::yearly_volume(&view),
            top_teams: aggregate::top_teams(&view, settings.top_n),
            scatter: aggregate::bets_vs_stake(&view),
            histogram: aggregate::stake_histogram(&view, settings.histogram_bins, settings.kde_points),
            team_breakdown: selected_team
                .as_deref()
                .map(|team| aggregate::team_breakdown(&view, team))
                .unwrap_or_default(),
            teams,
            match_keys,
            match_details,
        };

        self.visible_indices = indices;
        self.box_selection = box_selection;
        self.selected_team = selected_team;
        self.selected_match = selected_match;
        self.views = views;
    }

    // -- Sidebar filters --

    fn selected_mut(&mut self, which: FilterField) -> Option<&mut BTreeSet<String>> {
        let selection = self.selection.as_mut()?;
        Some(match which {
            FilterField::Sport => &mut selection.sports,
            FilterField::Competition => &mut selection.competitions,
        })
    }

    /// Every option of a multiselect, in first-seen order.
    pub fn options(&self, which: FilterField) -> Vec<String> {
        self.dataset()
            .map(|ds| match which {
                FilterField::Sport => ds.sports.clone(),
                FilterField::Competition => ds.competitions.clone(),
            })
            .unwrap_or_default()
    }

    pub fn is_selected(&self, which: FilterField, value: &str) -> bool {
        self.selection.as_ref().is_some_and(|sel| match which {
            FilterField::Sport => sel.sports.contains(value),
            FilterField::Competition => sel.competitions.contains(value),
        })
    }

    /// Toggle a single value in a multiselect.
    pub fn toggle_filter_value(&mut self, which: FilterField, value: &str) {
        if let Some(selected) = self.selected_mut(which) {
            if !selected.remove(value) {
                selected.insert(value.to_string());
            }
            self.refilter();
        }
    }

    /// Select all values of a multiselect.
    pub fn select_all(&mut self, which: FilterField) {
        let all = self.options(which);
        if let Some(selected) = self.selected_mut(which) {
            *selected = all.into_iter().collect();
            self.refilter();
        }
    }

    /// Deselect all values of a multiselect.
    pub fn select_none(&mut self, which: FilterField) {
        if let Some(selected) = self.selected_mut(which) {
            selected.clear();
            self.refilter();
        }
    }

    /// Set the inclusive date range. An inverted range empties the view.
    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        if let Some(sel) = self.selection.as_mut() {
            sel.start = start;
            sel.end = end;
            self.refilter();
        }
    }

    // -- Per-chart widgets --

    pub fn toggle_box_competition(&mut self, competition: &str) {
        if !self.box_selection.remove(competition) {
            self.box_selection.insert(competition.to_string());
        }
        self.recompute();
    }

    pub fn select_team(&mut self, team: &str) {
        self.selected_team = Some(team.to_string());
        self.recompute();
    }

    pub fn select_match(&mut self, key: &str) {
        self.selected_match = Some(key.to_string());
        self.recompute();
    }
}

/// Unique competitions of a view in first-seen order.
fn competitions_in(view: &FilteredView<'_>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for rec in view.iter() {
        if !out.contains(&rec.competition) {
            out.push(rec.competition.clone());
        }
    }
    out
}

/// Carry a multiselect across a change of its options: values that are no
/// longer offered are dropped, newly offered values start selected.
fn carry_selection(
    selected: &BTreeSet<String>,
    old_options: &[String],
    new_options: &[String],
) -> BTreeSet<String> {
    new_options
        .iter()
        .filter(|opt| selected.contains(*opt) || !old_options.contains(opt))
        .cloned()
        .collect()
}

/// Keep `current` if it is still offered, otherwise fall back to the first
/// option.
fn keep_or_first(current: Option<&str>, options: &[String]) -> Option<String> {
    match current {
        Some(c) if options.iter().any(|o| o == c) => Some(c.to_string()),
        _ => options.first().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::{Duration, UNIX_EPOCH};

    const DATA: &str = "\
sport;competition;date_rencontre;equipe_1;equipe_2;mises;n_mises;n_joueurs
Football;Ligue 1;2021-05-01;PSG;OM;1 000€;10;5
Tennis;Roland Garros;2022-06-01;Nadal;Djokovic;3 000€;40;8
Football;Champions League;2021-03-15;PSG;Bayern;5 000€;30;12
Football;Ligue 1;2023-02-26;OM;PSG;2 000€;30;9
";

    fn loaded() -> (tempfile::NamedTempFile, AppState) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DATA.as_bytes()).unwrap();
        file.flush().unwrap();
        let mut state = AppState::default();
        state.load(file.path()).unwrap();
        (file, state)
    }

    /// Overwrite `path` with `body` and stamp it with a fixed mtime so the
    /// cache sees a change regardless of filesystem timestamp resolution.
    fn rewrite(path: &Path, body: &str, mtime_secs: u64) {
        let mut file = std::fs::File::create(path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file.set_modified(UNIX_EPOCH + Duration::from_secs(mtime_secs))
            .unwrap();
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn load_selects_everything() {
        let (_file, state) = loaded();
        assert_eq!(state.visible_indices, vec![0, 1, 2, 3]);
        assert_eq!(state.views.popularity.len(), 3);
        assert_eq!(state.views.yearly.len(), 3);
        assert_eq!(state.selected_team.as_deref(), Some("Bayern"));
        assert_eq!(state.selected_match.as_deref(), Some("PSG vs OM"));
        let details = state.views.match_details.as_ref().unwrap();
        assert_eq!(details.amount, "€1,000.0");
        assert_eq!(state.views.box_options, vec!["Ligue 1", "Roland Garros", "Champions League"]);
        assert_eq!(state.views.stake_distribution.len(), 3);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn deselecting_every_sport_empties_all_views() {
        let (_file, mut state) = loaded();
        state.select_none(FilterField::Sport);

        assert!(state.visible_indices.is_empty());
        assert!(state.filtered_view().is_empty());
        let v = &state.views;
        assert!(v.popularity.is_empty());
        assert!(v.top_teams.is_empty());
        assert!(v.teams.is_empty());
        assert!(v.match_keys.is_empty());
        assert!(v.match_details.is_none());
        assert!(state.selected_team.is_none());

        state.select_all(FilterField::Sport);
        assert_eq!(state.visible_indices.len(), 4);
    }

    #[test]
    fn inverted_date_range_is_vacuous() {
        let (_file, mut state) = loaded();
        state.set_date_range(date("2023-01-01"), date("2021-01-01"));
        assert!(state.visible_indices.is_empty());
        assert!(state.views.yearly.is_empty());
    }

    #[test]
    fn stale_team_and_match_fall_back_to_first() {
        let (_file, mut state) = loaded();
        state.select_team("Nadal");
        state.select_match("Nadal vs Djokovic");
        assert_eq!(state.views.team_breakdown.len(), 1);
        assert_eq!(state.views.match_details.as_ref().unwrap().sport, "Tennis");

        state.toggle_filter_value(FilterField::Sport, "Tennis");
        assert_eq!(state.selected_team.as_deref(), Some("Bayern"));
        assert_eq!(state.selected_match.as_deref(), Some("PSG vs OM"));
        assert_eq!(state.views.match_details.as_ref().unwrap().sport, "Football");
    }

    #[test]
    fn box_selection_follows_filtered_competitions() {
        let (_file, mut state) = loaded();
        state.toggle_box_competition("Ligue 1");
        assert_eq!(state.views.stake_distribution.len(), 2);

        state.toggle_filter_value(FilterField::Competition, "Roland Garros");
        assert!(!state.box_selection.contains("Roland Garros"));
        assert!(!state.box_selection.contains("Ligue 1"));

        // Roland Garros comes back selected, Ligue 1 stays deselected
        state.toggle_filter_value(FilterField::Competition, "Roland Garros");
        assert!(state.box_selection.contains("Roland Garros"));
        assert!(!state.box_selection.contains("Ligue 1"));
    }

    #[test]
    fn failed_open_keeps_previous_dataset() {
        let (_file, mut state) = loaded();
        state.open(Path::new("/definitely/not/here.csv"));
        assert!(state.status_message.as_deref().unwrap().starts_with("Error: loading dataset"));
        assert_eq!(state.dataset().map(Dataset::len), Some(4));
        assert_eq!(state.visible_indices.len(), 4);
    }

    #[test]
    fn changed_file_reloads_and_resets_filters() {
        let (file, mut state) = loaded();
        rewrite(file.path(), DATA, 1_000);
        state.refilter();
        state.select_none(FilterField::Sport);
        assert!(state.visible_indices.is_empty());

        let trimmed: String = DATA.lines().take(3).map(|l| format!("{l}\n")).collect();
        rewrite(file.path(), &trimmed, 2_000);
        state.select_none(FilterField::Competition);

        // the reload resets every filter, so the competition toggle is lost
        assert_eq!(state.dataset().map(Dataset::len), Some(2));
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert!(state.is_selected(FilterField::Sport, "Tennis"));
        assert!(state.is_selected(FilterField::Competition, "Ligue 1"));
        assert!(state.status_message.is_none());
    }

    #[test]
    fn broken_file_keeps_dataset_until_fixed() {
        let (file, mut state) = loaded();
        let broken = DATA.replace("2021-05-01", "bad");
        rewrite(file.path(), &broken, 2_000);
        state.select_all(FilterField::Sport);

        let msg = state.status_message.clone().unwrap();
        assert!(msg.starts_with("Error: reloading"), "{msg}");
        assert!(msg.contains("line 2"), "{msg}");
        assert_eq!(state.dataset().map(Dataset::len), Some(4));
        assert_eq!(state.visible_indices.len(), 4);

        let fixed: String = DATA.lines().take(3).map(|l| format!("{l}\n")).collect();
        rewrite(file.path(), &fixed, 3_000);
        state.select_all(FilterField::Sport);

        assert_eq!(state.dataset().map(Dataset::len), Some(2));
        assert!(state.status_message.is_none());
    }

    #[test]
    fn reload_picks_up_unchanged_mtime() {
        let (file, mut state) = loaded();
        rewrite(file.path(), DATA, 1_000);
        state.refilter();
        assert_eq!(state.dataset().map(Dataset::len), Some(4));

        let trimmed: String = DATA.lines().take(2).map(|l| format!("{l}\n")).collect();
        rewrite(file.path(), &trimmed, 1_000);
        state.refilter();
        assert_eq!(state.dataset().map(Dataset::len), Some(4));

        state.reload();
        assert_eq!(state.dataset().map(Dataset::len), Some(1));
        assert_eq!(state.visible_indices, vec![0]);
    }

    #[test]
    fn header_only_file_loads_with_representable_dates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", DATA.lines().next().unwrap()).unwrap();
        file.flush().unwrap();

        let mut state = AppState::default();
        state.load(file.path()).unwrap();
        let sel = state.selection.as_ref().unwrap();
        assert!(state.dataset().unwrap().is_empty());
        assert!(sel.start.checked_sub_days(chrono::Days::new(7)).is_some());
        assert!(sel.end.checked_add_days(chrono::Days::new(42)).is_some());
        assert!(state.visible_indices.is_empty());
        assert!(state.views.match_details.is_none());
    }

    #[test]
    fn carry_selection_rules() {
        let selected: BTreeSet<String> = ["A".to_string()].into_iter().collect();
        let old = vec!["A".to_string(), "B".to_string()];
        let new = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let carried: Vec<String> = carry_selection(&selected, &old, &new).into_iter().collect();
        assert_eq!(carried, vec!["A", "C"]);
    }
}
