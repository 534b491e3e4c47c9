use std::path::PathBuf;

/// Dataset read at start-up when no path is given on the command line.
pub const DEFAULT_DATASET: &str = "Top_100_Sports_Bets.csv";

/// Dashboard defaults. Only the dataset path can be overridden, from the
/// command line (see [`crate::cli::Cli`]).
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSettings {
    pub dataset_path: PathBuf,
    /// Length of the "top N" views (competitions, teams).
    pub top_n: usize,
    pub histogram_bins: usize,
    pub kde_points: usize,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET),
            top_n: 10,
            histogram_bins: 20,
            kde_points: 100,
            window_size: [1400.0, 900.0],
            min_window_size: [800.0, 500.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_published_dashboard() {
        let s = DashboardSettings::default();
        assert_eq!(s.dataset_path, PathBuf::from(DEFAULT_DATASET));
        assert_eq!(s.top_n, 10);
        assert_eq!(s.histogram_bins, 20);
        assert_eq!(s.kde_points, 100);
    }
}
