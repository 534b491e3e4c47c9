//! Command-line arguments of the dashboard binary.

use std::path::PathBuf;

use clap::Parser;

use crate::settings::DashboardSettings;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "bets-dashboard",
    version,
    about = "Interactive dashboard over the top 100 most bet sports matches"
)]
pub struct Cli {
    /// `;`-delimited dataset to open at start-up [default: Top_100_Sports_Bets.csv].
    #[arg(value_name = "DATASET")]
    pub dataset: Option<PathBuf>,
}

impl Cli {
    /// Dashboard settings with the dataset path taken from the command line.
    pub fn into_settings(self) -> DashboardSettings {
        let mut settings = DashboardSettings::default();
        if let Some(path) = self.dataset {
            settings.dataset_path = path;
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn no_argument_keeps_default_dataset() {
        let settings = Cli::try_parse_from(["bets-dashboard"]).unwrap().into_settings();
        assert_eq!(settings, DashboardSettings::default());
    }

    #[test]
    fn positional_argument_names_the_dataset() {
        let settings = Cli::try_parse_from(["bets-dashboard", "data/bets.csv"])
            .unwrap()
            .into_settings();
        assert_eq!(settings.dataset_path, PathBuf::from("data/bets.csv"));
        assert_eq!(settings.top_n, 10);
    }

    #[test]
    fn flags_are_not_taken_as_paths() {
        let err = Cli::try_parse_from(["bets-dashboard", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);

        let err = Cli::try_parse_from(["bets-dashboard", "--verbose"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn second_positional_is_rejected() {
        let err = Cli::try_parse_from(["bets-dashboard", "a.csv", "b.csv"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }
}
