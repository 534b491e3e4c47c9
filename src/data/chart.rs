//! Declarative chart intent handed to the rendering surface alongside each
//! aggregate view. Nothing here draws.

/// Field names shared by the dataset and the aggregate views.
pub mod field {
    pub const SPORT: &str = "sport";
    pub const COMPETITION: &str = "competition";
    pub const MISES: &str = "mises";
    pub const N_MISES: &str = "n_mises";
    pub const N_JOUEURS: &str = "n_joueurs";
    pub const YEAR: &str = "year";
    pub const TEAM: &str = "team";
    pub const COUNT: &str = "count";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    HorizontalBar,
    Bar,
    Box,
    Line,
    Scatter,
    Histogram,
}

/// Continuous colour scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScale {
    Viridis,
    Magma,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColorMapping {
    /// One colour for every mark.
    Fixed([u8; 3]),
    /// Marks coloured by a numeric field along a scale.
    Continuous {
        field: &'static str,
        scale: ColorScale,
    },
    /// One palette colour per distinct value of a categorical field.
    Categorical { field: &'static str },
}

pub const BLUE: [u8; 3] = [99, 110, 250];
pub const ORANGE: [u8; 3] = [255, 165, 0];
pub const GREEN: [u8; 3] = [0, 128, 0];

/// What a chart should look like, independent of how it is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartIntent {
    pub kind: ChartKind,
    pub title: String,
    pub x_field: &'static str,
    pub y_field: &'static str,
    /// Display label overrides: field name → axis label.
    pub labels: Vec<(&'static str, &'static str)>,
    pub color: ColorMapping,
}

impl ChartIntent {
    /// Display label for `field`, falling back to the field name.
    pub fn label(&self, field: &'static str) -> &'static str {
        self.labels
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, label)| *label)
            .unwrap_or(field)
    }

    pub fn x_label(&self) -> &'static str {
        self.label(self.x_field)
    }

    pub fn y_label(&self) -> &'static str {
        self.label(self.y_field)
    }
}

const NUMBER_OF_BETS: &str = "Number of Bets";
const TOTAL_AMOUNT: &str = "Total Betting Amount (€)";
const COMPETITION: &str = "Competition";

pub fn competition_popularity(top_n: usize) -> ChartIntent {
    ChartIntent {
        kind: ChartKind::HorizontalBar,
        title: format!("Top {top_n} Competitions by Number of Bets"),
        x_field: field::N_MISES,
        y_field: field::COMPETITION,
        labels: vec![(field::N_MISES, NUMBER_OF_BETS), (field::COMPETITION, COMPETITION)],
        color: ColorMapping::Continuous {
            field: field::N_MISES,
            scale: ColorScale::Viridis,
        },
    }
}

pub fn average_stake() -> ChartIntent {
    ChartIntent {
        kind: ChartKind::Bar,
        title: "Average Betting Amount (€) per Match by Competition".to_string(),
        x_field: field::COMPETITION,
        y_field: field::MISES,
        labels: vec![
            (field::MISES, "Average Betting Amount (€)"),
            (field::COMPETITION, COMPETITION),
        ],
        color: ColorMapping::Fixed(BLUE),
    }
}

pub fn stake_distribution() -> ChartIntent {
    ChartIntent {
        kind: ChartKind::Box,
        title: "Betting Amounts Distribution by Competition".to_string(),
        x_field: field::COMPETITION,
        y_field: field::MISES,
        labels: vec![(field::MISES, TOTAL_AMOUNT), (field::COMPETITION, COMPETITION)],
        color: ColorMapping::Fixed(BLUE),
    }
}

pub fn yearly_volume() -> ChartIntent {
    ChartIntent {
        kind: ChartKind::Line,
        title: "Total Number of Bets Over Years".to_string(),
        x_field: field::YEAR,
        y_field: field::N_MISES,
        labels: vec![(field::YEAR, "Year"), (field::N_MISES, NUMBER_OF_BETS)],
        color: ColorMapping::Fixed(ORANGE),
    }
}

pub fn top_teams(top_n: usize) -> ChartIntent {
    ChartIntent {
        kind: ChartKind::HorizontalBar,
        title: format!("Top {top_n} Teams Involved in Bets"),
        x_field: field::COUNT,
        y_field: field::TEAM,
        labels: vec![(field::COUNT, "Number of Appearances"), (field::TEAM, "Team")],
        color: ColorMapping::Continuous {
            field: field::COUNT,
            scale: ColorScale::Magma,
        },
    }
}

pub fn bets_vs_stake() -> ChartIntent {
    ChartIntent {
        kind: ChartKind::Scatter,
        title: "Number of Bets vs Total Betting Amount".to_string(),
        x_field: field::N_MISES,
        y_field: field::MISES,
        labels: vec![(field::N_MISES, NUMBER_OF_BETS), (field::MISES, TOTAL_AMOUNT)],
        color: ColorMapping::Categorical { field: field::SPORT },
    }
}

pub fn stake_histogram() -> ChartIntent {
    ChartIntent {
        kind: ChartKind::Histogram,
        title: "Distribution of Betting Amounts".to_string(),
        x_field: field::MISES,
        y_field: field::COUNT,
        labels: vec![(field::MISES, TOTAL_AMOUNT), (field::COUNT, "Frequency")],
        color: ColorMapping::Fixed(GREEN),
    }
}

pub fn team_breakdown(team: &str) -> ChartIntent {
    ChartIntent {
        kind: ChartKind::Bar,
        title: format!("Total Betting Amount for {team} by Competition"),
        x_field: field::COMPETITION,
        y_field: field::MISES,
        labels: vec![(field::MISES, TOTAL_AMOUNT), (field::COMPETITION, COMPETITION)],
        color: ColorMapping::Fixed(BLUE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_fall_back_to_field_names() {
        let intent = competition_popularity(10);
        assert_eq!(intent.title, "Top 10 Competitions by Number of Bets");
        assert_eq!(intent.x_label(), "Number of Bets");
        assert_eq!(intent.y_label(), "Competition");
        assert_eq!(intent.label(field::N_JOUEURS), "n_joueurs");
    }

    #[test]
    fn team_title_names_the_team() {
        let intent = team_breakdown("PSG");
        assert_eq!(intent.kind, ChartKind::Bar);
        assert_eq!(intent.title, "Total Betting Amount for PSG by Competition");
    }
}
