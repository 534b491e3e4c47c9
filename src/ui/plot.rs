use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, MarkerShape, Plot, PlotPoints,
    Points,
};

use crate::color;
use crate::data::aggregate::{format_amount, format_count, CategoryTotal};
use crate::data::chart::{self, ChartIntent};
use crate::data::loader::DATE_FORMAT;
use crate::state::AppState;

const CHART_HEIGHT: f32 = 320.0;

/// Selector changes collected while drawing, applied once drawing is done.
enum WidgetAction {
    ToggleBoxCompetition(String),
    SelectTeam(String),
    SelectMatch(String),
}

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render every section of the dashboard in the central panel.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    if state.dataset().is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a betting dataset to start  (File → Open…)");
        });
        return;
    }

    let mut actions: Vec<WidgetAction> = Vec::new();

    ui.heading("📊 Top 100 Sports Bets Analysis");
    ui.label(
        "An analysis of the top 100 most bet sports matches: popularity of competitions, \
         betting trends over time, top teams involved in betting, and more.",
    );
    ui.add_space(8.0);

    overview_table(ui, state);

    let top_n = state.settings.top_n;
    let views = &state.views;

    section(ui, "🏆 Popularity of Competitions");
    horizontal_bars(ui, "popularity", &chart::competition_popularity(top_n), &views.popularity);

    section(ui, "📊 Average Betting Amount per Match by Competition");
    {
        let intent = chart::average_stake();
        let labels: Vec<String> = views.average_stake.iter().map(|c| c.label.clone()).collect();
        let values: Vec<f64> = views.average_stake.iter().map(|c| c.mean).collect();
        vertical_bars(ui, "average_stake", &intent, &labels, &values);
    }

    section(ui, "📦 Distribution of Betting Amounts by Competition");
    ui.label("Select Competitions for Box Plot");
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for competition in &views.box_options {
            let mut checked = state.box_selection.contains(competition);
            if ui.checkbox(&mut checked, competition).changed() {
                actions.push(WidgetAction::ToggleBoxCompetition(competition.clone()));
            }
        }
    });
    box_plot(ui, state);

    section(ui, "📈 Betting Trends Over Time");
    yearly_line(ui, state);

    section(ui, "⚽ Top Teams Involved in Betting");
    horizontal_bars(ui, "top_teams", &chart::top_teams(top_n), &views.top_teams);

    section(ui, "💰 Betting Behavior Analysis");
    ui.columns(2, |cols| {
        cols[0].strong("Correlation Between Number of Bets and Total Amount");
        scatter(&mut cols[0], state);
        cols[1].strong("Distribution of Betting Amounts");
        histogram(&mut cols[1], state);
    });

    section(ui, "🏅 Team Betting Analysis");
    team_section(ui, state, &mut actions);

    section(ui, "🧐 Detailed Match Analysis");
    ui.label("Explore individual matches to understand specific betting behaviors and outcomes.");
    match_section(ui, state, &mut actions);

    ui.separator();
    ui.label(RichText::new("Data Source: ANJ (Autorité Nationale des Jeux)").italics());

    for action in actions {
        match action {
            WidgetAction::ToggleBoxCompetition(c) => state.toggle_box_competition(&c),
            WidgetAction::SelectTeam(t) => state.select_team(&t),
            WidgetAction::SelectMatch(m) => state.select_match(&m),
        }
    }
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(12.0);
    ui.separator();
    ui.heading(title);
}

fn chart_title(ui: &mut Ui, intent: &ChartIntent) {
    ui.label(RichText::new(&intent.title).strong());
}

// ---------------------------------------------------------------------------
// Filtered data overview
// ---------------------------------------------------------------------------

fn overview_table(ui: &mut Ui, state: &AppState) {
    let view = state.filtered_view();
    ui.heading("Filtered Data Overview");
    ui.label(format!("{} matches", view.len()));

    let rows: Vec<_> = view.iter().collect();
    ui.push_id("overview_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .max_scroll_height(240.0)
            .columns(Column::auto().resizable(true), 8)
            .header(20.0, |mut header| {
                for name in [
                    "sport",
                    "competition",
                    "date_rencontre",
                    "equipe_1",
                    "equipe_2",
                    "mises",
                    "n_mises",
                    "n_joueurs",
                ] {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, rows.len(), |mut row| {
                    let rec = rows[row.index()];
                    let cells = [
                        rec.sport.clone(),
                        rec.competition.clone(),
                        rec.date_rencontre.format(DATE_FORMAT).to_string(),
                        rec.equipe_1.clone(),
                        rec.equipe_2.clone(),
                        format_amount(rec.mises),
                        format_count(rec.n_mises),
                        format_count(rec.n_joueurs),
                    ];
                    for cell in cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell);
                        });
                    }
                });
            });
    });
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// Category labels for integer grid marks, blank elsewhere.
fn category_formatter(
    labels: Vec<String>,
) -> impl Fn(egui_plot::GridMark, &std::ops::RangeInclusive<f64>) -> String + 'static {
    move |mark, _range| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

/// Horizontal bars, largest at the top.
fn horizontal_bars(ui: &mut Ui, id: &str, intent: &ChartIntent, data: &[CategoryTotal]) {
    chart_title(ui, intent);
    let values: Vec<f64> = data.iter().map(|c| c.value as f64).collect();
    let colors = color::series_colors(&intent.color, &values);

    // bar i sits at y = n - 1 - i so the first entry is drawn on top
    let n = data.len();
    let mut labels = vec![String::new(); n];
    let bars: Vec<Bar> = data
        .iter()
        .zip(colors)
        .enumerate()
        .map(|(i, (c, fill))| {
            let y = (n - 1 - i) as f64;
            labels[n - 1 - i] = c.label.clone();
            Bar::new(y, c.value as f64)
                .name(format!("{}: {}", c.label, format_count(c.value)))
                .fill(fill)
                .width(0.7)
        })
        .collect();

    Plot::new(id.to_string())
        .height(CHART_HEIGHT)
        .x_axis_label(intent.x_label())
        .y_axis_label(intent.y_label())
        .y_axis_formatter(category_formatter(labels))
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().name(intent.x_label()));
        });
}

fn vertical_bars(ui: &mut Ui, id: &str, intent: &ChartIntent, labels: &[String], values: &[f64]) {
    chart_title(ui, intent);
    let colors = color::series_colors(&intent.color, values);
    let bars: Vec<Bar> = labels
        .iter()
        .zip(values)
        .zip(colors)
        .enumerate()
        .map(|(i, ((label, value), fill))| {
            Bar::new(i as f64, *value)
                .name(format!("{label}: {}", format_amount(*value)))
                .fill(fill)
                .width(0.7)
        })
        .collect();

    Plot::new(id.to_string())
        .height(CHART_HEIGHT)
        .x_axis_label(intent.x_label())
        .y_axis_label(intent.y_label())
        .x_axis_formatter(category_formatter(labels.to_vec()))
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(intent.y_label()));
        });
}

// ---------------------------------------------------------------------------
// Box plot, line, scatter, histogram
// ---------------------------------------------------------------------------

fn box_plot(ui: &mut Ui, state: &AppState) {
    let intent = chart::stake_distribution();
    chart_title(ui, &intent);
    let fill = color::series_colors(&intent.color, &[0.0])[0];
    let summaries = &state.views.stake_distribution;

    let labels: Vec<String> = summaries.iter().map(|s| s.competition.clone()).collect();
    let boxes: Vec<BoxElem> = summaries
        .iter()
        .enumerate()
        .map(|(i, s)| {
            BoxElem::new(
                i as f64,
                BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
            )
            .name(&s.competition)
            .fill(fill.gamma_multiply(0.4))
            .stroke(egui::Stroke::new(1.5, fill))
            .box_width(0.6)
        })
        .collect();
    let outliers: PlotPoints = summaries
        .iter()
        .enumerate()
        .flat_map(|(i, s)| s.outliers.iter().map(move |v| [i as f64, *v]))
        .collect();

    Plot::new("stake_distribution")
        .height(CHART_HEIGHT)
        .x_axis_label(intent.x_label())
        .y_axis_label(intent.y_label())
        .x_axis_formatter(category_formatter(labels))
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(boxes).name(intent.y_label()));
            plot_ui.points(
                Points::new(outliers)
                    .name("outliers")
                    .color(fill)
                    .shape(MarkerShape::Circle)
                    .radius(3.0),
            );
        });
}

fn yearly_line(ui: &mut Ui, state: &AppState) {
    let intent = chart::yearly_volume();
    chart_title(ui, &intent);
    let stroke = color::series_colors(&intent.color, &[0.0])[0];
    let series: Vec<[f64; 2]> = state
        .views
        .yearly
        .iter()
        .map(|y| [y.year as f64, y.n_mises as f64])
        .collect();

    Plot::new("yearly_volume")
        .height(CHART_HEIGHT)
        .x_axis_label(intent.x_label())
        .y_axis_label(intent.y_label())
        .x_axis_formatter(|mark, _range| {
            if mark.value.fract() == 0.0 {
                format!("{}", mark.value as i64)
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(series.clone()))
                    .name(intent.y_label())
                    .color(stroke)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(series))
                    .color(stroke)
                    .shape(MarkerShape::Circle)
                    .radius(4.0),
            );
        });
}

fn scatter(ui: &mut Ui, state: &AppState) {
    let intent = chart::bets_vs_stake();
    chart_title(ui, &intent);
    let sports = state
        .dataset()
        .map(|ds| ds.sports.clone())
        .unwrap_or_default();
    let colors = color::category_colors(&intent.color, state.color_map.as_ref(), &sports);

    Plot::new("bets_vs_stake")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(intent.x_label())
        .y_axis_label(intent.y_label())
        .show(ui, |plot_ui| {
            for (sport, color) in sports.iter().zip(colors) {
                let points: PlotPoints = state
                    .views
                    .scatter
                    .iter()
                    .filter(|p| &p.sport == sport)
                    .map(|p| [p.n_mises as f64, p.mises])
                    .collect();
                plot_ui.points(Points::new(points).name(sport).color(color).radius(3.5));
            }
        });
}

fn histogram(ui: &mut Ui, state: &AppState) {
    let intent = chart::stake_histogram();
    chart_title(ui, &intent);
    let hist = &state.views.histogram;
    let fill = color::series_colors(&intent.color, &[0.0])[0];
    let width = hist.bin_width();

    let bars: Vec<Bar> = hist
        .counts
        .iter()
        .zip(hist.edges.windows(2))
        .map(|(count, edge)| {
            Bar::new((edge[0] + edge[1]) / 2.0, *count as f64)
                .width(width)
                .fill(fill.gamma_multiply(0.5))
                .stroke(egui::Stroke::new(1.0, fill))
        })
        .collect();
    let kde: PlotPoints = hist.kde.iter().copied().collect();

    Plot::new("stake_histogram")
        .height(CHART_HEIGHT)
        .x_axis_label(intent.x_label())
        .y_axis_label(intent.y_label())
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(intent.y_label()));
            plot_ui.line(Line::new(kde).name("density").color(fill).width(2.0));
        });
}

// ---------------------------------------------------------------------------
// Team and match selectors
// ---------------------------------------------------------------------------

fn team_section(ui: &mut Ui, state: &AppState, actions: &mut Vec<WidgetAction>) {
    let views = &state.views;
    let current = state.selected_team.clone().unwrap_or_default();

    egui::ComboBox::from_label("Select a Team for Analysis")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for team in &views.teams {
                if ui.selectable_label(current == *team, team).clicked() {
                    actions.push(WidgetAction::SelectTeam(team.clone()));
                }
            }
        });

    let Some(team) = state.selected_team.as_deref() else {
        ui.label("No team in the current selection.");
        return;
    };
    let intent = chart::team_breakdown(team);
    let labels: Vec<String> = views
        .team_breakdown
        .iter()
        .map(|t| t.competition.clone())
        .collect();
    let values: Vec<f64> = views.team_breakdown.iter().map(|t| t.mises).collect();
    vertical_bars(ui, "team_breakdown", &intent, &labels, &values);

    for t in &views.team_breakdown {
        ui.label(format!(
            "{}: {} bets by {} players",
            t.competition,
            format_count(t.n_mises),
            format_count(t.n_joueurs)
        ));
    }
}

fn match_section(ui: &mut Ui, state: &AppState, actions: &mut Vec<WidgetAction>) {
    let current = state.selected_match.clone().unwrap_or_default();

    egui::ComboBox::from_label("Select a Match to View Details")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for (i, key) in state.views.match_keys.iter().enumerate() {
                // duplicate keys resolve to the first match, so only list each once
                if state.views.match_keys[..i].contains(key) {
                    continue;
                }
                if ui.selectable_label(current == *key, key).clicked() {
                    actions.push(WidgetAction::SelectMatch(key.clone()));
                }
            }
        });

    match &state.views.match_details {
        Some(details) => {
            ui.heading(format!("Match: {}", details.key));
            ui.label(format!("Sport: {}", details.sport));
            ui.label(format!("Competition: {}", details.competition));
            ui.label(format!("Date: {}", details.date));
            ui.label(format!("Total Betting Amount: {}", details.amount));
            ui.label(format!("Number of Bets: {}", details.bets));
            ui.label(format!("Number of Players: {}", details.players));
        }
        None => {
            ui.label("No match selected.");
        }
    }
}
