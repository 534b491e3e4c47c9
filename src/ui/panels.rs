use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::state::{AppState, FilterField};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    if state.dataset().is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            multiselect(ui, state, FilterField::Sport, "Select Sport");
            multiselect(ui, state, FilterField::Competition, "Select Competition");
            ui.separator();
            date_range(ui, state);
        });
}

/// Collapsible checkbox list with All / None buttons.
fn multiselect(ui: &mut Ui, state: &mut AppState, which: FilterField, title: &str) {
    let options = state.options(which);
    let n_selected = options
        .iter()
        .filter(|v| state.is_selected(which, v))
        .count();
    let header_text = format!("{title}  ({n_selected}/{})", options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(which);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(which);
                }
            });

            for value in &options {
                let mut checked = state.is_selected(which, value);
                let mut text = RichText::new(value);
                if which == FilterField::Sport {
                    if let Some(cm) = &state.color_map {
                        text = text.color(cm.color_for(value));
                    }
                }
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_filter_value(which, value);
                }
            }
        });
}

fn date_range(ui: &mut Ui, state: &mut AppState) {
    if state.dataset().is_some_and(|ds| ds.date_bounds.is_none()) {
        ui.strong("Select Date Range");
        ui.label("No dated matches in this file.");
        return;
    }
    let Some(sel) = &state.selection else {
        return;
    };
    let (mut start, mut end) = (sel.start, sel.end);

    ui.strong("Select Date Range");
    let mut changed = false;
    egui::Grid::new("date_range").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("From");
        changed |= ui
            .add(DatePickerButton::new(&mut start).id_salt("start_date"))
            .changed();
        ui.end_row();
        ui.label("To");
        changed |= ui
            .add(DatePickerButton::new(&mut end).id_salt("end_date"))
            .changed();
        ui.end_row();
    });

    if start > end {
        ui.label(RichText::new("Start is after end: nothing matches.").color(Color32::YELLOW));
    }
    if changed {
        state.set_date_range(start, end);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_reload = state.dataset_path.is_some();
            if ui.add_enabled(can_reload, egui::Button::new("Reload")).clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = state.dataset() {
            let source = state
                .cache_path()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!(
                "{source}: {} matches loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open betting dataset")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
        if let Some(ds) = state.dataset() {
            log::info!(
                "{} matches across sports {:?}",
                ds.len(),
                ds.sports
            );
        }
    }
}
