use eframe::egui;

use crate::settings::DashboardSettings;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct BetsDashboardApp {
    pub state: AppState,
}

impl BetsDashboardApp {
    /// Create the app and load the configured dataset if it exists.
    pub fn new(settings: DashboardSettings) -> Self {
        let path = settings.dataset_path.clone();
        let mut state = AppState::new(settings);
        if path.exists() {
            state.open(&path);
        } else {
            log::warn!("{} not found, waiting for File → Open…", path.display());
            state.status_message = Some(format!(
                "Dataset '{}' not found. Use File → Open… to load one.",
                path.display()
            ));
        }
        Self { state }
    }
}

impl Default for BetsDashboardApp {
    fn default() -> Self {
        Self::new(DashboardSettings::default())
    }
}

impl eframe::App for BetsDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    plot::dashboard(ui, &mut self.state);
                });
        });
    }
}
