use bets_dashboard::app::BetsDashboardApp;
use bets_dashboard::cli::Cli;
use clap::Parser;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = Cli::parse().into_settings();
    log::info!("Starting dashboard with {}", settings.dataset_path.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(settings.window_size)
            .with_min_inner_size(settings.min_window_size),
        ..Default::default()
    };

    eframe::run_native(
        "Top 100 Sports Bets Analysis",
        options,
        Box::new(|_cc| Ok(Box::new(BetsDashboardApp::new(settings)))),
    )
}
