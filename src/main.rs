mod api;
mod app;
mod chart;
mod state;
mod ui;

use app::LiquidityPulseApp;
use eframe::egui;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Liquidity Pulse")
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Liquidity Pulse",
        options,
        Box::new(|cc| Ok(Box::new(LiquidityPulseApp::new(cc)))),
    )
}
