#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() -> eframe::Result {
    // Feeds the in-app debug log window; install failure just means no logs.
    egui_logger::builder().init().ok();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([700.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Circuit Lab",
        native_options,
        Box::new(|cc| Ok(Box::new(circuitlab::App::new(cc)))),
    )
}
