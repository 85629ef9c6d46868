use eframe::egui;

use crate::SketchApp;

pub fn central_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let canvas = app.canvas();
        let size = egui::vec2(canvas.width() as f32, canvas.height() as f32);
        let canvas_rect = egui::Rect::from_min_size(ui.available_rect_before_wrap().min, size);

        // Handle input
        app.handle_input(ctx, canvas_rect);

        // Render the canvas
        app.render(ui.painter(), canvas_rect);
        ui.allocate_rect(canvas_rect, egui::Sense::hover());
    });
}
