use eframe::egui;

use crate::canvas::Canvas;
use crate::error::CanvasResult;
use crate::file_handler::FileHandler;
use crate::input::InputHandler;
use crate::panels::{central_panel, tools_panel};
use crate::renderer::Renderer;
use crate::settings::{SaveMode, Settings};

/// Where the tools panel saves and loads settings files
pub const SETTINGS_FILE: &str = "sketchrush-settings.json";

pub struct SketchApp {
    canvas: Canvas,
    // Needs the egui context, so it's created with the app
    renderer: Option<Renderer>,
    input_handler: InputHandler,
    file_handler: FileHandler,
    status: Option<String>,
}

impl Default for SketchApp {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            renderer: None,
            input_handler: InputHandler::new(),
            file_handler: FileHandler::new(),
            status: None,
        }
    }
}

impl SketchApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Settings from the previous session, if any
        let settings: Settings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, Settings::STORAGE_KEY))
            .unwrap_or_default();
        log::info!("Starting with a {}x{} canvas", settings.canvas_width, settings.canvas_height);

        Self {
            canvas: Canvas::new(settings),
            renderer: Some(Renderer::new(cc)),
            ..Self::default()
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    /// Logs a failed operation and shows it in the status line.
    pub fn report<T>(&mut self, result: CanvasResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                log::error!("{err}");
                self.set_status(err.to_string());
                None
            }
        }
    }

    /// Feeds this frame's input to the canvas.
    pub fn handle_input(&mut self, ctx: &egui::Context, canvas_rect: egui::Rect) {
        if self.file_handler.check_for_dropped_files(ctx) {
            let result = self.file_handler.apply_dropped_background(&mut self.canvas);
            if self.report(result) == Some(true) {
                self.set_status("Background loaded");
            }
        }

        self.canvas.set_modifiers(ctx.input(|i| i.modifiers));
        for event in self.input_handler.process_input(ctx, canvas_rect) {
            self.canvas.handle_event(event);
        }
        if let Some(mode) = self.canvas.take_save_request() {
            self.save(mode);
        }
    }

    pub fn render(&mut self, painter: &egui::Painter, rect: egui::Rect) {
        let renderer = self
            .renderer
            .get_or_insert_with(|| Renderer::from_context(painter.ctx().clone()));
        renderer.render(painter, rect, &self.canvas);
    }

    /// Saves the chosen layers under the next free file name.
    pub fn save(&mut self, mode: SaveMode) {
        let result = self.canvas.save_next(mode);
        if let Some(path) = self.report(result) {
            self.set_status(format!("Saved {}", path.display()));
        }
    }

    pub fn save_settings_file(&mut self) {
        let result = self.canvas.settings().save(SETTINGS_FILE).map_err(Into::into);
        if self.report(result).is_some() {
            self.set_status(format!("Saved {SETTINGS_FILE}"));
        }
    }

    pub fn load_settings_file(&mut self) {
        let result = Settings::load(SETTINGS_FILE).map_err(Into::into);
        if let Some(settings) = self.report(result) {
            *self.canvas.settings_mut() = settings;
            self.set_status(format!("Loaded {SETTINGS_FILE}"));
        }
    }
}

impl eframe::App for SketchApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, Settings::STORAGE_KEY, self.canvas.settings());
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        tools_panel(self, ctx);
        central_panel(self, ctx);
    }
}
