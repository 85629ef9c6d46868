use std::collections::VecDeque;

use egui::{PointerButton, Pos2};
use log::debug;

use crate::tools::{Tool, ToolContext};

/// Raster stroke width for a pressure sample, never thinner than one pixel.
pub fn stroke_width(base_width: f32, pressure: Option<f32>) -> f32 {
    match pressure {
        Some(pressure) => (base_width * pressure).max(1.0),
        None => base_width,
    }
}

/// Moving-average filter over the last `degree` input points.
#[derive(Debug, Clone, Default)]
pub struct Stabilizer {
    window: VecDeque<Pos2>,
    degree: usize,
}

impl Stabilizer {
    pub fn new(degree: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(degree),
            degree,
        }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Changing the degree drops the buffered points.
    pub fn set_degree(&mut self, degree: usize) {
        if degree != self.degree {
            self.degree = degree;
            self.window.clear();
        }
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }

    /// Feeds a raw point and returns where the stroke should go.
    pub fn push(&mut self, point: Pos2) -> Pos2 {
        if self.degree == 0 {
            return point;
        }
        self.window.push_back(point);
        while self.window.len() > self.degree {
            self.window.pop_front();
        }

        let n = self.window.len() as f32;
        let sum = self.window.iter().fold(egui::Vec2::ZERO, |acc, p| acc + p.to_vec2());
        (sum / n).to_pos2()
    }
}

/// Freehand painting and erasing on the raster layer.
#[derive(Debug, Clone, Default)]
pub struct RasterTool {
    stabilizer: Stabilizer,
    /// Last painted point while a stroke is active
    last_point: Option<Pos2>,
    button: Option<PointerButton>,
    erase_by_button: bool,
    drawn: Vec<Pos2>,
}

impl RasterTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points the current (or last) stroke was drawn through, after stabilization.
    pub fn drawn_points(&self) -> &[Pos2] {
        &self.drawn
    }

    fn paint_to(&mut self, point: Pos2, ctx: &mut ToolContext<'_>) {
        let from = self.last_point.unwrap_or(point);
        let width = stroke_width(ctx.settings.pen_size, ctx.input.pressure);
        let erase = self.erase_by_button || ctx.input.eraser_active(ctx.settings.use_tablet);
        ctx.document
            .raster_mut()
            .paint_stroke(from, point, width, ctx.settings.current_color(), erase);
        self.last_point = Some(point);
        self.drawn.push(point);
    }
}

impl Tool for RasterTool {
    fn name(&self) -> &'static str {
        "Raster"
    }

    fn on_pointer_down(&mut self, pos: Pos2, button: PointerButton, ctx: &mut ToolContext<'_>) -> bool {
        if self.last_point.is_some() {
            return false;
        }
        let mouse = &ctx.settings.mouse;
        let erase_by_button = mouse.eraser == Some(button);
        if !erase_by_button && mouse.pen != Some(button) {
            return false;
        }

        ctx.checkpoint();
        self.button = Some(button);
        self.erase_by_button = erase_by_button;
        self.stabilizer.set_degree(ctx.settings.stabilization);
        self.stabilizer.reset();
        self.drawn.clear();

        // The press dot lands on the raw position; only moves are averaged
        self.paint_to(pos, ctx);
        debug!("Raster stroke started (erase by button: {})", erase_by_button);
        true
    }

    fn on_pointer_move(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> bool {
        if self.last_point.is_none() {
            return false;
        }
        self.stabilizer.set_degree(ctx.settings.stabilization);
        let point = self.stabilizer.push(pos);
        self.paint_to(point, ctx);
        true
    }

    fn on_pointer_up(&mut self, _pos: Pos2, button: PointerButton, _ctx: &mut ToolContext<'_>) -> bool {
        if self.button == Some(button) {
            self.cancel();
        }
        false
    }

    fn cancel(&mut self) -> bool {
        self.last_point = None;
        self.button = None;
        self.erase_by_button = false;
        false
    }

    fn is_busy(&self) -> bool {
        self.last_point.is_some()
    }
}
