use eframe::egui::{self, Color32, ColorImage, Painter, Pos2, Rect, Shape, Stroke, TextureHandle, Vec2};
use image::RgbaImage;

use crate::canvas::{Canvas, Overlay};

const HANDLE_SIZE: f32 = 10.0;
const SELECTION_COLOR: Color32 = Color32::from_rgb(0, 120, 215);
const CONTROL_POINT_COLOR: Color32 = Color32::RED;

/// Converts a straight-alpha image to an egui image.
pub fn to_color_image(image: &RgbaImage) -> ColorImage {
    let size = [image.width() as usize, image.height() as usize];
    ColorImage::from_rgba_unmultiplied(size, image.as_raw())
}

/// Draws the composited canvas and the editing overlay.
///
/// The canvas texture is only re-uploaded when the canvas revision changes.
pub struct Renderer {
    ctx: egui::Context,
    texture: Option<TextureHandle>,
    texture_revision: Option<u64>,
}

impl Renderer {
    /// Creates a new renderer bound to the app's egui context
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        Self::from_context(cc.egui_ctx.clone())
    }

    pub fn from_context(ctx: egui::Context) -> Self {
        Self {
            ctx,
            texture: None,
            texture_revision: None,
        }
    }

    /// Revision the current texture was built from
    pub fn texture_revision(&self) -> Option<u64> {
        self.texture_revision
    }

    /// Uploads the composited canvas if it changed since the last frame.
    pub fn update_texture(&mut self, canvas: &Canvas) -> egui::TextureId {
        let revision = canvas.revision();
        let stale = self.texture_revision != Some(revision);
        self.texture_revision = Some(revision);

        let ctx = &self.ctx;
        let mut created = false;
        let texture: &mut TextureHandle = self.texture.get_or_insert_with(|| {
            created = true;
            ctx.load_texture("canvas", to_color_image(&canvas.compose()), egui::TextureOptions::NEAREST)
        });
        if stale && !created {
            texture.set(to_color_image(&canvas.compose()), egui::TextureOptions::NEAREST);
        }
        texture.id()
    }

    /// Paints the canvas at `rect.min`, one texel per point.
    pub fn render(&mut self, painter: &Painter, rect: Rect, canvas: &Canvas) {
        let size = Vec2::new(canvas.width() as f32, canvas.height() as f32);
        let image_rect = Rect::from_min_size(rect.min, size);
        let texture_id = self.update_texture(canvas);

        painter.image(
            texture_id,
            image_rect,
            Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
            Color32::WHITE,
        );
        draw_overlay(painter, rect.min, &canvas.overlay());
    }
}

/// Selection boxes with corner handles, control points and the path being drawn.
pub fn draw_overlay(painter: &Painter, origin: Pos2, overlay: &Overlay) {
    let offset = origin.to_vec2();

    if let Some(preview) = &overlay.preview {
        let points: Vec<Pos2> = preview.points.iter().map(|p| *p + offset).collect();
        painter.add(Shape::line(points, Stroke::new(preview.width, preview.color)));
    }

    let dash = Stroke::new(1.0, SELECTION_COLOR);
    for rect in &overlay.selection_boxes {
        let rect = rect.translate(offset);
        let outline = [rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom(), rect.left_top()];
        painter.extend(Shape::dashed_line(&outline, dash, 4.0, 4.0));
        for corner in &outline[..4] {
            painter.rect_filled(Rect::from_center_size(*corner, Vec2::splat(HANDLE_SIZE)), 0.0, SELECTION_COLOR);
        }
    }

    let point_size = Vec2::splat(overlay.control_point_size);
    for point in &overlay.control_points {
        let square = Rect::from_center_size(*point + offset, point_size);
        painter.rect_stroke(square, 0.0, Stroke::new(1.5, CONTROL_POINT_COLOR));
    }
}
