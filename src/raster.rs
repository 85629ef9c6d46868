use egui::{Color32, Pos2, Rect, Vec2};
use image::{Pixel, Rgba, RgbaImage};

use crate::geometry;

/// Smallest radius a stroke is rasterized with, so a one pixel dot always
/// covers the pixel it lands in.
const MIN_RADIUS: f32 = std::f32::consts::FRAC_1_SQRT_2;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// The freehand paint layer: straight-alpha RGBA pixels, transparent where nothing is painted.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterLayer {
    image: RgbaImage,
}

impl RasterLayer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, TRANSPARENT),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| p.0[3] == 0)
    }

    pub fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = TRANSPARENT;
        }
    }

    /// Paints a round-capped segment. With `eraser` set the swept pixels are
    /// cleared to transparent instead, whatever `color` is.
    pub fn paint_stroke(&mut self, from: Pos2, to: Pos2, width: f32, color: Color32, eraser: bool) {
        if eraser {
            erase_polyline(&mut self.image, &[from, to], width);
        } else {
            stroke_polyline(&mut self.image, &[from, to], width, color);
        }
    }
}

/// Source-over composite of a round-capped, round-joined polyline.
///
/// Coverage is computed for the whole polyline first, so joints are only blended once.
pub fn stroke_polyline(image: &mut RgbaImage, points: &[Pos2], width: f32, color: Color32) {
    if let Some(mask) = polyline_mask(image, points, width) {
        let source = Rgba(color.to_srgba_unmultiplied());
        mask.apply(image, |pixel| pixel.blend(&source));
    }
}

/// Clears every pixel a round-capped polyline sweeps.
pub fn erase_polyline(image: &mut RgbaImage, points: &[Pos2], width: f32) {
    if let Some(mask) = polyline_mask(image, points, width) {
        mask.apply(image, |pixel| *pixel = TRANSPARENT);
    }
}

fn polyline_mask(image: &RgbaImage, points: &[Pos2], width: f32) -> Option<CoverageMask> {
    let radius = (width * 0.5).max(MIN_RADIUS);
    let mut mask = CoverageMask::new(image, geometry::bounding_rect(points).expand(radius + 1.0))?;
    if let [only] = points {
        mask.add_segment(*only, *only, radius);
    }
    for pair in points.windows(2) {
        mask.add_segment(pair[0], pair[1], radius);
    }
    Some(mask)
}

/// Even-odd fill of the closed polygon through `points`.
pub fn fill_polygon(image: &mut RgbaImage, points: &[Pos2], color: Color32) {
    if points.len() < 3 {
        return;
    }
    let Some(mut mask) = CoverageMask::new(image, geometry::bounding_rect(points).expand(1.0)) else {
        return;
    };
    mask.add_polygon(points);
    let source = Rgba(color.to_srgba_unmultiplied());
    mask.apply(image, |pixel| pixel.blend(&source));
}

/// Per-pixel coverage over a clipped window of an image. A pixel is covered
/// when its center is inside the shape.
struct CoverageMask {
    x0: u32,
    y0: u32,
    width: u32,
    height: u32,
    covered: Vec<bool>,
}

impl CoverageMask {
    fn new(image: &RgbaImage, bounds: Rect) -> Option<Self> {
        if bounds == Rect::NOTHING || !bounds.is_finite() {
            return None;
        }
        let clamp_x = |v: f32| v.clamp(0.0, image.width() as f32) as u32;
        let clamp_y = |v: f32| v.clamp(0.0, image.height() as f32) as u32;
        let (x0, x1) = (clamp_x(bounds.min.x.floor()), clamp_x(bounds.max.x.ceil()));
        let (y0, y1) = (clamp_y(bounds.min.y.floor()), clamp_y(bounds.max.y.ceil()));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        let (width, height) = (x1 - x0, y1 - y0);
        Some(Self {
            x0,
            y0,
            width,
            height,
            covered: vec![false; (width * height) as usize],
        })
    }

    fn center(x: u32, y: u32) -> Pos2 {
        Pos2::new(x as f32 + 0.5, y as f32 + 0.5)
    }

    /// Local pixel range overlapping `[min, max]` along one axis.
    fn span(min: f32, max: f32, origin: u32, len: u32) -> std::ops::Range<u32> {
        let start = (min - 0.5 - origin as f32).ceil().max(0.0) as u32;
        let end = ((max - 0.5 - origin as f32).floor() + 1.0).clamp(0.0, len as f32) as u32;
        start.min(end)..end
    }

    fn add_segment(&mut self, a: Pos2, b: Pos2, radius: f32) {
        let reach = Vec2::splat(radius);
        let bounds = Rect::from_two_pos(a, b).expand2(reach);
        for y in Self::span(bounds.min.y, bounds.max.y, self.y0, self.height) {
            for x in Self::span(bounds.min.x, bounds.max.x, self.x0, self.width) {
                let center = Self::center(self.x0 + x, self.y0 + y);
                if geometry::distance_point_to_segment(center, a, b) <= radius {
                    self.covered[(y * self.width + x) as usize] = true;
                }
            }
        }
    }

    fn add_polygon(&mut self, points: &[Pos2]) {
        let mut crossings = Vec::new();
        for y in 0..self.height {
            let scan = self.y0 as f32 + y as f32 + 0.5;
            crossings.clear();
            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                if (a.y <= scan && scan < b.y) || (b.y <= scan && scan < a.y) {
                    crossings.push(a.x + (scan - a.y) / (b.y - a.y) * (b.x - a.x));
                }
            }
            crossings.sort_by(f32::total_cmp);

            for pair in crossings.chunks_exact(2) {
                for x in Self::span(pair[0], pair[1], self.x0, self.width) {
                    let center_x = self.x0 as f32 + x as f32 + 0.5;
                    if center_x < pair[1] {
                        self.covered[(y * self.width + x) as usize] = true;
                    }
                }
            }
        }
    }

    fn apply(&self, image: &mut RgbaImage, mut paint: impl FnMut(&mut Rgba<u8>)) {
        for y in 0..self.height {
            for x in 0..self.width {
                if self.covered[(y * self.width + x) as usize] {
                    paint(image.get_pixel_mut(self.x0 + x, self.y0 + y));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_layer_is_transparent() {
        let layer = RasterLayer::new(8, 4);
        assert!(layer.is_blank());
        assert_eq!(layer.pixel(7, 3), Some([0, 0, 0, 0]));
        assert_eq!(layer.pixel(8, 0), None);
    }

    #[test]
    fn test_paint_stroke_covers_segment() {
        let mut layer = RasterLayer::new(32, 32);
        layer.paint_stroke(Pos2::new(4.0, 10.0), Pos2::new(20.0, 10.0), 4.0, Color32::RED, false);

        assert_eq!(layer.pixel(12, 10), Some([255, 0, 0, 255]));
        assert_eq!(layer.pixel(12, 9), Some([255, 0, 0, 255]));
        assert_eq!(layer.pixel(12, 14), Some([0, 0, 0, 0]));
        // Round caps reach past the endpoints
        assert_eq!(layer.pixel(21, 10), Some([255, 0, 0, 255]));
        assert_eq!(layer.pixel(25, 10), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_single_pixel_dot() {
        let mut layer = RasterLayer::new(16, 16);
        let p = Pos2::new(5.3, 5.6);
        layer.paint_stroke(p, p, 1.0, Color32::BLACK, false);
        assert_eq!(layer.pixel(5, 5), Some([0, 0, 0, 255]));
        assert_eq!(layer.pixel(3, 5), Some([0, 0, 0, 0]));
        assert!(!layer.is_blank());
    }

    #[test]
    fn test_eraser_clears_alpha() {
        let mut layer = RasterLayer::new(16, 16);
        layer.paint_stroke(Pos2::new(0.0, 8.0), Pos2::new(16.0, 8.0), 6.0, Color32::BLUE, false);
        layer.paint_stroke(Pos2::new(0.0, 8.0), Pos2::new(16.0, 8.0), 8.0, Color32::GREEN, true);
        assert!(layer.is_blank());
    }

    #[test]
    fn test_strokes_outside_are_clipped() {
        let mut layer = RasterLayer::new(8, 8);
        layer.paint_stroke(Pos2::new(-50.0, -50.0), Pos2::new(-40.0, -40.0), 4.0, Color32::RED, false);
        assert!(layer.is_blank());
        layer.paint_stroke(Pos2::new(-4.0, 4.0), Pos2::new(20.0, 4.0), 2.0, Color32::RED, false);
        assert_eq!(layer.pixel(0, 3), Some([255, 0, 0, 255]));
        assert_eq!(layer.pixel(7, 3), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_translucent_polyline_blends_joints_once() {
        let mut image = RgbaImage::from_pixel(16, 16, Rgba([255, 255, 255, 255]));
        let color = Color32::from_rgba_unmultiplied(0, 0, 0, 128);
        let points = [Pos2::new(2.0, 8.0), Pos2::new(8.0, 8.0), Pos2::new(14.0, 8.0)];
        stroke_polyline(&mut image, &points, 4.0, color);
        assert_eq!(image.get_pixel(8, 8), image.get_pixel(4, 8));
    }

    #[test]
    fn test_fill_polygon_even_odd() {
        let mut image = RgbaImage::from_pixel(20, 20, TRANSPARENT);
        let square = [
            Pos2::new(2.0, 2.0),
            Pos2::new(12.0, 2.0),
            Pos2::new(12.0, 12.0),
            Pos2::new(2.0, 12.0),
        ];
        fill_polygon(&mut image, &square, Color32::RED);
        assert_eq!(image.get_pixel(2, 2).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(11, 11).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(12, 11).0, [0, 0, 0, 0]);
        assert_eq!(image.get_pixel(1, 5).0, [0, 0, 0, 0]);
    }
}
