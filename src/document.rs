use image::RgbaImage;

use crate::path_editor::PathCollection;
use crate::raster::{self, RasterLayer};
use crate::vector_path::VectorPath;

/// Everything undo can restore: the raster layer and the vector paths,
/// including which paths are selected.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    raster: RasterLayer,
    paths: PathCollection,
}

impl Document {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            raster: RasterLayer::new(width, height),
            paths: PathCollection::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    pub fn raster(&self) -> &RasterLayer {
        &self.raster
    }

    pub fn raster_mut(&mut self) -> &mut RasterLayer {
        &mut self.raster
    }

    pub fn paths(&self) -> &PathCollection {
        &self.paths
    }

    pub fn paths_mut(&mut self) -> &mut PathCollection {
        &mut self.paths
    }

    /// Paints every path onto `target` in collection order.
    pub fn draw_paths(&self, target: &mut RgbaImage) {
        for path in self.paths.iter() {
            draw_path(target, path);
        }
    }

    /// The vector paths alone on a transparent layer
    pub fn render_vector_layer(&self) -> RgbaImage {
        let mut layer = RgbaImage::new(self.width(), self.height());
        self.draw_paths(&mut layer);
        layer
    }
}

/// Fill first, then the round-capped outline on top.
pub fn draw_path(target: &mut RgbaImage, path: &VectorPath) {
    let geometry = path.geometry();
    if geometry.is_empty() {
        return;
    }
    if path.fill_enabled() && geometry.is_closed() {
        raster::fill_polygon(target, geometry.points(), path.fill_color());
    }
    raster::stroke_polyline(target, &geometry.outline(), path.stroke_width(), path.stroke_color());
}
