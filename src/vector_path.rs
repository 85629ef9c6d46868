use egui::{Color32, Pos2, Rect, Vec2};
use log::debug;
use uuid::Uuid;

use crate::geometry;

/// Padding added around a path's geometry for its selection rectangle
pub const SELECTION_MARGIN: f32 = 10.0;

/// Minimum number of control points a committed path keeps
pub const MIN_CONTROL_POINTS: usize = 2;

/// One drawing instruction of a path, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Pos2),
    LineTo(Pos2),
    Close,
}

/// Renderable geometry derived from a path's control points.
///
/// Never edited directly: every control point mutation regenerates it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FittedGeometry {
    points: Vec<Pos2>,
    closed: bool,
}

impl FittedGeometry {
    fn fit(control_points: &[Pos2], closed: bool) -> Self {
        Self {
            points: geometry::fit_curve(control_points),
            closed,
        }
    }

    fn preview(raw_points: &[Pos2]) -> Self {
        Self {
            points: raw_points.to_vec(),
            closed: false,
        }
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bounds(&self) -> Rect {
        geometry::bounding_rect(&self.points)
    }

    /// The outline as a polyline, repeating the first point when closed.
    pub fn outline(&self) -> Vec<Pos2> {
        let mut outline = self.points.clone();
        if self.closed {
            if let Some(first) = self.points.first() {
                outline.push(*first);
            }
        }
        outline
    }
}

/// An editable vector stroke.
///
/// Freehand input accumulates in raw points until [`VectorPath::finalize`] turns
/// it into control points. The control points are the editable shape, and the
/// fitted geometry is always regenerated from them.
#[derive(Debug, PartialEq)]
pub struct VectorPath {
    id: Uuid,
    raw_points: Vec<Pos2>,
    control_points: Vec<Pos2>,
    geometry: FittedGeometry,
    stroke_color: Color32,
    stroke_width: f32,
    fill_color: Color32,
    fill_enabled: bool,
    selected: bool,
    closed: bool,
}

// Raw points are capture scratch space and are never copied.
impl Clone for VectorPath {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            raw_points: Vec::new(),
            control_points: self.control_points.clone(),
            geometry: self.geometry.clone(),
            stroke_color: self.stroke_color,
            stroke_width: self.stroke_width,
            fill_color: self.fill_color,
            fill_enabled: self.fill_enabled,
            selected: self.selected,
            closed: self.closed,
        }
    }
}

impl VectorPath {
    /// Starts an empty path that will be filled by freehand capture.
    pub fn new(stroke_color: Color32, stroke_width: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            raw_points: Vec::new(),
            control_points: Vec::new(),
            geometry: FittedGeometry::default(),
            stroke_color,
            stroke_width,
            fill_color: stroke_color,
            fill_enabled: false,
            selected: false,
            closed: false,
        }
    }

    /// Builds an already finalized path from explicit control points.
    pub fn from_control_points(control_points: Vec<Pos2>, stroke_color: Color32, stroke_width: f32) -> Self {
        let mut path = Self::new(stroke_color, stroke_width);
        path.control_points = control_points;
        path.regenerate();
        path
    }

    pub fn with_fill(mut self, fill_color: Color32, fill_enabled: bool) -> Self {
        self.fill_color = fill_color;
        self.fill_enabled = fill_enabled;
        self.regenerate();
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn raw_points(&self) -> &[Pos2] {
        &self.raw_points
    }

    pub fn control_points(&self) -> &[Pos2] {
        &self.control_points
    }

    pub fn geometry(&self) -> &FittedGeometry {
        &self.geometry
    }

    pub fn stroke_color(&self) -> Color32 {
        self.stroke_color
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    pub fn fill_color(&self) -> Color32 {
        self.fill_color
    }

    pub fn fill_enabled(&self) -> bool {
        self.fill_enabled
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn set_stroke_color(&mut self, color: Color32) {
        self.stroke_color = color;
    }

    /// Filling a path closes its outline.
    pub fn set_fill_enabled(&mut self, enabled: bool) {
        self.fill_enabled = enabled;
        self.regenerate();
    }

    pub fn set_fill_color(&mut self, color: Color32) {
        self.fill_color = color;
    }

    pub fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
        self.regenerate();
    }

    /// Appends a captured point and refreshes the live preview.
    pub fn add_point(&mut self, point: Pos2) {
        self.raw_points.push(point);
        self.geometry = FittedGeometry::preview(&self.raw_points);
    }

    /// Converts captured points into control points: simplify first, then
    /// smooth, then fit. Calling it again without new raw points only refits.
    pub fn finalize(&mut self, tolerance: f32, strength: u32) {
        if !self.raw_points.is_empty() {
            let raw = std::mem::take(&mut self.raw_points);
            let simplified = geometry::simplify(&raw, tolerance);
            self.control_points = geometry::smooth(&simplified, strength);
            debug!(
                "Finalized path {}: {} raw points -> {} control points",
                self.id,
                raw.len(),
                self.control_points.len()
            );
        }
        self.regenerate();
    }

    fn regenerate(&mut self) {
        self.geometry = FittedGeometry::fit(&self.control_points, self.closed || self.fill_enabled);
    }

    /// Inserts a control point. Returns false for an index outside `0..=len`.
    pub fn insert_control_point(&mut self, index: usize, point: Pos2) -> bool {
        if index > self.control_points.len() {
            return false;
        }
        self.control_points.insert(index, point);
        self.regenerate();
        true
    }

    /// Removes a control point unless that would leave fewer than two.
    pub fn delete_control_point(&mut self, index: usize) -> bool {
        if index >= self.control_points.len() || self.control_points.len() <= MIN_CONTROL_POINTS {
            return false;
        }
        self.control_points.remove(index);
        self.regenerate();
        true
    }

    pub fn move_control_point(&mut self, index: usize, delta: Vec2) -> bool {
        let Some(point) = self.control_points.get_mut(index) else {
            return false;
        };
        *point += delta;
        self.regenerate();
        true
    }

    pub fn move_by(&mut self, delta: Vec2) {
        for point in &mut self.control_points {
            *point += delta;
        }
        self.regenerate();
    }

    /// Scales the control points about `center`.
    pub fn transform(&mut self, scale_x: f32, scale_y: f32, center: Pos2) {
        let scale = Vec2::new(scale_x, scale_y);
        for point in &mut self.control_points {
            *point = center + (*point - center) * scale;
        }
        self.regenerate();
    }

    /// Rotates the control points about `center`.
    pub fn rotate(&mut self, angle_degrees: f32, center: Pos2) {
        let (sin, cos) = angle_degrees.to_radians().sin_cos();
        for point in &mut self.control_points {
            let d = *point - center;
            *point = center + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos);
        }
        self.regenerate();
    }

    /// True when `point` lies within `threshold` of the fitted outline.
    pub fn hit_test(&self, point: Pos2, threshold: f32) -> bool {
        geometry::polyline_distance(&self.geometry.outline(), point)
            .is_some_and(|distance| distance <= threshold)
    }

    /// Index of the first control point whose square hit box of side `size` contains `point`.
    pub fn control_point_at(&self, point: Pos2, size: f32) -> Option<usize> {
        self.control_points
            .iter()
            .position(|cp| Rect::from_center_size(*cp, Vec2::splat(size)).contains(point))
    }

    /// Index at which a control point placed at `point` would join the closest segment.
    pub fn insertion_index(&self, point: Pos2) -> Option<usize> {
        geometry::nearest_segment_index(&self.control_points, point)
    }

    /// Bounds of the fitted geometry plus [`SELECTION_MARGIN`].
    pub fn bounding_box(&self) -> Rect {
        let bounds = self.geometry.bounds();
        if bounds == Rect::NOTHING {
            return bounds;
        }
        bounds.expand(SELECTION_MARGIN)
    }

    pub fn to_path_commands(&self) -> Vec<PathCommand> {
        let points = self.geometry.points();
        let Some((first, rest)) = points.split_first() else {
            return Vec::new();
        };

        let mut commands = Vec::with_capacity(points.len() + 1);
        commands.push(PathCommand::MoveTo(*first));
        commands.extend(rest.iter().map(|p| PathCommand::LineTo(*p)));
        if self.geometry.is_closed() {
            commands.push(PathCommand::Close);
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CURVE_SAMPLES;

    fn line_path(points: &[(f32, f32)]) -> VectorPath {
        let points = points.iter().map(|(x, y)| Pos2::new(*x, *y)).collect();
        VectorPath::from_control_points(points, Color32::BLACK, 2.0)
    }

    #[test]
    fn test_capture_preview_and_finalize() {
        let mut path = VectorPath::new(Color32::RED, 3.0);
        path.add_point(Pos2::new(10.0, 10.0));
        path.add_point(Pos2::new(20.0, 10.0));
        path.add_point(Pos2::new(20.0, 20.0));
        assert_eq!(path.geometry().points().len(), 3);
        assert!(path.control_points().is_empty());

        path.finalize(1.0, 1);
        assert!(path.raw_points().is_empty());
        assert_eq!(path.control_points().first(), Some(&Pos2::new(10.0, 10.0)));
        assert_eq!(path.control_points().last(), Some(&Pos2::new(20.0, 20.0)));
        assert!(!path.geometry().is_empty());

        let before = path.clone();
        path.finalize(1.0, 1);
        assert_eq!(path, before);
    }

    #[test]
    fn test_delete_refused_at_floor() {
        let mut path = line_path(&[(0.0, 0.0), (5.0, 5.0)]);
        assert!(!path.delete_control_point(0));
        assert_eq!(path.control_points(), &[Pos2::new(0.0, 0.0), Pos2::new(5.0, 5.0)]);

        let mut path = line_path(&[(0.0, 0.0), (5.0, 5.0), (9.0, 0.0)]);
        assert!(path.delete_control_point(1));
        assert_eq!(path.control_points().len(), 2);
        assert!(!path.delete_control_point(7));
    }

    #[test]
    fn test_insert_range() {
        let mut path = line_path(&[(0.0, 0.0), (10.0, 0.0)]);
        assert!(!path.insert_control_point(3, Pos2::new(1.0, 1.0)));
        assert!(path.insert_control_point(2, Pos2::new(20.0, 0.0)));
        assert_eq!(path.geometry().points().len(), 3);

        assert!(path.insert_control_point(1, Pos2::new(5.0, 2.0)));
        assert_eq!(path.control_points()[1], Pos2::new(5.0, 2.0));
        assert_eq!(path.geometry().points().len(), CURVE_SAMPLES);
    }

    #[test]
    fn test_transform_about_pivot() {
        let mut path = line_path(&[(10.0, 10.0), (20.0, 10.0)]);
        path.transform(2.0, 3.0, Pos2::new(10.0, 10.0));
        assert_eq!(path.control_points(), &[Pos2::new(10.0, 10.0), Pos2::new(30.0, 10.0)]);

        path.rotate(90.0, Pos2::new(10.0, 10.0));
        let rotated = path.control_points()[1];
        assert!((rotated.x - 10.0).abs() < 1e-4);
        assert!((rotated.y - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_move_regenerates_geometry() {
        let mut path = line_path(&[(0.0, 0.0), (10.0, 0.0)]);
        path.move_by(Vec2::new(5.0, 5.0));
        assert_eq!(path.geometry().points(), &[Pos2::new(5.0, 5.0), Pos2::new(15.0, 5.0)]);

        assert!(path.move_control_point(1, Vec2::new(0.0, 10.0)));
        assert_eq!(path.geometry().points()[1], Pos2::new(15.0, 15.0));
        assert!(!path.move_control_point(2, Vec2::new(0.0, 10.0)));
    }

    #[test]
    fn test_hit_testing() {
        let path = line_path(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        assert!(path.hit_test(Pos2::new(5.0, 1.5), 2.0));
        assert!(!path.hit_test(Pos2::new(5.0, 3.0), 2.0));

        assert_eq!(path.control_point_at(Pos2::new(11.0, 4.0), 10.0), Some(1));
        assert_eq!(path.control_point_at(Pos2::new(11.0, 6.0), 10.0), None);
        // Overlapping boxes resolve to the first control point
        assert_eq!(path.control_point_at(Pos2::new(5.0, 0.0), 10.0), Some(0));
    }

    #[test]
    fn test_bounding_box_margin() {
        let path = line_path(&[(0.0, 0.0), (10.0, 20.0)]);
        assert_eq!(
            path.bounding_box(),
            Rect::from_min_max(Pos2::new(-10.0, -10.0), Pos2::new(20.0, 30.0))
        );
        assert_eq!(VectorPath::new(Color32::BLACK, 1.0).bounding_box(), Rect::NOTHING);
    }

    #[test]
    fn test_path_commands() {
        let mut path = line_path(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        assert_eq!(
            path.to_path_commands(),
            vec![
                PathCommand::MoveTo(Pos2::new(0.0, 0.0)),
                PathCommand::LineTo(Pos2::new(10.0, 0.0)),
                PathCommand::LineTo(Pos2::new(10.0, 10.0)),
            ]
        );

        path.set_fill_enabled(true);
        assert_eq!(path.to_path_commands().last(), Some(&PathCommand::Close));
        assert!(path.hit_test(Pos2::new(5.0, 5.0), 0.5));
    }

    #[test]
    fn test_clone_drops_raw_points() {
        let mut path = VectorPath::new(Color32::BLUE, 1.0);
        path.add_point(Pos2::new(1.0, 1.0));
        let copy = path.clone();
        assert!(copy.raw_points().is_empty());
        assert_eq!(copy.id(), path.id());
    }
}
