use egui::{Color32, PointerButton, Pos2, Rect};
use log::{debug, info};

use crate::tools::{Tool, ToolContext};
use crate::vector_path::{MIN_CONTROL_POINTS, VectorPath};

/// Whether presses start new paths or edit existing ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathMode {
    #[default]
    Drawing,
    Selection,
}

/// The gesture in progress. Only one can run at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PathGesture {
    #[default]
    Idle,
    /// A freehand path that is not in the collection yet
    CapturingStroke(VectorPath),
    DraggingControlPoint { path: usize, index: usize },
    /// Moves every selected path
    DraggingPath,
}

/// The vector paths of a document in paint order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathCollection {
    paths: Vec<VectorPath>,
}

impl PathCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: VectorPath) {
        self.paths.push(path);
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&VectorPath> {
        self.paths.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut VectorPath> {
        self.paths.get_mut(index)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &VectorPath> + ExactSizeIterator {
        self.paths.iter()
    }

    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut VectorPath> + ExactSizeIterator {
        self.paths.iter_mut()
    }

    pub fn selected(&self) -> impl Iterator<Item = &VectorPath> {
        self.paths.iter().filter(|p| p.is_selected())
    }

    pub fn selected_mut(&mut self) -> impl Iterator<Item = &mut VectorPath> {
        self.paths.iter_mut().filter(|p| p.is_selected())
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        self.paths
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.is_selected().then_some(i))
            .collect()
    }

    pub fn has_selection(&self) -> bool {
        self.paths.iter().any(|p| p.is_selected())
    }

    /// Returns whether anything was selected before.
    pub fn deselect_all(&mut self) -> bool {
        let mut changed = false;
        for path in &mut self.paths {
            changed |= path.is_selected();
            path.set_selected(false);
        }
        changed
    }

    pub fn select_only(&mut self, index: usize) {
        for (i, path) in self.paths.iter_mut().enumerate() {
            path.set_selected(i == index);
        }
    }

    /// Removes the selected paths, returning how many were removed.
    pub fn remove_selected(&mut self) -> usize {
        let before = self.paths.len();
        self.paths.retain(|p| !p.is_selected());
        before - self.paths.len()
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    /// Union of the selected paths' curve bounds
    pub fn selection_bounds(&self) -> Option<Rect> {
        self.selected()
            .map(|p| p.geometry().bounds())
            .reduce(|a, b| a.union(b))
    }
}

/// Interactive creation and editing of vector paths.
///
/// The editor keeps only interaction state. Paths live in the document so
/// history snapshots capture them together with the raster layer.
#[derive(Debug, Clone, Default)]
pub struct PathEditor {
    mode: PathMode,
    gesture: PathGesture,
    last_pos: Option<Pos2>,
    default_fill: bool,
}

impl PathEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> PathMode {
        self.mode
    }

    pub fn gesture(&self) -> &PathGesture {
        &self.gesture
    }

    /// The path being captured, if any
    pub fn preview(&self) -> Option<&VectorPath> {
        match &self.gesture {
            PathGesture::CapturingStroke(path) => Some(path),
            _ => None,
        }
    }

    pub fn default_fill(&self) -> bool {
        self.default_fill
    }

    pub fn set_default_fill(&mut self, enabled: bool) {
        self.default_fill = enabled;
    }

    /// Switches mode, ending any gesture. Paths and selection are kept.
    pub fn set_mode(&mut self, mode: PathMode) {
        if self.mode != mode {
            self.cancel();
            self.mode = mode;
            info!("Path mode: {:?}", mode);
        }
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(match self.mode {
            PathMode::Drawing => PathMode::Selection,
            PathMode::Selection => PathMode::Drawing,
        });
    }

    pub fn delete_selected(&mut self, ctx: &mut ToolContext<'_>) -> bool {
        if !ctx.document.paths().has_selection() {
            return false;
        }
        self.cancel();
        ctx.checkpoint();
        let removed = ctx.document.paths_mut().remove_selected();
        debug!("Deleted {} selected path(s)", removed);
        true
    }

    /// Flips fill on the selection, or the fill used for new paths when nothing is selected.
    pub fn toggle_fill_selected(&mut self, ctx: &mut ToolContext<'_>) -> bool {
        if !ctx.document.paths().has_selection() {
            self.default_fill = !self.default_fill;
            debug!("Default fill: {}", self.default_fill);
            return false;
        }
        ctx.checkpoint();
        for path in ctx.document.paths_mut().selected_mut() {
            let enabled = !path.fill_enabled();
            path.set_fill_enabled(enabled);
        }
        true
    }

    pub fn recolor_selected(&mut self, color: Color32, ctx: &mut ToolContext<'_>) -> bool {
        if !ctx.document.paths().has_selection() {
            return false;
        }
        ctx.checkpoint();
        for path in ctx.document.paths_mut().selected_mut() {
            path.set_stroke_color(color);
        }
        true
    }

    /// Scales the selection about the center of its bounds.
    pub fn scale_selected(&mut self, scale_x: f32, scale_y: f32, ctx: &mut ToolContext<'_>) -> bool {
        let Some(bounds) = ctx.document.paths().selection_bounds() else {
            return false;
        };
        ctx.checkpoint();
        for path in ctx.document.paths_mut().selected_mut() {
            path.transform(scale_x, scale_y, bounds.center());
        }
        true
    }

    pub fn rotate_selected(&mut self, angle_degrees: f32, ctx: &mut ToolContext<'_>) -> bool {
        let Some(bounds) = ctx.document.paths().selection_bounds() else {
            return false;
        };
        ctx.checkpoint();
        for path in ctx.document.paths_mut().selected_mut() {
            path.rotate(angle_degrees, bounds.center());
        }
        true
    }

    fn begin_capture(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> bool {
        let color = ctx.settings.current_color();
        let mut path = VectorPath::new(color, ctx.settings.pen_size).with_fill(color, self.default_fill);
        path.add_point(pos);
        self.gesture = PathGesture::CapturingStroke(path);
        self.last_pos = Some(pos);
        true
    }

    fn insert_point_at(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> bool {
        let threshold = ctx.settings.hit_threshold;
        let target = ctx
            .document
            .paths()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.hit_test(pos, threshold))
            .find_map(|(i, p)| p.insertion_index(pos).map(|at| (i, at)));
        let Some((path, index)) = target else {
            return false;
        };

        ctx.checkpoint();
        ctx.document
            .paths_mut()
            .get_mut(path)
            .is_some_and(|p| p.insert_control_point(index, pos))
    }

    fn delete_point_at(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> bool {
        let size = ctx.settings.control_point_size;
        let target = ctx
            .document
            .paths()
            .iter()
            .enumerate()
            .find_map(|(i, p)| p.control_point_at(pos, size).map(|index| (i, index, p.control_points().len())));
        let Some((path, index, len)) = target else {
            return false;
        };
        if len <= MIN_CONTROL_POINTS {
            debug!("Refused to delete control point {index}: path needs {MIN_CONTROL_POINTS} points");
            return false;
        }

        ctx.checkpoint();
        ctx.document
            .paths_mut()
            .get_mut(path)
            .is_some_and(|p| p.delete_control_point(index))
    }

    fn press_selection(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> bool {
        let keys = &ctx.settings.keys;
        let modifiers = &ctx.input.modifiers;
        if keys.add_control_point.is_held(modifiers) {
            return self.insert_point_at(pos, ctx);
        }
        if keys.delete_control_point.is_held(modifiers) {
            return self.delete_point_at(pos, ctx);
        }

        let size = ctx.settings.control_point_size;
        let threshold = ctx.settings.hit_threshold;
        let paths = ctx.document.paths();

        let gesture = if let Some((path, index)) = paths
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, p)| p.control_point_at(pos, size).map(|index| (i, index)))
        {
            Some((Some(path), PathGesture::DraggingControlPoint { path, index }))
        } else if let Some(path) = paths.iter().rposition(|p| p.hit_test(pos, threshold)) {
            Some((Some(path), PathGesture::DraggingPath))
        } else if paths.selected().any(|p| p.bounding_box().contains(pos)) {
            Some((None, PathGesture::DraggingPath))
        } else {
            None
        };

        match gesture {
            Some((select, gesture)) => {
                ctx.checkpoint();
                if let Some(index) = select {
                    ctx.document.paths_mut().select_only(index);
                }
                self.gesture = gesture;
                self.last_pos = Some(pos);
                true
            }
            None => ctx.document.paths_mut().deselect_all(),
        }
    }
}

impl Tool for PathEditor {
    fn name(&self) -> &'static str {
        "Path"
    }

    fn on_pointer_down(&mut self, pos: Pos2, button: PointerButton, ctx: &mut ToolContext<'_>) -> bool {
        if button != PointerButton::Primary || self.is_busy() {
            return false;
        }
        match self.mode {
            PathMode::Drawing => self.begin_capture(pos, ctx),
            PathMode::Selection => self.press_selection(pos, ctx),
        }
    }

    fn on_pointer_move(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> bool {
        let Some(last) = self.last_pos else {
            return false;
        };
        let delta = pos - last;
        match &mut self.gesture {
            PathGesture::Idle => return false,
            PathGesture::CapturingStroke(path) => path.add_point(pos),
            PathGesture::DraggingControlPoint { path, index } => {
                if let Some(path) = ctx.document.paths_mut().get_mut(*path) {
                    path.move_control_point(*index, delta);
                }
            }
            PathGesture::DraggingPath => {
                for path in ctx.document.paths_mut().selected_mut() {
                    path.move_by(delta);
                }
            }
        }
        self.last_pos = Some(pos);
        true
    }

    fn on_pointer_up(&mut self, _pos: Pos2, button: PointerButton, ctx: &mut ToolContext<'_>) -> bool {
        if button != PointerButton::Primary {
            return false;
        }
        self.last_pos = None;
        match std::mem::take(&mut self.gesture) {
            PathGesture::CapturingStroke(mut path) => {
                if path.raw_points().len() < MIN_CONTROL_POINTS {
                    debug!("Discarded path with {} point(s)", path.raw_points().len());
                    return true;
                }
                ctx.checkpoint();
                path.finalize(ctx.settings.simplify_tolerance, ctx.settings.smooth_strength);
                ctx.document.paths_mut().push(path);
                true
            }
            // Drags were snapshotted on press
            _ => false,
        }
    }

    fn cancel(&mut self) -> bool {
        self.last_pos = None;
        let was_capturing = matches!(self.gesture, PathGesture::CapturingStroke(_));
        self.gesture = PathGesture::Idle;
        was_capturing
    }

    fn is_busy(&self) -> bool {
        self.gesture != PathGesture::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Vec2;

    fn line(from: Pos2, to: Pos2) -> VectorPath {
        VectorPath::from_control_points(vec![from, to], Color32::BLACK, 2.0)
    }

    #[test]
    fn test_selection_helpers() {
        let mut paths = PathCollection::new();
        paths.push(line(Pos2::new(0.0, 0.0), Pos2::new(10.0, 0.0)));
        paths.push(line(Pos2::new(0.0, 20.0), Pos2::new(10.0, 30.0)));
        assert!(!paths.has_selection());
        assert_eq!(paths.selection_bounds(), None);

        paths.select_only(1);
        assert_eq!(paths.selected_indices(), vec![1]);
        assert_eq!(
            paths.selection_bounds(),
            Some(Rect::from_min_max(Pos2::new(0.0, 20.0), Pos2::new(10.0, 30.0)))
        );

        assert!(paths.deselect_all());
        assert!(!paths.deselect_all());

        paths.select_only(0);
        assert_eq!(paths.remove_selected(), 1);
        assert_eq!(paths.len(), 1);
        assert!(!paths.has_selection());
    }

    #[test]
    fn test_iteration_from_either_end() {
        let mut paths = PathCollection::new();
        paths.push(line(Pos2::new(0.0, 0.0), Pos2::new(10.0, 0.0)));
        paths.push(line(Pos2::new(0.0, 20.0), Pos2::new(10.0, 20.0)));
        paths.push(line(Pos2::new(0.0, 40.0), Pos2::new(10.0, 40.0)));

        assert_eq!(paths.iter().len(), 3);
        let last_hit = paths
            .iter()
            .enumerate()
            .rev()
            .find(|(_, p)| p.hit_test(Pos2::new(5.0, 20.0), 25.0))
            .map(|(i, _)| i);
        assert_eq!(last_hit, Some(2));
        assert_eq!(paths.iter().rposition(|p| p.control_points()[0].y == 20.0), Some(1));

        for path in paths.iter_mut().rev().take(1) {
            path.move_by(Vec2::new(0.0, 10.0));
        }
        assert_eq!(paths.get(2).unwrap().control_points()[0], Pos2::new(0.0, 50.0));
    }

    #[test]
    fn test_toggle_mode_keeps_nothing_in_flight() {
        let mut editor = PathEditor::new();
        editor.gesture = PathGesture::DraggingPath;
        editor.toggle_mode();
        assert_eq!(editor.mode(), PathMode::Selection);
        assert_eq!(editor.gesture(), &PathGesture::Idle);
        assert!(!editor.is_busy());
    }
}
