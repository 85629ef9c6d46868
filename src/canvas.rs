use std::path::{Path, PathBuf};

use egui::{Color32, Key, Modifiers, Pos2, Rect};
use image::RgbaImage;
use log::{debug, info};

use crate::document::Document;
use crate::error::{CanvasError, CanvasResult};
use crate::file_handler::unique_path;
use crate::history::History;
use crate::input::{InputEvent, InputState, ToolKind};
use crate::path_editor::{PathEditor, PathMode};
use crate::settings::{DeleteMode, SaveMode, Settings};
use crate::stroke::RasterTool;
use crate::tools::{Tool, ToolContext};
use crate::vector_path::PathCommand;

/// A vector path flattened for export
#[derive(Debug, Clone, PartialEq)]
pub struct VectorExport {
    pub commands: Vec<PathCommand>,
    pub stroke_color: Color32,
    pub stroke_width: f32,
    /// Fill color when the path is filled
    pub fill: Option<Color32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewLine {
    pub points: Vec<Pos2>,
    pub color: Color32,
    pub width: f32,
}

/// Editing aids drawn above the composited image, in canvas coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    pub selection_boxes: Vec<Rect>,
    /// Control points of the selected paths
    pub control_points: Vec<Pos2>,
    pub control_point_size: f32,
    pub preview: Option<PreviewLine>,
}

/// The drawing surface: owns the document, its history, the tools and the settings,
/// and routes input events to the active tool.
pub struct Canvas {
    document: Document,
    history: History<Document>,
    settings: Settings,
    input: InputState,
    raster_tool: RasterTool,
    path_editor: PathEditor,
    background: Option<RgbaImage>,
    /// Set by the save keys, picked up by the app
    save_request: Option<SaveMode>,
    revision: u64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Canvas {
    pub fn new(settings: Settings) -> Self {
        Self {
            document: Document::new(settings.canvas_width, settings.canvas_height),
            history: History::new(settings.history_depth),
            settings,
            input: InputState::default(),
            raster_tool: RasterTool::new(),
            path_editor: PathEditor::new(),
            background: None,
            save_request: None,
            revision: 0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &History<Document> {
        &self.history
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Changes apply from the next operation on.
    pub fn settings_mut(&mut self) -> &mut Settings {
        self.touch();
        &mut self.settings
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn raster_tool(&self) -> &RasterTool {
        &self.raster_tool
    }

    pub fn path_editor(&self) -> &PathEditor {
        &self.path_editor
    }

    pub fn width(&self) -> u32 {
        self.document.width()
    }

    pub fn height(&self) -> u32 {
        self.document.height()
    }

    /// Bumped on every visible change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Picks up a changed `history_depth` before anything is pushed.
    fn sync_history_depth(&mut self) {
        if self.history.max_depth() != self.settings.history_depth.max(1) {
            self.history.set_max_depth(self.settings.history_depth);
            debug!("History depth set to {}", self.history.max_depth());
        }
    }

    fn with_active_tool<R>(&mut self, f: impl FnOnce(&mut dyn Tool, &mut ToolContext<'_>) -> R) -> R {
        self.sync_history_depth();
        let mut ctx = ToolContext {
            document: &mut self.document,
            history: &mut self.history,
            settings: &self.settings,
            input: &self.input,
        };
        let tool: &mut dyn Tool = match self.input.tool {
            ToolKind::Raster => &mut self.raster_tool,
            ToolKind::Path => &mut self.path_editor,
        };
        f(tool, &mut ctx)
    }

    fn with_path_editor<R>(&mut self, f: impl FnOnce(&mut PathEditor, &mut ToolContext<'_>) -> R) -> R {
        self.sync_history_depth();
        let mut ctx = ToolContext {
            document: &mut self.document,
            history: &mut self.history,
            settings: &self.settings,
            input: &self.input,
        };
        f(&mut self.path_editor, &mut ctx)
    }

    /// Processes one input event. Events must arrive in order.
    pub fn handle_event(&mut self, event: InputEvent) {
        let changed = match event {
            InputEvent::PointerDown { pos, button } => {
                self.input.pointer_pos = Some(pos);
                self.with_active_tool(|tool, ctx| tool.on_pointer_down(pos, button, ctx))
            }
            InputEvent::PointerMove { pos } => {
                self.input.pointer_pos = Some(pos);
                self.with_active_tool(|tool, ctx| tool.on_pointer_move(pos, ctx))
            }
            InputEvent::PointerUp { pos, button } => {
                self.input.pointer_pos = Some(pos);
                self.with_active_tool(|tool, ctx| tool.on_pointer_up(pos, button, ctx))
            }
            InputEvent::Pressure { pos, pressure, device } => {
                self.input.pointer_pos = Some(pos);
                self.input.record_pressure(pressure, device, self.settings.use_tablet);
                false
            }
            InputEvent::KeyDown { key, modifiers } => {
                self.input.modifiers = modifiers;
                self.handle_key_down(key)
            }
            InputEvent::KeyUp { key, modifiers } => {
                self.input.modifiers = modifiers;
                if key == self.settings.keys.eraser {
                    self.input.eraser_key_held = false;
                }
                false
            }
            InputEvent::Scroll { delta } => {
                if delta.y != 0.0 {
                    self.change_pen_size(delta.y.signum());
                }
                false
            }
        };
        if changed {
            self.touch();
        }
    }

    /// Modifier state for the next pointer events
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.input.modifiers = modifiers;
    }

    fn handle_key_down(&mut self, key: Key) -> bool {
        let keys = self.settings.keys.clone();
        if key == keys.eraser {
            self.input.eraser_key_held = true;
            false
        } else if key == keys.toggle_tool {
            self.toggle_tool();
            false
        } else if key == keys.toggle_path_mode {
            self.path_editor.toggle_mode();
            true
        } else if key == keys.next_color {
            self.change_color(1);
            false
        } else if key == keys.previous_color {
            self.change_color(-1);
            false
        } else if key == keys.undo {
            self.undo();
            false
        } else if key == keys.redo {
            self.redo();
            false
        } else if key == keys.toggle_fill {
            self.toggle_fill()
        } else if key == keys.clear {
            if self.input.tool == ToolKind::Path && self.document.paths().has_selection() {
                self.delete_selected()
            } else {
                self.clear_current();
                false
            }
        } else if key == keys.pen_size_up {
            self.change_pen_size(1.0);
            false
        } else if key == keys.pen_size_down {
            self.change_pen_size(-1.0);
            false
        } else if key == keys.cancel {
            self.cancel_gesture()
        } else if key == keys.save {
            self.save_request = Some(self.settings.save_mode);
            false
        } else if key == keys.merged_save {
            self.save_request = Some(SaveMode::Merged);
            false
        } else {
            false
        }
    }

    pub fn active_tool(&self) -> ToolKind {
        self.input.tool
    }

    /// Switches tool, ending whatever the current one was doing.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.input.tool != tool {
            self.cancel_gesture();
            self.input.tool = tool;
            info!("Active tool: {:?}", tool);
            self.touch();
        }
    }

    pub fn toggle_tool(&mut self) {
        self.set_tool(self.input.tool.toggled());
    }

    pub fn set_path_mode(&mut self, mode: PathMode) {
        self.path_editor.set_mode(mode);
        self.touch();
    }

    /// Ends the active gesture. A path still being captured is dropped.
    pub fn cancel_gesture(&mut self) -> bool {
        let changed = self.raster_tool.cancel() | self.path_editor.cancel();
        if changed {
            self.touch();
        }
        changed
    }

    /// Takes a history snapshot of the current document.
    pub fn snapshot(&mut self) {
        self.sync_history_depth();
        self.history.push(self.document.clone());
    }

    /// Replaces the document with a previously taken snapshot.
    pub fn restore(&mut self, document: Document) {
        self.cancel_gesture();
        self.document = document;
        self.touch();
    }

    pub fn undo(&mut self) -> bool {
        self.cancel_gesture();
        match self.history.undo(&self.document) {
            Some(previous) => {
                self.document = previous;
                debug!("Undo ({} left)", self.history.undo_len());
                self.touch();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_gesture();
        match self.history.redo(&self.document) {
            Some(next) => {
                self.document = next;
                debug!("Redo ({} left)", self.history.redo_len());
                self.touch();
                true
            }
            None => false,
        }
    }

    pub fn delete_selected(&mut self) -> bool {
        let changed = self.with_path_editor(|editor, ctx| editor.delete_selected(ctx));
        if changed {
            self.touch();
        }
        changed
    }

    /// Toggles fill on the selected paths, or the default for new paths.
    pub fn toggle_fill(&mut self) -> bool {
        let changed = self.with_path_editor(|editor, ctx| editor.toggle_fill_selected(ctx));
        if changed {
            self.touch();
        }
        changed
    }

    pub fn scale_selected(&mut self, scale_x: f32, scale_y: f32) -> bool {
        let changed = self.with_path_editor(|editor, ctx| editor.scale_selected(scale_x, scale_y, ctx));
        if changed {
            self.touch();
        }
        changed
    }

    pub fn rotate_selected(&mut self, angle_degrees: f32) -> bool {
        let changed = self.with_path_editor(|editor, ctx| editor.rotate_selected(angle_degrees, ctx));
        if changed {
            self.touch();
        }
        changed
    }

    /// Steps through the palette. With the path tool active the selection takes the new color.
    pub fn change_color(&mut self, step: i32) -> Color32 {
        let color = self.settings.cycle_color(step);
        if self.input.tool == ToolKind::Path {
            self.with_path_editor(|editor, ctx| editor.recolor_selected(color, ctx));
        }
        self.touch();
        color
    }

    pub fn change_pen_size(&mut self, delta: f32) -> f32 {
        let size = self.settings.adjust_pen_size(delta);
        self.touch();
        size
    }

    pub fn clear_raster(&mut self) {
        self.cancel_gesture();
        self.snapshot();
        self.document.raster_mut().clear();
        self.touch();
    }

    pub fn clear_vector(&mut self) {
        self.cancel_gesture();
        self.snapshot();
        self.document.paths_mut().clear();
        self.touch();
    }

    pub fn clear_all(&mut self) {
        self.cancel_gesture();
        self.snapshot();
        self.document.raster_mut().clear();
        self.document.paths_mut().clear();
        self.touch();
    }

    /// Clears the active tool's layer, or both with [`DeleteMode::All`].
    pub fn clear_current(&mut self) {
        match (self.settings.delete_mode, self.input.tool) {
            (DeleteMode::All, _) => self.clear_all(),
            (DeleteMode::CurrentTool, ToolKind::Raster) => self.clear_raster(),
            (DeleteMode::CurrentTool, ToolKind::Path) => self.clear_vector(),
        }
    }

    /// Starts over on a blank canvas of the given size. History is dropped.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.cancel_gesture();
        self.background = None;
        self.document = Document::new(width, height);
        self.history.clear();
        self.settings.canvas_width = width;
        self.settings.canvas_height = height;
        info!("Canvas resized to {}x{}", width, height);
        self.touch();
    }

    /// Uses `image` as the background, sizing the canvas to match.
    pub fn set_background(&mut self, image: RgbaImage) -> CanvasResult<()> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(CanvasError::EmptyImage { width, height });
        }
        self.resize(width, height);
        self.background = Some(image);
        Ok(())
    }

    pub fn load_background_bytes(&mut self, bytes: &[u8]) -> CanvasResult<()> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        self.set_background(image)
    }

    pub fn load_background(&mut self, path: impl AsRef<Path>) -> CanvasResult<()> {
        let image = image::open(path.as_ref())?.to_rgba8();
        info!("Loaded background {}", path.as_ref().display());
        self.set_background(image)
    }

    pub fn background(&self) -> Option<&RgbaImage> {
        self.background.as_ref()
    }

    /// Background, raster layer, then vector paths.
    pub fn compose(&self) -> RgbaImage {
        let mut base = match &self.background {
            Some(background) => background.clone(),
            None => RgbaImage::from_pixel(
                self.width(),
                self.height(),
                image::Rgba(self.settings.background_color.to_srgba_unmultiplied()),
            ),
        };
        image::imageops::overlay(&mut base, self.document.raster().image(), 0, 0);
        self.document.draw_paths(&mut base);
        base
    }

    pub fn export_raster(&self) -> RgbaImage {
        self.document.raster().image().clone()
    }

    pub fn export_merged(&self) -> RgbaImage {
        self.compose()
    }

    pub fn export_vector(&self) -> Vec<VectorExport> {
        self.document
            .paths()
            .iter()
            .map(|path| VectorExport {
                commands: path.to_path_commands(),
                stroke_color: path.stroke_color(),
                stroke_width: path.stroke_width(),
                fill: path.fill_enabled().then_some(path.fill_color()),
            })
            .collect()
    }

    /// Writes the merged image; the format follows the file extension.
    pub fn save_merged(&self, path: impl AsRef<Path>) -> CanvasResult<()> {
        self.save(SaveMode::Merged, path)
    }

    /// Writes the raster layer with its transparency.
    pub fn save_raster(&self, path: impl AsRef<Path>) -> CanvasResult<()> {
        self.save(SaveMode::Raster, path)
    }

    pub fn save(&self, mode: SaveMode, path: impl AsRef<Path>) -> CanvasResult<()> {
        let image = match mode {
            SaveMode::Raster => self.export_raster(),
            SaveMode::Vector => self.document.render_vector_layer(),
            SaveMode::Merged => self.export_merged(),
        };
        image.save(path.as_ref())?;
        info!("Saved {} to {}", mode.label(), path.as_ref().display());
        Ok(())
    }

    /// Saves as a PNG named from the settings' prefix and counter into the save folder.
    /// Existing files are never overwritten. The counter advances on success.
    pub fn save_next(&mut self, mode: SaveMode) -> CanvasResult<PathBuf> {
        let folder = match self.settings.save_folder.as_str() {
            "" => PathBuf::from("."),
            folder => PathBuf::from(folder),
        };
        let path = unique_path(&folder, &self.settings.save_stem(), "png");
        self.save(mode, &path)?;
        self.settings.save_counter += 1;
        Ok(path)
    }

    /// A save asked for by key since the last call
    pub fn take_save_request(&mut self) -> Option<SaveMode> {
        self.save_request.take()
    }

    pub fn overlay(&self) -> Overlay {
        let paths = self.document.paths();
        let preview = self.path_editor.preview().map(|path| PreviewLine {
            points: path.geometry().points().to_vec(),
            color: path.stroke_color(),
            width: path.stroke_width(),
        });
        Overlay {
            selection_boxes: paths.selected().map(|p| p.bounding_box()).collect(),
            control_points: paths
                .selected()
                .flat_map(|p| p.control_points().iter().copied())
                .collect(),
            control_point_size: self.settings.control_point_size,
            preview,
        }
    }
}
