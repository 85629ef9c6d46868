use std::fs;
use std::path::Path;

use egui::{Color32, Key, Modifiers, PointerButton};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::history::DEFAULT_MAX_DEPTH;

pub const MIN_PEN_SIZE: f32 = 1.0;
pub const MAX_PEN_SIZE: f32 = 50.0;

/// Modifier a pointer press can be qualified with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierKey {
    Ctrl,
    Alt,
    Shift,
}

impl ModifierKey {
    pub fn is_held(self, modifiers: &Modifiers) -> bool {
        match self {
            Self::Ctrl => modifiers.ctrl || modifiers.command,
            Self::Alt => modifiers.alt,
            Self::Shift => modifiers.shift,
        }
    }
}

/// What the clear key removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeleteMode {
    /// Only the layer of the active tool
    #[default]
    CurrentTool,
    All,
}

/// Which layers a save writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SaveMode {
    /// The freehand layer on a transparent background
    #[default]
    Raster,
    /// The rendered paths on a transparent background
    Vector,
    /// Background, raster layer and paths
    Merged,
}

impl SaveMode {
    pub const ALL: [Self; 3] = [Self::Raster, Self::Vector, Self::Merged];

    pub fn label(self) -> &'static str {
        match self {
            Self::Raster => "Raster layer",
            Self::Vector => "Paths",
            Self::Merged => "Merged",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub toggle_tool: Key,
    pub toggle_path_mode: Key,
    pub next_color: Key,
    pub previous_color: Key,
    pub undo: Key,
    pub redo: Key,
    pub eraser: Key,
    pub toggle_fill: Key,
    pub clear: Key,
    pub pen_size_up: Key,
    pub pen_size_down: Key,
    pub cancel: Key,
    /// Saves with the configured [`SaveMode`]
    pub save: Key,
    pub merged_save: Key,
    pub add_control_point: ModifierKey,
    pub delete_control_point: ModifierKey,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            toggle_tool: Key::Tab,
            toggle_path_mode: Key::Q,
            next_color: Key::C,
            previous_color: Key::V,
            undo: Key::Z,
            redo: Key::X,
            eraser: Key::E,
            toggle_fill: Key::F,
            clear: Key::Delete,
            pen_size_up: Key::Plus,
            pen_size_down: Key::Minus,
            cancel: Key::Escape,
            save: Key::Enter,
            merged_save: Key::S,
            add_control_point: ModifierKey::Ctrl,
            delete_control_point: ModifierKey::Alt,
        }
    }
}

/// Pointer buttons for the raster tool. `None` disables the action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MouseBindings {
    pub pen: Option<PointerButton>,
    pub eraser: Option<PointerButton>,
}

impl Default for MouseBindings {
    fn default() -> Self {
        Self {
            pen: Some(PointerButton::Primary),
            eraser: Some(PointerButton::Secondary),
        }
    }
}

/// User configuration, read by the canvas at the time of each operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub pen_size: f32,
    pub palette: Vec<Color32>,
    pub color_index: usize,
    pub background_color: Color32,
    /// Raster smoothing window; 0 draws raw input
    pub stabilization: usize,

    /// Douglas-Peucker tolerance applied when a path is finalized
    pub simplify_tolerance: f32,
    pub smooth_strength: u32,
    /// Side of the square control point hit box
    pub control_point_size: f32,
    pub hit_threshold: f32,

    pub keys: KeyBindings,
    pub mouse: MouseBindings,
    pub use_tablet: bool,
    pub delete_mode: DeleteMode,
    /// Undo steps kept before the oldest is evicted
    pub history_depth: usize,

    pub canvas_width: u32,
    pub canvas_height: u32,

    pub save_mode: SaveMode,
    /// Empty means the working directory
    pub save_folder: String,
    pub save_name_prefix: String,
    /// Number of the next saved file
    pub save_counter: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pen_size: 5.0,
            palette: vec![
                Color32::BLACK,
                Color32::WHITE,
                Color32::BLUE,
                Color32::RED,
                Color32::YELLOW,
                Color32::GREEN,
                Color32::from_rgb(255, 0, 255),
            ],
            color_index: 0,
            background_color: Color32::WHITE,
            stabilization: 0,
            simplify_tolerance: 1.0,
            smooth_strength: 1,
            control_point_size: 10.0,
            hit_threshold: 2.0,
            keys: KeyBindings::default(),
            mouse: MouseBindings::default(),
            use_tablet: true,
            delete_mode: DeleteMode::CurrentTool,
            history_depth: DEFAULT_MAX_DEPTH,
            canvas_width: 512,
            canvas_height: 512,
            save_mode: SaveMode::Raster,
            save_folder: String::new(),
            save_name_prefix: "sketch".to_owned(),
            save_counter: 0,
        }
    }
}

impl Settings {
    /// Key used for eframe storage
    pub const STORAGE_KEY: &'static str = "sketchrush_settings";

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&text)?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// The active palette color, black if the palette is empty.
    pub fn current_color(&self) -> Color32 {
        self.palette
            .get(self.color_index % self.palette.len().max(1))
            .copied()
            .unwrap_or(Color32::BLACK)
    }

    /// Moves through the palette by `step`, wrapping at both ends.
    pub fn cycle_color(&mut self, step: i32) -> Color32 {
        let len = self.palette.len() as i64;
        if len > 0 {
            let index = (self.color_index as i64 + step as i64).rem_euclid(len);
            self.color_index = index as usize;
        }
        self.current_color()
    }

    /// File stem for the next save, e.g. `sketch007`
    pub fn save_stem(&self) -> String {
        format!("{}{:03}", self.save_name_prefix, self.save_counter)
    }

    pub fn adjust_pen_size(&mut self, delta: f32) -> f32 {
        self.pen_size = (self.pen_size + delta).clamp(MIN_PEN_SIZE, MAX_PEN_SIZE);
        self.pen_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.pen_size, 5.0);
        assert_eq!(settings.palette.len(), 7);
        assert_eq!(settings.current_color(), Color32::BLACK);
        assert_eq!(settings.keys.toggle_tool, Key::Tab);
        assert_eq!(settings.keys.add_control_point, ModifierKey::Ctrl);
        assert_eq!((settings.canvas_width, settings.canvas_height), (512, 512));
    }

    #[test]
    fn test_color_cycles_both_ways() {
        let mut settings = Settings::default();
        assert_eq!(settings.cycle_color(-1), Color32::from_rgb(255, 0, 255));
        assert_eq!(settings.color_index, 6);
        assert_eq!(settings.cycle_color(1), Color32::BLACK);
        assert_eq!(settings.cycle_color(3), Color32::RED);
    }

    #[test]
    fn test_pen_size_clamped() {
        let mut settings = Settings::default();
        assert_eq!(settings.adjust_pen_size(-100.0), MIN_PEN_SIZE);
        assert_eq!(settings.adjust_pen_size(100.0), MAX_PEN_SIZE);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "pen_size": 12.0, "use_tablet": false }"#).unwrap();
        assert_eq!(settings.pen_size, 12.0);
        assert!(!settings.use_tablet);
        assert_eq!(settings.simplify_tolerance, 1.0);
        assert_eq!(settings.keys, KeyBindings::default());
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!("sketchrush-settings-{}.json", uuid::Uuid::new_v4()));
        let mut settings = Settings::default();
        settings.stabilization = 4;
        settings.delete_mode = DeleteMode::All;
        settings.save_mode = SaveMode::Merged;
        settings.save_counter = 12;
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_save_stem_counts_up() {
        let mut settings = Settings::default();
        assert_eq!(settings.save_stem(), "sketch000");
        settings.save_counter = 42;
        settings.save_name_prefix = "page".to_owned();
        assert_eq!(settings.save_stem(), "page042");
        assert_eq!(settings.keys.save, Key::Enter);
        assert_eq!(settings.keys.merged_save, Key::S);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = Settings::load("/nonexistent/sketchrush/settings.json");
        assert!(matches!(result, Err(SettingsError::Io(_))));
    }

    #[test]
    fn test_modifier_keys() {
        let mods = Modifiers { alt: true, ..Default::default() };
        assert!(ModifierKey::Alt.is_held(&mods));
        assert!(!ModifierKey::Ctrl.is_held(&mods));
    }
}
