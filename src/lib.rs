#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod canvas;
pub mod document;
pub mod error;
pub mod file_handler;
pub mod geometry;
pub mod history;
pub mod input;
pub mod panels;
pub mod path_editor;
pub mod raster;
pub mod renderer;
pub mod settings;
pub mod stroke;
pub mod tools;
pub mod vector_path;

pub use app::SketchApp;
pub use canvas::{Canvas, Overlay, VectorExport};
pub use document::Document;
pub use error::{CanvasError, SettingsError};
pub use history::History;
pub use input::{DeviceKind, InputEvent, InputState, ToolKind};
pub use path_editor::{PathCollection, PathEditor, PathGesture, PathMode};
pub use raster::RasterLayer;
pub use renderer::Renderer;
pub use settings::Settings;
pub use stroke::RasterTool;
pub use tools::{Tool, ToolContext};
pub use vector_path::{PathCommand, VectorPath};
