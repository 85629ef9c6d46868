use std::path::{Path, PathBuf};

use eframe::egui;

use crate::canvas::Canvas;
use crate::error::CanvasResult;

/// Turns image files dropped on the window into canvas backgrounds.
#[derive(Debug, Default)]
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects files dropped this frame. Returns true if there are any.
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        ctx.input(|i| {
            if !i.raw.dropped_files.is_empty() {
                self.dropped_files = i.raw.dropped_files.clone();
            }
        });
        !self.dropped_files.is_empty()
    }

    /// Loads the first dropped image as the background. Other files are skipped.
    pub fn apply_dropped_background(&mut self, canvas: &mut Canvas) -> CanvasResult<bool> {
        let files = std::mem::take(&mut self.dropped_files);
        let Some(file) = files.iter().find(|f| is_image_file(f)) else {
            for file in &files {
                log::warn!("Dropped file is not a supported image: {}", display_name(file));
            }
            return Ok(false);
        };

        if let Some(bytes) = &file.bytes {
            log::info!("Loading background from memory: {} ({} bytes)", display_name(file), bytes.len());
            canvas.load_background_bytes(bytes)?;
            return Ok(true);
        }

        if let Some(path) = &file.path {
            canvas.load_background(path)?;
            return Ok(true);
        }

        log::warn!("Dropped file has no readable data: {}", display_name(file));
        Ok(false)
    }
}

fn display_name(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

/// First free `stem.ext`, `stem_1.ext`, `stem_2.ext`, ... in `folder`.
pub fn unique_path(folder: &Path, stem: &str, extension: &str) -> PathBuf {
    let mut path = folder.join(format!("{stem}.{extension}"));
    let mut counter = 1;
    while path.exists() {
        path = folder.join(format!("{stem}_{counter}.{extension}"));
        counter += 1;
    }
    path
}

/// Check if a file is an image we can decode, based on MIME type or extension
fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        matches!(file.mime.as_str(), "image/png" | "image/jpeg")
    } else if let Some(ext) = file.path.as_ref().and_then(|p| p.extension()) {
        let ext = ext.to_string_lossy().to_lowercase();
        matches!(ext.as_str(), "png" | "jpg" | "jpeg")
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn dropped(path: &str, mime: &str) -> egui::DroppedFile {
        egui::DroppedFile {
            path: Some(PathBuf::from(path)),
            mime: mime.to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn test_image_detection() {
        assert!(is_image_file(&dropped("photo.JPG", "")));
        assert!(is_image_file(&dropped("whatever", "image/png")));
        assert!(!is_image_file(&dropped("notes.txt", "")));
        assert!(!is_image_file(&dropped("anim.gif", "image/gif")));
    }

    #[test]
    fn test_unique_path_skips_existing_files() {
        let folder = std::env::temp_dir().join(format!("sketchrush-unique-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&folder).unwrap();

        let first = unique_path(&folder, "sketch000", "png");
        assert_eq!(first, folder.join("sketch000.png"));
        std::fs::write(&first, b"taken").unwrap();
        let second = unique_path(&folder, "sketch000", "png");
        assert_eq!(second, folder.join("sketch000_1.png"));
        std::fs::write(&second, b"taken").unwrap();
        assert_eq!(unique_path(&folder, "sketch000", "png"), folder.join("sketch000_2.png"));

        let _ = std::fs::remove_dir_all(&folder);
    }

    #[test]
    fn test_non_image_drop_is_ignored() {
        let mut handler = FileHandler::new();
        handler.dropped_files.push(dropped("notes.txt", "text/plain"));
        let mut canvas = Canvas::default();
        assert!(!handler.apply_dropped_background(&mut canvas).unwrap());
        assert!(canvas.background().is_none());
    }
}
