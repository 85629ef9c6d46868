use egui::{PointerButton, Pos2};

use crate::document::Document;
use crate::history::History;
use crate::input::InputState;
use crate::settings::Settings;

/// Everything a tool may read or change while handling one event.
pub struct ToolContext<'a> {
    pub document: &'a mut Document,
    pub history: &'a mut History<Document>,
    pub settings: &'a Settings,
    pub input: &'a InputState,
}

impl ToolContext<'_> {
    /// Records the current document so the next mutation can be undone.
    pub fn checkpoint(&mut self) {
        self.history.push(self.document.clone());
    }
}

/// Tool trait defines the interface for the canvas tools.
///
/// Each handler returns `true` when it changed the document or anything drawn
/// on top of it, so the display can be refreshed.
pub trait Tool: Send + Sync {
    /// Return the name of the tool
    fn name(&self) -> &'static str;

    /// Handle pointer press on the canvas.
    fn on_pointer_down(&mut self, pos: Pos2, button: PointerButton, ctx: &mut ToolContext<'_>) -> bool;

    /// Handle pointer movement. Tools ignore it unless a gesture is running.
    fn on_pointer_move(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> bool;

    /// Handle pointer release, finishing the current gesture.
    fn on_pointer_up(&mut self, pos: Pos2, button: PointerButton, ctx: &mut ToolContext<'_>) -> bool;

    /// Abandon the current gesture without committing anything new.
    fn cancel(&mut self) -> bool;

    /// True while a gesture is in progress
    fn is_busy(&self) -> bool;
}
