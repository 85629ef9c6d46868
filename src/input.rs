use egui::{Context, Key, Modifiers, PointerButton, Pos2, Rect, TouchPhase, Vec2};

/// Kind of device that produced a pressure sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Stylus,
    /// The eraser end of a stylus
    Eraser,
    Mouse,
}

/// Which tool receives pointer events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolKind {
    #[default]
    Raster,
    Path,
}

impl ToolKind {
    pub fn toggled(self) -> Self {
        match self {
            Self::Raster => Self::Path,
            Self::Path => Self::Raster,
        }
    }
}

/// Input the canvas understands, in canvas pixel coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { pos: Pos2, button: PointerButton },
    PointerMove { pos: Pos2 },
    PointerUp { pos: Pos2, button: PointerButton },
    Pressure { pos: Pos2, pressure: f32, device: DeviceKind },
    KeyDown { key: Key, modifiers: Modifiers },
    KeyUp { key: Key, modifiers: Modifiers },
    Scroll { delta: Vec2 },
}

/// Mode flags and device state shared with the tools
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub tool: ToolKind,
    pub eraser_key_held: bool,
    /// Last tablet device seen while tablet support was on
    pub tablet_device: Option<DeviceKind>,
    pub pressure: Option<f32>,
    pub modifiers: Modifiers,
    pub pointer_pos: Option<Pos2>,
}

impl InputState {
    /// Whether raster strokes should erase, ignoring the button that started them.
    pub fn eraser_active(&self, use_tablet: bool) -> bool {
        self.eraser_key_held || (use_tablet && self.tablet_device == Some(DeviceKind::Eraser))
    }

    /// Records a pressure sample. Mouse samples, and any sample while tablet
    /// support is off, drop back to constant width.
    pub fn record_pressure(&mut self, pressure: f32, device: DeviceKind, use_tablet: bool) {
        match device {
            DeviceKind::Stylus | DeviceKind::Eraser if use_tablet => {
                self.pressure = Some(pressure.clamp(0.0, 1.0));
                self.tablet_device = Some(device);
            }
            _ => {
                self.pressure = None;
                self.tablet_device = None;
            }
        }
    }
}

/// Converts raw egui input into [`InputEvent`]s relative to the canvas rect
#[derive(Debug, Default)]
pub struct InputHandler {
    held_buttons: Vec<PointerButton>,
    last_pointer_pos: Option<Pos2>,
    /// A touch or pen contact is down
    touching: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects this frame's events. Presses only count inside `canvas_rect`;
    /// once a button is held, moves and the release are reported wherever they happen.
    pub fn process_input(&mut self, ctx: &Context, canvas_rect: Rect) -> Vec<InputEvent> {
        let to_canvas = |pos: Pos2| Pos2::new(pos.x - canvas_rect.min.x, pos.y - canvas_rect.min.y);
        let keyboard_free = !ctx.wants_keyboard_input();
        let mut events = Vec::new();

        ctx.input(|input| {
            for event in &input.events {
                match event {
                    egui::Event::PointerMoved(pos) => {
                        if Some(*pos) == self.last_pointer_pos {
                            continue;
                        }
                        self.last_pointer_pos = Some(*pos);
                        if !self.held_buttons.is_empty() || canvas_rect.contains(*pos) {
                            events.push(InputEvent::PointerMove { pos: to_canvas(*pos) });
                        }
                    }
                    egui::Event::PointerButton { pos, button, pressed: true, .. } => {
                        if canvas_rect.contains(*pos) && !self.held_buttons.contains(button) {
                            self.held_buttons.push(*button);
                            if !self.touching {
                                events.push(InputEvent::Pressure {
                                    pos: to_canvas(*pos),
                                    pressure: 1.0,
                                    device: DeviceKind::Mouse,
                                });
                            }
                            events.push(InputEvent::PointerDown {
                                pos: to_canvas(*pos),
                                button: *button,
                            });
                        }
                    }
                    egui::Event::PointerButton { pos, button, pressed: false, .. } => {
                        if let Some(index) = self.held_buttons.iter().position(|b| b == button) {
                            self.held_buttons.remove(index);
                            events.push(InputEvent::PointerUp {
                                pos: to_canvas(*pos),
                                button: *button,
                            });
                        }
                    }
                    egui::Event::Touch { pos, phase, force, .. } => match phase {
                        TouchPhase::Start | TouchPhase::Move => {
                            self.touching = true;
                            if let Some(force) = force {
                                events.push(InputEvent::Pressure {
                                    pos: to_canvas(*pos),
                                    pressure: *force,
                                    device: DeviceKind::Stylus,
                                });
                            }
                        }
                        // Lift-off reports zero force
                        TouchPhase::End | TouchPhase::Cancel => self.touching = false,
                    },
                    egui::Event::MouseWheel { delta, .. } => {
                        if input.pointer.hover_pos().is_some_and(|p| canvas_rect.contains(p)) {
                            events.push(InputEvent::Scroll { delta: *delta });
                        }
                    }
                    egui::Event::Key { key, pressed, repeat: false, modifiers, .. } if keyboard_free => {
                        events.push(if *pressed {
                            InputEvent::KeyDown { key: *key, modifiers: *modifiers }
                        } else {
                            InputEvent::KeyUp { key: *key, modifiers: *modifiers }
                        });
                    }
                    _ => {}
                }
            }
        });

        events
    }
}
