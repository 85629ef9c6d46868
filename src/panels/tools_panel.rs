use eframe::egui::{self, Slider};

use crate::SketchApp;
use crate::input::ToolKind;
use crate::path_editor::PathMode;
use crate::settings::{DeleteMode, SaveMode};

pub fn tools_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(200.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            let tool = app.canvas().active_tool();
            ui.horizontal(|ui| {
                if ui.selectable_label(tool == ToolKind::Raster, "🖌 Raster").clicked() {
                    app.canvas_mut().set_tool(ToolKind::Raster);
                }
                if ui.selectable_label(tool == ToolKind::Path, "✒ Path").clicked() {
                    app.canvas_mut().set_tool(ToolKind::Path);
                }
            });

            let mode = app.canvas().path_editor().mode();
            ui.add_enabled_ui(tool == ToolKind::Path, |ui| {
                ui.horizontal(|ui| {
                    if ui.selectable_label(mode == PathMode::Drawing, "Draw").clicked() {
                        app.canvas_mut().set_path_mode(PathMode::Drawing);
                    }
                    if ui.selectable_label(mode == PathMode::Selection, "Select").clicked() {
                        app.canvas_mut().set_path_mode(PathMode::Selection);
                    }
                });
            });
            ui.separator();

            // Palette
            let settings = app.canvas().settings();
            let (palette, current) = (settings.palette.clone(), settings.color_index);
            ui.horizontal_wrapped(|ui| {
                for (i, color) in palette.iter().enumerate() {
                    let swatch = egui::Button::new("    ").fill(*color).selected(i == current);
                    if ui.add(swatch).clicked() {
                        app.canvas_mut().change_color(i as i32 - current as i32);
                    }
                }
            });

            let mut pen_size = app.canvas().settings().pen_size;
            ui.horizontal(|ui| {
                ui.label("Pen size:");
                if ui.add(Slider::new(&mut pen_size, 1.0..=50.0)).changed() {
                    app.canvas_mut().settings_mut().pen_size = pen_size;
                }
            });

            let mut stabilization = app.canvas().settings().stabilization;
            ui.horizontal(|ui| {
                ui.label("Stabilizer:");
                if ui.add(Slider::new(&mut stabilization, 0..=20)).changed() {
                    app.canvas_mut().settings_mut().stabilization = stabilization;
                }
            });

            let mut use_tablet = app.canvas().settings().use_tablet;
            if ui.checkbox(&mut use_tablet, "Tablet eraser").changed() {
                app.canvas_mut().settings_mut().use_tablet = use_tablet;
            }
            ui.separator();

            ui.label("Paths");
            let mut tolerance = app.canvas().settings().simplify_tolerance;
            ui.horizontal(|ui| {
                ui.label("Simplify:");
                if ui.add(Slider::new(&mut tolerance, 0.0..=10.0)).changed() {
                    app.canvas_mut().settings_mut().simplify_tolerance = tolerance;
                }
            });
            let mut strength = app.canvas().settings().smooth_strength;
            ui.horizontal(|ui| {
                ui.label("Smooth:");
                if ui.add(Slider::new(&mut strength, 0..=10)).changed() {
                    app.canvas_mut().settings_mut().smooth_strength = strength;
                }
            });

            let has_selection = app.canvas().document().paths().has_selection();
            ui.horizontal(|ui| {
                let fill_label = if has_selection {
                    "Toggle fill"
                } else if app.canvas().path_editor().default_fill() {
                    "Fill new: on"
                } else {
                    "Fill new: off"
                };
                if ui.button(fill_label).clicked() {
                    app.canvas_mut().toggle_fill();
                }
                if ui.add_enabled(has_selection, egui::Button::new("Delete")).clicked() {
                    app.canvas_mut().delete_selected();
                }
            });
            ui.add_enabled_ui(has_selection, |ui| {
                ui.horizontal(|ui| {
                    if ui.button("⟲ 15°").clicked() {
                        app.canvas_mut().rotate_selected(-15.0);
                    }
                    if ui.button("⟳ 15°").clicked() {
                        app.canvas_mut().rotate_selected(15.0);
                    }
                    if ui.button("−10%").clicked() {
                        app.canvas_mut().scale_selected(0.9, 0.9);
                    }
                    if ui.button("+10%").clicked() {
                        app.canvas_mut().scale_selected(1.1, 1.1);
                    }
                });
            });
            ui.separator();

            // Undo/Redo section
            ui.horizontal(|ui| {
                let history = app.canvas().history();
                let (can_undo, can_redo) = (history.can_undo(), history.can_redo());

                if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                    app.canvas_mut().undo();
                }
                if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                    app.canvas_mut().redo();
                }
            });
            let history = app.canvas().history();
            ui.label(format!("Undo: {}  Redo: {}", history.undo_len(), history.redo_len()));
            let mut depth = app.canvas().settings().history_depth;
            ui.horizontal(|ui| {
                ui.label("Undo steps:");
                if ui.add(Slider::new(&mut depth, 1..=1000)).changed() {
                    app.canvas_mut().settings_mut().history_depth = depth;
                }
            });
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("Clear raster").clicked() {
                    app.canvas_mut().clear_raster();
                }
                if ui.button("Clear paths").clicked() {
                    app.canvas_mut().clear_vector();
                }
                if ui.button("Clear all").clicked() {
                    app.canvas_mut().clear_all();
                }
            });
            let mut clear_all = app.canvas().settings().delete_mode == DeleteMode::All;
            if ui.checkbox(&mut clear_all, "Clear key removes both layers").changed() {
                app.canvas_mut().settings_mut().delete_mode =
                    if clear_all { DeleteMode::All } else { DeleteMode::CurrentTool };
            }
            ui.separator();

            let mut save_folder = app.canvas().settings().save_folder.clone();
            ui.horizontal(|ui| {
                ui.label("Folder");
                if ui.text_edit_singleline(&mut save_folder).changed() {
                    app.canvas_mut().settings_mut().save_folder = save_folder;
                }
            });
            let mut prefix = app.canvas().settings().save_name_prefix.clone();
            ui.horizontal(|ui| {
                ui.label("Name");
                if ui.text_edit_singleline(&mut prefix).changed() {
                    app.canvas_mut().settings_mut().save_name_prefix = prefix;
                }
            });
            let mut save_mode = app.canvas().settings().save_mode;
            egui::ComboBox::from_label("Save mode")
                .selected_text(save_mode.label())
                .show_ui(ui, |ui| {
                    for mode in SaveMode::ALL {
                        ui.selectable_value(&mut save_mode, mode, mode.label());
                    }
                });
            if save_mode != app.canvas().settings().save_mode {
                app.canvas_mut().settings_mut().save_mode = save_mode;
            }
            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    app.save(save_mode);
                }
                if ui.button("Merged save").clicked() {
                    app.save(SaveMode::Merged);
                }
            });
            ui.horizontal(|ui| {
                if ui.button("Save settings").clicked() {
                    app.save_settings_file();
                }
                if ui.button("Load settings").clicked() {
                    app.load_settings_file();
                }
            });

            if let Some(status) = app.status() {
                ui.separator();
                ui.label(status);
            }
        });
}
