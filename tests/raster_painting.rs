use egui::{Key, Modifiers, PointerButton, Pos2, Vec2};
use sketchrush::{Canvas, DeviceKind, InputEvent, ToolKind};

fn stroke_with(canvas: &mut Canvas, button: PointerButton, points: &[(f32, f32)]) {
    let pos = |(x, y): (f32, f32)| Pos2::new(x, y);
    canvas.handle_event(InputEvent::PointerDown { pos: pos(points[0]), button });
    for p in &points[1..] {
        canvas.handle_event(InputEvent::PointerMove { pos: pos(*p) });
    }
    canvas.handle_event(InputEvent::PointerUp {
        pos: pos(points[points.len() - 1]),
        button,
    });
}

fn stroke(canvas: &mut Canvas, points: &[(f32, f32)]) {
    stroke_with(canvas, PointerButton::Primary, points);
}

fn pixel(canvas: &Canvas, x: u32, y: u32) -> [u8; 4] {
    canvas.document().raster().pixel(x, y).unwrap()
}

/// True when no pixel carries color without alpha or differs from `allowed`
fn only_colors(canvas: &Canvas, allowed: [u8; 4]) -> bool {
    canvas
        .export_raster()
        .pixels()
        .all(|p| p.0 == [0, 0, 0, 0] || p.0 == allowed)
}

#[test]
fn test_pen_paints_palette_color() {
    let mut canvas = Canvas::default();
    canvas.change_color(3);
    stroke(&mut canvas, &[(10.0, 10.0), (60.0, 10.0), (60.0, 60.0)]);

    assert_eq!(pixel(&canvas, 30, 10), [255, 0, 0, 255]);
    assert_eq!(pixel(&canvas, 60, 40), [255, 0, 0, 255]);
    assert_eq!(pixel(&canvas, 30, 40), [0, 0, 0, 0]);
    assert!(only_colors(&canvas, [255, 0, 0, 255]));
}

#[test]
fn test_press_draws_dot() {
    let mut canvas = Canvas::default();
    canvas.handle_event(InputEvent::PointerDown {
        pos: Pos2::new(20.5, 20.5),
        button: PointerButton::Primary,
    });
    assert_eq!(pixel(&canvas, 20, 20), [0, 0, 0, 255]);
}

#[test]
fn test_eraser_never_paints_color() {
    let mut canvas = Canvas::default();
    stroke_with(&mut canvas, PointerButton::Secondary, &[(10.0, 10.0), (100.0, 100.0)]);
    assert!(canvas.document().raster().is_blank());

    stroke(&mut canvas, &[(10.0, 50.0), (100.0, 50.0)]);
    stroke_with(&mut canvas, PointerButton::Secondary, &[(10.0, 50.0), (100.0, 50.0)]);
    assert!(canvas.document().raster().is_blank());
    assert_eq!(canvas.history().undo_len(), 3);
}

#[test]
fn test_eraser_key() {
    let mut canvas = Canvas::default();
    stroke(&mut canvas, &[(10.0, 50.0), (100.0, 50.0)]);

    canvas.handle_event(InputEvent::KeyDown { key: Key::E, modifiers: Modifiers::NONE });
    assert!(canvas.input().eraser_key_held);
    stroke(&mut canvas, &[(10.0, 50.0), (50.0, 50.0)]);
    assert_eq!(pixel(&canvas, 30, 50), [0, 0, 0, 0]);
    assert_eq!(pixel(&canvas, 80, 50), [0, 0, 0, 255]);

    canvas.handle_event(InputEvent::KeyUp { key: Key::E, modifiers: Modifiers::NONE });
    stroke(&mut canvas, &[(10.0, 50.0), (50.0, 50.0)]);
    assert_eq!(pixel(&canvas, 30, 50), [0, 0, 0, 255]);
}

#[test]
fn test_tablet_eraser_end() {
    let mut canvas = Canvas::default();
    stroke(&mut canvas, &[(10.0, 50.0), (100.0, 50.0)]);

    canvas.handle_event(InputEvent::Pressure {
        pos: Pos2::new(10.0, 50.0),
        pressure: 1.0,
        device: DeviceKind::Eraser,
    });
    stroke(&mut canvas, &[(10.0, 50.0), (100.0, 50.0)]);
    assert!(canvas.document().raster().is_blank());

    // With tablet support off the eraser end draws like a pen
    canvas.settings_mut().use_tablet = false;
    canvas.handle_event(InputEvent::Pressure {
        pos: Pos2::new(10.0, 50.0),
        pressure: 1.0,
        device: DeviceKind::Mouse,
    });
    canvas.handle_event(InputEvent::Pressure {
        pos: Pos2::new(10.0, 50.0),
        pressure: 1.0,
        device: DeviceKind::Eraser,
    });
    stroke(&mut canvas, &[(10.0, 50.0), (100.0, 50.0)]);
    assert_eq!(pixel(&canvas, 50, 50), [0, 0, 0, 255]);
}

#[test]
fn test_pressure_scales_width() {
    let mut canvas = Canvas::default();
    canvas.settings_mut().pen_size = 20.0;
    stroke(&mut canvas, &[(10.0, 20.0), (100.0, 20.0)]);
    assert_eq!(pixel(&canvas, 50, 27), [0, 0, 0, 255]);

    canvas.handle_event(InputEvent::Pressure {
        pos: Pos2::new(10.0, 80.0),
        pressure: 0.2,
        device: DeviceKind::Stylus,
    });
    stroke(&mut canvas, &[(10.0, 80.0), (100.0, 80.0)]);
    assert_eq!(pixel(&canvas, 50, 80), [0, 0, 0, 255]);
    assert_eq!(pixel(&canvas, 50, 84), [0, 0, 0, 0]);
}

#[test]
fn test_stabilization_degree_zero_is_raw() {
    let mut canvas = Canvas::default();
    let points = [(10.0, 10.0), (20.0, 30.0), (45.0, 12.0), (70.0, 70.0)];
    stroke(&mut canvas, &points);
    let expected: Vec<Pos2> = points.iter().map(|(x, y)| Pos2::new(*x, *y)).collect();
    assert_eq!(canvas.raster_tool().drawn_points(), expected.as_slice());
}

#[test]
fn test_stabilization_averages_window() {
    let mut canvas = Canvas::default();
    canvas.settings_mut().stabilization = 2;
    stroke(&mut canvas, &[(0.0, 0.0), (10.0, 0.0), (20.0, 10.0)]);
    assert_eq!(
        canvas.raster_tool().drawn_points(),
        &[Pos2::new(0.0, 0.0), Pos2::new(10.0, 0.0), Pos2::new(15.0, 5.0)]
    );

    // The window starts empty for every stroke
    stroke(&mut canvas, &[(100.0, 100.0), (110.0, 100.0), (120.0, 100.0)]);
    assert_eq!(
        canvas.raster_tool().drawn_points(),
        &[Pos2::new(100.0, 100.0), Pos2::new(110.0, 100.0), Pos2::new(115.0, 100.0)]
    );
}

#[test]
fn test_pen_size_controls() {
    let mut canvas = Canvas::default();
    canvas.handle_event(InputEvent::Scroll { delta: Vec2::new(0.0, 3.0) });
    assert_eq!(canvas.settings().pen_size, 6.0);
    canvas.handle_event(InputEvent::KeyDown { key: Key::Minus, modifiers: Modifiers::NONE });
    canvas.handle_event(InputEvent::KeyDown { key: Key::Minus, modifiers: Modifiers::NONE });
    assert_eq!(canvas.settings().pen_size, 4.0);

    for _ in 0..100 {
        canvas.handle_event(InputEvent::KeyDown { key: Key::Plus, modifiers: Modifiers::NONE });
    }
    assert_eq!(canvas.settings().pen_size, 50.0);
}

#[test]
fn test_path_tool_leaves_raster_alone() {
    let mut canvas = Canvas::default();
    canvas.set_tool(ToolKind::Path);
    stroke(&mut canvas, &[(10.0, 10.0), (100.0, 10.0)]);
    assert!(canvas.document().raster().is_blank());
    assert_eq!(canvas.document().paths().len(), 1);
}

#[test]
fn test_mouse_stroke_after_pen_lift_uses_full_width() {
    let mut canvas = Canvas::default();
    canvas.settings_mut().pen_size = 20.0;
    canvas.handle_event(InputEvent::Pressure {
        pos: Pos2::new(10.0, 80.0),
        pressure: 0.0,
        device: DeviceKind::Stylus,
    });
    canvas.handle_event(InputEvent::Pressure {
        pos: Pos2::new(10.0, 80.0),
        pressure: 1.0,
        device: DeviceKind::Mouse,
    });
    assert_eq!(canvas.input().pressure, None);

    stroke(&mut canvas, &[(10.0, 80.0), (100.0, 80.0)]);
    assert_eq!(pixel(&canvas, 50, 85), [0, 0, 0, 255]);
}

#[test]
fn test_pressure_ignored_without_tablet_support() {
    let mut canvas = Canvas::default();
    canvas.settings_mut().pen_size = 20.0;
    canvas.settings_mut().use_tablet = false;
    canvas.handle_event(InputEvent::Pressure {
        pos: Pos2::new(10.0, 80.0),
        pressure: 0.1,
        device: DeviceKind::Stylus,
    });
    stroke(&mut canvas, &[(10.0, 80.0), (100.0, 80.0)]);
    assert_eq!(pixel(&canvas, 50, 85), [0, 0, 0, 255]);
}
