// Full-frame rendering tests for the hex viewer
// Frames are rendered headless, either to SVG markup or to a recorded
// command list


use hexview::canvas::Canvas;
use hexview::controller::{OverlayId, OverlayState};
use hexview::coords::Nibble;
use hexview::geometry::Rect;
use hexview::input::{InputEvent, Key, MouseButton};
use hexview::options::AppOptions;
use hexview::source::{HexDocument, Instruction, Disassembler};
use hexview::surface::{DrawCommand, RecordingSurface};
use hexview::viewer::HexViewer;

use crate::svg_surface::SvgSurface;

const WIDTH: i32 = 1000;
const HEIGHT: i32 = 400;

fn viewer(len: usize) -> HexViewer {
    let data = (0..len).map(|i| (i % 256) as u8).collect();
    HexViewer::new(HexDocument::from_bytes(data), AppOptions::default())
}

fn render_svg(viewer: &mut HexViewer) -> String {
    let mut canvas = Canvas::new(SvgSurface::new());
    assert!(canvas.initialize(WIDTH, HEIGHT));
    assert!(viewer.render(&mut canvas));
    canvas.surface().last_svg().unwrap().to_string()
}

fn recording_canvas() -> Canvas<RecordingSurface> {
    let mut canvas = Canvas::new(RecordingSurface::new());
    assert!(canvas.initialize(WIDTH, HEIGHT));
    canvas
}

fn render_commands(viewer: &mut HexViewer) -> Vec<DrawCommand> {
    let mut canvas = recording_canvas();
    assert!(viewer.render(&mut canvas));
    canvas.surface().last_frame().unwrap().to_vec()
}

fn texts(commands: &[DrawCommand]) -> Vec<String> {
    commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Text(_, _, text, _) => Some(text.clone()),
            _ => None,
        })
        .collect()
}

/// Thin caret bars in a frame
fn carets(commands: &[DrawCommand]) -> Vec<Rect> {
    commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::FillRect(r, _) if r.width == 2 && r.height == 16 => Some(*r),
            _ => None,
        })
        .collect()
}

struct Nop;

impl Disassembler for Nop {
    fn decode(&self, bytes: &[u8], _offset: u64) -> Option<Instruction> {
        (bytes.first() == Some(&0x90)).then(|| Instruction {
            text: "nop".to_string(),
            len: 1,
        })
    }
}

#[test]
fn test_svg_frame_contains_grid() {
    let mut v = viewer(64);
    let svg = render_svg(&mut v);
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Offset    00 01 02 03"));
    assert!(svg.contains("00000000  00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F  ................"));
    assert!(svg.contains("00000030  30 31 32 33 34 35 36 37 38 39 3A 3B 3C 3D 3E 3F  0123456789:;&lt;=&gt;?"));
    assert!(svg.contains(">Disassembly</text>"));
    for title in ["File", "Edit", "Search", "View", "Help"] {
        assert!(svg.contains(&format!(">{}</text>", title)), "missing menu {title}");
    }
}

#[test]
fn test_light_and_dark_frames_differ() {
    let mut dark = viewer(16);
    let mut light = HexViewer::new(
        HexDocument::from_bytes(vec![0; 16]),
        AppOptions {
            dark_mode: false,
            ..AppOptions::default()
        },
    );
    let a = render_commands(&mut dark);
    let b = render_commands(&mut light);
    assert_ne!(a.first(), b.first());
    assert_eq!(a.first(), Some(&DrawCommand::FillRect(Rect::new(0, 0, WIDTH, HEIGHT), dark.theme().window_background)));
}

#[test]
fn test_caret_follows_nibble() {
    let mut v = viewer(64);
    let first = render_commands(&mut v);
    // hex area starts at (90, 52) for an 8x16 cell
    assert_eq!(carets(&first), vec![Rect::new(90, 52, 2, 16)]);

    v.move_caret(17, Nibble::Low, false);
    let moved = render_commands(&mut v);
    assert_eq!(carets(&moved), vec![Rect::new(90 + 24 + 8, 52 + 16, 2, 16)]);
    assert!(moved.contains(&DrawCommand::FillRect(Rect::new(122, 68, 2, 16), v.theme().text)));
}

#[test]
fn test_caret_hidden_when_scrolled_away() {
    let mut v = viewer(16 * 100);
    render_commands(&mut v);
    v.handle_event(&InputEvent::Scroll { x: 300, y: 200, delta: 2 });
    assert_eq!(v.scroll_line(), 6);
    let frame = render_commands(&mut v);
    assert!(carets(&frame).is_empty());
    assert!(texts(&frame).iter().any(|t| t.starts_with("00000060  ")));
    assert!(!texts(&frame).iter().any(|t| t.starts_with("00000000  ")));
}

#[test]
fn test_scrollbar_only_when_scrollable() {
    let in_scrollbar = |commands: &[DrawCommand]| {
        commands
            .iter()
            .any(|c| matches!(c, DrawCommand::FillRoundedRect(r, _, _) if r.x >= WIDTH - 16))
    };
    let mut short = viewer(64);
    assert!(!in_scrollbar(&render_commands(&mut short)));

    let mut long = viewer(16 * 100);
    assert!(in_scrollbar(&render_commands(&mut long)));
}

#[test]
fn test_open_menu_is_drawn_over_grid() {
    let mut v = viewer(64);
    render_commands(&mut v);
    let file = v.menu_bar().menus()[0].bounds;
    v.handle_event(&InputEvent::click(file.x + 3, file.y + 3));
    assert_eq!(v.overlay().state(), OverlayState::Open(OverlayId::Menu(0)));

    let frame = render_commands(&mut v);
    let labels = texts(&frame);
    let exit = labels.iter().position(|t| t == "Exit").unwrap();
    let last_line = labels.iter().rposition(|t| t.starts_with("000000")).unwrap();
    assert!(exit > last_line);
}

#[test]
fn test_context_menu_frame() {
    let mut v = viewer(64);
    render_commands(&mut v);
    v.handle_event(&InputEvent::PointerDown {
        x: 100,
        y: 60,
        button: MouseButton::Right,
    });
    assert_eq!(v.overlay().state(), OverlayState::Open(OverlayId::ContextMenu));
    let labels = texts(&render_commands(&mut v));
    for label in ["Copy offset", "Copy hex", "Select all", "Go to"] {
        assert!(labels.iter().any(|t| t == label), "missing {label}");
    }

    v.handle_event(&InputEvent::key(Key::Escape));
    let labels = texts(&render_commands(&mut v));
    assert!(!labels.iter().any(|t| t == "Copy offset"));
}

#[test]
fn test_selection_highlight() {
    let mut v = viewer(64);
    render_commands(&mut v);
    v.move_caret(1, Nibble::High, false);
    v.move_caret(2, Nibble::High, true);
    let frame = render_commands(&mut v);
    let highlight = v.theme().control_check.with_alpha(80);
    let cells: Vec<Rect> = frame
        .iter()
        .filter_map(|c| match c {
            DrawCommand::FillRect(r, color) if *color == highlight => Some(*r),
            _ => None,
        })
        .collect();
    // one hex cell and one ASCII cell per selected byte
    assert_eq!(cells.len(), 4);
    assert!(cells.contains(&Rect::new(90 + 24, 52, 24, 16)));
}

#[test]
fn test_disassembly_column() {
    let mut data = vec![0u8; 48];
    data[16] = 0x90;
    let mut v = HexViewer::new(HexDocument::from_bytes(data), AppOptions::default())
        .with_disassembler(Box::new(Nop));
    let frame = render_commands(&mut v);
    let nops: Vec<_> = frame
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Text(x, y, text, _) if text == "nop" => Some((*x, *y)),
            _ => None,
        })
        .collect();
    // separator at 1000 - 16 - 300, second line
    assert_eq!(nops, vec![(684 + 10, 52 + 16)]);
}
