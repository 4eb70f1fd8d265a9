use hexview::canvas::Canvas;
use hexview::coords::{GridMapper, Nibble, grid_point};
use hexview::dropdown::{DropdownList, VISIBLE_ROWS};
use hexview::layout::{FontMetrics, LayoutMetrics};
use hexview::surface::RecordingSurface;
use hexview::theme::Theme;
use hexview::widgets::{WidgetState, button_fill};
use hexview::geometry::Rect;
use proptest::prelude::*;

fn mapper(char_width: f32, char_height: f32, bytes_per_line: usize, start_byte: u64) -> GridMapper {
    let layout = LayoutMetrics::for_font(FontMetrics {
        char_width,
        char_height,
    });
    GridMapper::new(&layout, 90.0, 52.0, bytes_per_line, start_byte)
}

/// Cell sizes seen in practice: the X11/Cocoa 9.6x20 default, the Windows
/// 8x16 fallback and a measured 9x17 font.
fn cell() -> impl Strategy<Value = (f32, f32)> {
    prop_oneof![
        Just((9.6, 20.0)),
        Just((8.0, 16.0)),
        Just((9.0, 17.0)),
        (5u8..16, 10u8..24).prop_map(|(w, h)| (w as f32, h as f32)),
    ]
}

proptest! {
    #[test]
    fn pixel_of_byte_maps_back_to_byte(
        (char_width, char_height) in cell(),
        wide in any::<bool>(),
        start_line in 0u64..500,
        relative in 0u64..800,
    ) {
        let bpl = if wide { 16 } else { 8 };
        let start = start_line * bpl as u64;
        let m = mapper(char_width, char_height, bpl, start);
        let index = start + relative;
        let p = m.byte_point(index);
        let info = m.byte_from_pixel(p.x, p.y);
        prop_assert_eq!(info.byte_index, index as i64);
        prop_assert_eq!(info.nibble, Nibble::High);

        // second digit of the same byte
        let low = m.byte_from_pixel(p.x + m.char_width, p.y);
        prop_assert_eq!(low.byte_index, index as i64);
        prop_assert_eq!(low.nibble, Nibble::Low);
    }

    #[test]
    fn large_offsets_map_back_from_file_start(
        (char_width, char_height) in cell(),
        wide in any::<bool>(),
        index in 0u64..4_000_000_000,
    ) {
        let bpl = if wide { 16 } else { 8 };
        let m = mapper(char_width, char_height, bpl, 0);
        let p = m.pixel_point(grid_point(index, bpl));
        prop_assert_eq!(m.byte_from_pixel(p.x, p.y).byte_index, index as i64);
    }

    #[test]
    fn dropdown_scroll_stays_in_range(
        len in 0usize..30,
        deltas in prop::collection::vec(-5i32..5, 0..20),
    ) {
        let mut list = DropdownList::new((0..len).map(|i| format!("item {i}")), None);
        for delta in deltas {
            list.scroll_by(delta);
            prop_assert!(list.scroll_offset() <= list.max_scroll());
        }
        prop_assert_eq!(list.max_scroll(), len.saturating_sub(VISIBLE_ROWS));
    }
}

#[test]
fn test_grid_point() {
    let cell = grid_point(17, 16);
    assert_eq!((cell.col, cell.row), (1, 1));
    let cell = grid_point(17, 8);
    assert_eq!((cell.col, cell.row), (1, 2));
}

#[test]
fn test_sixteen_megabyte_offset_with_odd_cell_height() {
    let m = mapper(9.0, 17.0, 16, 0);
    for index in [16_000_000u64, 16_000_016, 16_777_217, 250_000_000] {
        let p = m.pixel_point(grid_point(index, 16));
        assert_eq!(m.byte_from_pixel(p.x, p.y).byte_index, index as i64);
    }
}

#[test]
fn test_points_left_of_grid_are_not_clamped() {
    let m = mapper(8.0, 16.0, 16, 32);
    let info = m.byte_from_pixel(80.0, 52.0);
    assert_eq!(info.byte_index, 31);
    assert_eq!(info.in_range(1000), Some(31));
    let above = m.byte_from_pixel(90.0, 20.0);
    assert_eq!(above.byte_index, 32 - 2 * 16);
    assert_eq!(m.byte_from_pixel(0.0, 0.0).in_range(1000), None);
}

#[test]
fn test_hit_test_limits() {
    let m = mapper(8.0, 16.0, 16, 0);
    assert_eq!(m.hit_test(122.0, 71.0, 21, 64), Some((17, Nibble::Low)));
    // past the last byte
    assert_eq!(m.hit_test(122.0, 71.0, 21, 10), None);
    // ASCII column
    assert_eq!(m.hit_test(90.0 + 48.0 * 8.0 + 2.0, 60.0, 21, 64), None);
}

#[test]
fn test_button_fill_precedence() {
    let theme = Theme::dark();
    let rect = Rect::new(0, 0, 75, 25);
    let all = WidgetState::new(rect).hovered(true).pressed(true).enabled(false);
    assert_eq!(button_fill(&all, &theme), theme.button_disabled);
    let pressed = WidgetState::new(rect).hovered(true).pressed(true);
    assert_eq!(button_fill(&pressed, &theme), theme.button_pressed);
    let hovered = WidgetState::new(rect).hovered(true);
    assert_eq!(button_fill(&hovered, &theme), theme.button_hover);
    assert_eq!(button_fill(&WidgetState::new(rect), &theme), theme.button_normal);
}

#[test]
fn test_oversized_resize_keeps_buffer() {
    let mut canvas = Canvas::new(RecordingSurface::new());
    assert!(canvas.initialize(640, 480));
    let allocations = canvas.surface().allocations();
    assert!(!canvas.resize(9000, 9000));
    assert!(!canvas.resize(640, 0));
    assert_eq!(canvas.size(), (640, 480));
    assert_eq!(canvas.surface().allocations(), allocations);

    assert!(canvas.resize(800, 600));
    assert_eq!(canvas.surface().allocations(), allocations + 1);
}
