use core_render::{Renderer, prompt_width};
use core_text::LineBuffer;
use pretty_assertions::assert_eq;

fn output(r: Renderer<Vec<u8>>) -> String {
    String::from_utf8(r.into_inner()).unwrap()
}

#[test]
fn redraw_paints_prompt_and_parks_cursor() {
    let mut buf = LineBuffer::new();
    buf.insert("1 + 2");
    let mut r = Renderer::new(Vec::new());
    r.redraw("> ", &buf.snapshot()).unwrap();
    assert_eq!(output(r), "\x1b[1G\x1b[K> 1 + 2\x1b[8G");
}

#[test]
fn redraw_with_cursor_inside_line() {
    let mut buf = LineBuffer::new();
    buf.insert("abc");
    buf.move_left();
    buf.move_left();
    let mut r = Renderer::new(Vec::new());
    r.redraw("> ", &buf.snapshot()).unwrap();
    assert_eq!(output(r), "\x1b[1G\x1b[K> abc\x1b[4G");
}

#[test]
fn wide_clusters_shift_cursor_column() {
    let mut buf = LineBuffer::new();
    buf.insert("漢字");
    let mut r = Renderer::new(Vec::new());
    r.redraw("λ ", &buf.snapshot()).unwrap();
    assert_eq!(prompt_width("λ "), 2);
    assert_eq!(output(r), "\x1b[1G\x1b[Kλ 漢字\x1b[7G");
}

#[test]
fn overlong_line_parks_cursor_at_last_addressable_column() {
    let mut buf = LineBuffer::new();
    buf.insert(&"漢".repeat(40_000));
    let mut r = Renderer::new(Vec::new());
    r.redraw("> ", &buf.snapshot()).unwrap();
    assert!(output(r).ends_with("\x1b[65535G"));
}

#[test]
fn empty_line_redraw() {
    let mut r = Renderer::new(Vec::new());
    r.redraw("> ", &LineBuffer::new().snapshot()).unwrap();
    assert_eq!(output(r), "\x1b[1G\x1b[K> \x1b[3G");
}

#[test]
fn relative_cursor_moves() {
    let mut r = Renderer::new(Vec::new());
    r.move_cursor(-2).unwrap();
    r.move_cursor(1).unwrap();
    r.move_cursor(0).unwrap();
    assert_eq!(r.metrics().cursor_moves, 2);
    assert_eq!(output(r), "\x1b[2D\x1b[1C");
}

#[test]
fn print_block_expands_newlines() {
    let mut r = Renderer::new(Vec::new());
    r.print_block("a\nb").unwrap();
    r.print_block("c\r\nd").unwrap();
    assert_eq!(output(r), "a\r\nb\r\nc\r\nd\r\n");
}

#[test]
fn finish_breaks_line_only_mid_edit() {
    let mut r = Renderer::new(Vec::new());
    r.finish(false).unwrap();
    assert_eq!(r.get_ref().len(), 0);
    r.finish(true).unwrap();
    assert_eq!(output(r), "\r\n");
}
