//! Drives the demo consumers through a session over an in-memory device.

use ansiterm::demo::{Drawing, KeyInspector};
use ansiterm::term::{Consumer, Flow, GlyphSet, MemoryDevice, Session, Surface, TerminalSize};
use ansiterm::TermError;
use std::time::Duration;

fn session(glyphs: GlyphSet) -> Session<MemoryDevice> {
    Session::new(
        Surface::new(MemoryDevice::new(80, 24), glyphs),
        Duration::from_millis(50),
    )
}

fn drain<C: Consumer<MemoryDevice>>(
    session: &mut Session<MemoryDevice>,
    consumer: &mut C,
) -> ansiterm::Result<Vec<Flow>> {
    let mut flows = Vec::new();
    while let Some(flow) = session.pump(consumer)? {
        flows.push(flow);
    }
    Ok(flows)
}

fn output(session: &mut Session<MemoryDevice>) -> String {
    session.surface_mut().device_mut().take_output()
}

#[test]
fn inspector_logs_events_in_order() {
    let mut s = session(GlyphSet::Ascii);
    let mut inspector = KeyInspector::new(true);
    inspector.start(s.surface_mut()).unwrap();
    output(&mut s);

    s.feed(b"j\x1b[B\x1b[12;34R");
    drain(&mut s, &mut inspector).unwrap();
    let out = output(&mut s);

    let j = out.find("key 'j'").unwrap();
    let down = out.find("arrow down").unwrap();
    let report = out.find("cursor position: row 12, column 34").unwrap();
    assert!(j < down && down < report);
    assert!(out.starts_with("\x1b[3;1f\x1b[2Kkey 'j'"));
}

#[test]
fn inspector_requests_reports() {
    let mut s = session(GlyphSet::Ascii);
    let mut inspector = KeyInspector::new(true);
    s.feed(b"ps");
    drain(&mut s, &mut inspector).unwrap();
    let out = output(&mut s);
    assert!(out.contains("\x1b[6n"));
    assert!(out.contains("\x1b[5n"));
}

#[test]
fn inspector_quits_on_q() {
    let mut s = session(GlyphSet::Ascii);
    let mut inspector = KeyInspector::new(true);
    s.feed(b"aq");
    let flows = drain(&mut s, &mut inspector).unwrap();
    assert_eq!(flows, vec![Flow::Continue, Flow::Quit]);
    assert!(output(&mut s).ends_with("\x1b[2J\x1b[1;1f"));
}

#[test]
fn inspector_reports_handled_interrupt() {
    let mut s = session(GlyphSet::Ascii);
    let mut inspector = KeyInspector::new(true);
    s.feed(&[0x03]);
    drain(&mut s, &mut inspector).unwrap();
    assert!(output(&mut s).contains("interrupt"));
}

#[test]
fn inspector_without_interrupt_handler_terminates() {
    let mut s = session(GlyphSet::Ascii);
    let mut inspector = KeyInspector::new(false);
    s.feed(&[0x03]);
    let err = drain(&mut s, &mut inspector).unwrap_err();
    assert!(matches!(err, TermError::UnhandledInterrupt));
    assert!(output(&mut s).contains("terminated (^C)"));
}

#[test]
fn inspector_wraps_when_screen_fills() {
    let mut s = session(GlyphSet::Ascii);
    s.surface_mut().device_mut().size = TerminalSize { rows: 6, columns: 40 };
    let mut inspector = KeyInspector::new(true);
    inspector.start(s.surface_mut()).unwrap();
    output(&mut s);
    s.feed(b"abcd");
    drain(&mut s, &mut inspector).unwrap();
    let out = output(&mut s);
    // Rows 3 and 4 hold "a" and "b"; "c" arrives at row 5 and redraws.
    assert!(out.contains("\x1b[2J"));
    assert!(out.contains("\x1b[3;1f\x1b[2Kkey 'c'"));
}

#[test]
fn drawing_moves_marker_with_arrows() {
    let mut s = session(GlyphSet::Vt100);
    let mut drawing = Drawing::new();
    drawing.start(s.surface_mut()).unwrap();
    assert_eq!(drawing.marker(), Some((40, 12)));
    let out = output(&mut s);
    assert_eq!(out.matches("\x1b(0").count(), 2);
    assert_eq!(out.matches("\x1b(B").count(), 2);

    s.feed(b"\x1b[A\x1b[C\x1b[C");
    drain(&mut s, &mut drawing).unwrap();
    assert_eq!(drawing.marker(), Some((42, 11)));
}

#[test]
fn drawing_keeps_marker_on_screen_after_resize() {
    let mut s = session(GlyphSet::Unicode);
    let mut drawing = Drawing::new();
    drawing.start(s.surface_mut()).unwrap();

    s.surface_mut().device_mut().size = TerminalSize { rows: 12, columns: 30 };
    s.notify_resize(&mut drawing).unwrap();
    assert_eq!(drawing.marker(), Some((29, 9)));
    assert!(output(&mut s).contains('\u{250f}'));
}

#[test]
fn escape_key_reaches_inspector_after_timeout() {
    let mut s = session(GlyphSet::Ascii);
    let mut inspector = KeyInspector::new(true);
    s.feed(&[0x1b]);
    drain(&mut s, &mut inspector).unwrap();
    assert!(!output(&mut s).contains("escape"));

    let deadline = s.decoder().escape_deadline().unwrap();
    s.expire_escape(deadline, &mut inspector).unwrap();
    assert!(output(&mut s).contains("escape"));
}
