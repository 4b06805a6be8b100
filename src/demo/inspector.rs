use crate::error::Result;
use crate::term::{Consumer, Coord, Device, Flow, InputEvent, Key, Surface, TerminalSize};

const TITLE: &str = "ansiterm keys | p: cursor report  s: device status  q: quit";
const FIRST_LINE: u16 = 3;

/// Prints every decoded input event on its own line.
#[derive(Debug)]
pub struct KeyInspector {
    handle_interrupt: bool,
    line: u16,
}

impl KeyInspector {
    pub fn new(handle_interrupt: bool) -> Self {
        Self {
            handle_interrupt,
            line: FIRST_LINE,
        }
    }

    fn draw_frame<D: Device>(&mut self, term: &mut Surface<D>) -> Result<()> {
        let size = term.size()?;
        term.clear()?;
        term.set_cursor_visible(false)?;
        term.move_to(Coord::ORIGIN)?;
        term.set_color256(208, false)?;
        term.bold()?;
        term.write(TITLE)?;
        term.reset()?;
        self.draw_footer(term, size)?;
        self.line = FIRST_LINE;
        Ok(())
    }

    fn draw_footer<D: Device>(&self, term: &mut Surface<D>, size: TerminalSize) -> Result<()> {
        term.move_to(Coord::new(1, -1))?;
        term.erase_line()?;
        term.set_color256(244, false)?;
        term.write(&format!("{} x {}", size.columns, size.rows))?;
        term.reset()?;
        Ok(())
    }

    fn log<D: Device>(&mut self, term: &mut Surface<D>, text: &str) -> Result<()> {
        let size = term.size()?;
        if self.line >= size.rows.saturating_sub(1) {
            self.draw_frame(term)?;
        }
        term.move_to(Coord::new(1, i32::from(self.line)))?;
        term.erase_line()?;
        term.write(text)?;
        self.line += 1;
        Ok(())
    }
}

/// Human-readable description of an event.
pub fn describe(event: &InputEvent) -> String {
    match event {
        InputEvent::Key(key) => describe_key(*key),
        InputEvent::Escape => "escape".to_string(),
        InputEvent::Arrow(direction) => format!("arrow {}", format!("{direction:?}").to_lowercase()),
        InputEvent::CursorPosition { row, col } => {
            format!("cursor position: row {row}, column {col}")
        }
        InputEvent::DeviceStatus(payload) => format!("device status: \"{payload}\""),
        InputEvent::Interrupt => "interrupt".to_string(),
    }
}

fn describe_key(key: Key) -> String {
    match (key.name(), key.as_char()) {
        (Some(name), _) => format!("key {name} ({:#04x})", key.byte()),
        (None, Some(c)) => format!("key '{c}'"),
        (None, None) => format!("key {:#04x}", key.byte()),
    }
}

impl<D: Device> Consumer<D> for KeyInspector {
    fn start(&mut self, term: &mut Surface<D>) -> Result<Flow> {
        self.draw_frame(term)?;
        Ok(Flow::Continue)
    }

    fn keypress(&mut self, term: &mut Surface<D>, event: &InputEvent) -> Result<Flow> {
        match event {
            InputEvent::Key(Key(b'q')) => {
                term.clear()?;
                term.move_to(Coord::ORIGIN)?;
                return Ok(Flow::Quit);
            }
            InputEvent::Key(Key(b'p')) => {
                self.log(term, "requesting cursor position")?;
                term.request_cursor_position()?;
            }
            InputEvent::Key(Key(b's')) => {
                self.log(term, "requesting device status")?;
                term.request_device_status()?;
            }
            event => self.log(term, &describe(event))?,
        }
        Ok(Flow::Continue)
    }

    fn resize(&mut self, term: &mut Surface<D>, size: TerminalSize) -> Result<Flow> {
        self.draw_frame(term)?;
        self.log(term, &format!("resized to {} x {}", size.columns, size.rows))?;
        Ok(Flow::Continue)
    }

    fn handles_interrupt(&self) -> bool {
        self.handle_interrupt
    }
}
