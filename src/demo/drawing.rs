use crate::error::Result;
use crate::term::{Consumer, Coord, Device, Direction, Flow, InputEvent, Key, Surface, TerminalSize};

const TITLE: &str = "ansiterm";
const FOOTER_LEFT: &str = "arrows: move";
const FOOTER_RIGHT: &str = "q: quit";
const ACCENT: u8 = 208;
const BLUE_RAMP: [u8; 24] = [
    17, 17, 17, 18, 18, 19, 19, 20, 20, 21, 27, 32, 33, 38, 39, 44, 45, 45, 81, 81, 51, 51, 123,
    123,
];
/// First row below the title rule and the color ramp.
const PLAY_TOP: i32 = 6;

/// Framed screen with a marker that follows the arrow keys.
#[derive(Debug, Default)]
pub struct Drawing {
    /// Marker position, `None` until the first draw centers it.
    marker: Option<(i32, i32)>,
}

impl Drawing {
    pub fn new() -> Self {
        Self::default()
    }

    fn redraw<D: Device>(&mut self, term: &mut Surface<D>, size: TerminalSize) -> Result<()> {
        term.clear()?;
        term.set_cursor_visible(false)?;

        term.set_color256(ACCENT, false)?;
        term.draw_box(None, None, None, None)?;
        let title_x = (i32::from(size.columns) - TITLE.len() as i32) / 2 + 1;
        term.move_to(Coord::new(title_x, 2))?;
        term.bold()?;
        term.write(TITLE)?;
        term.reset()?;
        term.set_color256(ACCENT, false)?;
        term.draw_horizontal_line(3, Some(2), Some(-2))?;
        term.reset()?;

        term.move_to(Coord::new(3, 4))?;
        for color in BLUE_RAMP {
            term.set_color256(color, true)?;
            term.write(" ")?;
        }
        term.reset()?;

        term.move_to(Coord::new(3, -2))?;
        term.write(FOOTER_LEFT)?;
        term.move_to(Coord::new(-2 - FOOTER_RIGHT.len() as i32, -2))?;
        term.write(FOOTER_RIGHT)?;

        let (x, y) = self
            .marker
            .unwrap_or((i32::from(size.columns) / 2, i32::from(size.rows) / 2));
        self.marker = Some(clamp_marker(x, y, size));
        self.draw_marker(term, true)
    }

    fn draw_marker<D: Device>(&self, term: &mut Surface<D>, visible: bool) -> Result<()> {
        let Some((x, y)) = self.marker else {
            return Ok(());
        };
        term.move_to(Coord::new(x, y))?;
        if visible {
            term.set_color256(ACCENT, false)?;
            term.reverse_video()?;
            term.write(" ")?;
            term.reset()?;
        } else {
            term.write(" ")?;
        }
        Ok(())
    }

    pub fn marker(&self) -> Option<(i32, i32)> {
        self.marker
    }
}

/// Keep the marker inside the frame, below the ramp and above the footer.
fn clamp_marker(x: i32, y: i32, size: TerminalSize) -> (i32, i32) {
    let x = x.min(i32::from(size.columns) - 1).max(2);
    let y = y.min(i32::from(size.rows) - 3).max(PLAY_TOP);
    (x, y)
}

impl<D: Device> Consumer<D> for Drawing {
    fn start(&mut self, term: &mut Surface<D>) -> Result<Flow> {
        let size = term.size()?;
        self.redraw(term, size)?;
        Ok(Flow::Continue)
    }

    fn keypress(&mut self, term: &mut Surface<D>, event: &InputEvent) -> Result<Flow> {
        if *event == InputEvent::Key(Key(b'q')) {
            term.clear()?;
            term.move_to(Coord::ORIGIN)?;
            return Ok(Flow::Quit);
        }
        Ok(Flow::Continue)
    }

    fn arrow(&mut self, term: &mut Surface<D>, direction: Direction) -> Result<Flow> {
        let Some((x, y)) = self.marker else {
            return Ok(Flow::Continue);
        };
        let (x, y) = match direction {
            Direction::Up => (x, y - 1),
            Direction::Down => (x, y + 1),
            Direction::Left => (x - 1, y),
            Direction::Right => (x + 1, y),
        };
        self.draw_marker(term, false)?;
        self.marker = Some(clamp_marker(x, y, term.size()?));
        self.draw_marker(term, true)?;
        Ok(Flow::Continue)
    }

    fn resize(&mut self, term: &mut Surface<D>, size: TerminalSize) -> Result<Flow> {
        self.redraw(term, size)?;
        Ok(Flow::Continue)
    }
}
