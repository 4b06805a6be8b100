use super::device::{Device, TerminalSize};
use super::encode;
use super::glyphs::GlyphSet;
use std::io;
use std::ops::{Deref, DerefMut};

/// A 1-based screen coordinate.
///
/// Negative components count from the far edge: `x = -1` is the last column,
/// `y = -1` the last row. They are resolved against the size at the moment
/// of use and never stored resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const ORIGIN: Coord = Coord { x: 1, y: 1 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Absolute `(column, row)` on a terminal of `size`.
    pub fn resolve(self, size: TerminalSize) -> (u16, u16) {
        (
            resolve_axis(self.x, size.columns),
            resolve_axis(self.y, size.rows),
        )
    }
}

fn resolve_axis(value: i32, extent: u16) -> u16 {
    let absolute = if value < 0 {
        i64::from(extent) + i64::from(value) + 1
    } else {
        i64::from(value)
    };
    absolute.clamp(1, i64::from(u16::MAX)) as u16
}

/// ANSI/VT100 output surface over a terminal device.
///
/// Stateless encoder apart from the line-drawing nesting depth and the glyph
/// set picked at construction. Writes are not flushed until `flush()`.
#[derive(Debug)]
pub struct Surface<D: Device> {
    device: D,
    glyphs: GlyphSet,
    line_drawing_depth: usize,
}

impl<D: Device> Surface<D> {
    pub fn new(device: D, glyphs: GlyphSet) -> Self {
        Self {
            device,
            glyphs,
            line_drawing_depth: 0,
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn glyph_set(&self) -> GlyphSet {
        self.glyphs
    }

    /// Current size, queried from the device every time.
    pub fn size(&self) -> io::Result<TerminalSize> {
        self.device.size()
    }

    fn emit(&mut self, sequence: &str) -> io::Result<()> {
        self.device.write_all(sequence.as_bytes())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.device.flush()
    }

    pub fn clear(&mut self) -> io::Result<()> {
        self.emit(encode::CLEAR_SCREEN)
    }

    pub fn move_to(&mut self, coord: Coord) -> io::Result<()> {
        let (col, row) = coord.resolve(self.size()?);
        self.emit(&encode::move_to(col, row))
    }

    /// Raw text at the current cursor position.
    pub fn write(&mut self, text: &str) -> io::Result<()> {
        self.emit(text)
    }

    pub fn set_color256(&mut self, index: u8, background: bool) -> io::Result<()> {
        self.emit(&encode::color256(index, background))
    }

    pub fn reset(&mut self) -> io::Result<()> {
        self.emit(encode::RESET_ATTRIBUTES)
    }

    pub fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()> {
        self.emit(if visible {
            encode::SHOW_CURSOR
        } else {
            encode::HIDE_CURSOR
        })
    }

    pub fn bold(&mut self) -> io::Result<()> {
        self.emit(encode::BOLD)
    }

    pub fn reverse_video(&mut self) -> io::Result<()> {
        self.emit(encode::REVERSE_VIDEO)
    }

    pub fn erase_line(&mut self) -> io::Result<()> {
        self.emit(encode::ERASE_LINE)
    }

    pub fn erase_to_start_of_line(&mut self) -> io::Result<()> {
        self.emit(encode::ERASE_TO_START_OF_LINE)
    }

    pub fn erase_to_end_of_line(&mut self) -> io::Result<()> {
        self.emit(encode::ERASE_TO_END_OF_LINE)
    }

    pub fn set_insert_mode(&mut self, insert: bool) -> io::Result<()> {
        self.emit(if insert {
            encode::INSERT_MODE
        } else {
            encode::REPLACE_MODE
        })
    }

    /// Ask the terminal for a cursor position report (`InputEvent::CursorPosition`).
    pub fn request_cursor_position(&mut self) -> io::Result<()> {
        self.emit(encode::REQUEST_CURSOR_POSITION)
    }

    /// Ask the terminal for a device status report (`InputEvent::DeviceStatus`).
    pub fn request_device_status(&mut self) -> io::Result<()> {
        self.emit(encode::REQUEST_DEVICE_STATUS)
    }

    /// Write `text` as a double-height line at `coord` and the row below it.
    pub fn double_height(&mut self, coord: Coord, text: &str) -> io::Result<()> {
        let (col, row) = coord.resolve(self.size()?);
        self.emit(&encode::move_to(col, row))?;
        self.emit(encode::DOUBLE_HEIGHT_TOP)?;
        self.emit(text)?;
        self.emit(&encode::move_to(col, row.saturating_add(1)))?;
        self.emit(encode::DOUBLE_HEIGHT_BOTTOM)?;
        self.emit(text)
    }

    /// Nesting depth of line-drawing mode.
    pub fn line_drawing_depth(&self) -> usize {
        self.line_drawing_depth
    }

    /// Enter line-drawing mode. Only the outermost call emits anything.
    pub fn enable_line_drawing(&mut self) -> io::Result<()> {
        if self.line_drawing_depth == 0 && self.glyphs.needs_charset_switch() {
            self.emit(encode::LINE_DRAWING_ON)?;
        }
        self.line_drawing_depth += 1;
        Ok(())
    }

    /// Leave line-drawing mode. Unbalanced calls at depth zero are ignored.
    pub fn disable_line_drawing(&mut self) -> io::Result<()> {
        if self.line_drawing_depth == 0 {
            return Ok(());
        }
        self.line_drawing_depth -= 1;
        if self.line_drawing_depth == 0 && self.glyphs.needs_charset_switch() {
            self.emit(encode::LINE_DRAWING_OFF)?;
        }
        Ok(())
    }

    /// Line-drawing mode for the lifetime of the returned scope.
    pub fn line_drawing(&mut self) -> io::Result<LineDrawing<'_, D>> {
        self.enable_line_drawing()?;
        Ok(LineDrawing {
            surface: self,
            done: false,
        })
    }

    /// Horizontal line on `row` from `from` (default 1) to `to` (default last column).
    pub fn draw_horizontal_line(
        &mut self,
        row: i32,
        from: Option<i32>,
        to: Option<i32>,
    ) -> io::Result<()> {
        let size = self.size()?;
        let (from, row) = Coord::new(from.unwrap_or(1), row).resolve(size);
        let to = resolve_axis(to.unwrap_or(i32::from(size.columns)), size.columns);
        let run = span(from, to);

        self.emit(&encode::move_to(from, row))?;
        let mut scope = self.line_drawing()?;
        let line = scope.horizontal_run(run);
        scope.write(&line)?;
        scope.finish()
    }

    /// Vertical line in `col` from `from` (default 1) to `to` (default last row).
    pub fn draw_vertical_line(
        &mut self,
        col: i32,
        from: Option<i32>,
        to: Option<i32>,
    ) -> io::Result<()> {
        let size = self.size()?;
        let (col, from) = Coord::new(col, from.unwrap_or(1)).resolve(size);
        let to = resolve_axis(to.unwrap_or(i32::from(size.rows)), size.rows);

        self.emit(&encode::move_to(col, from))?;
        let mut scope = self.line_drawing()?;
        let step = format!(
            "{}{}{}",
            scope.glyphs.glyphs().vertical,
            encode::CURSOR_DOWN,
            encode::column(col)
        );
        for _ in 0..span(from, to) {
            scope.write(&step)?;
        }
        scope.finish()
    }

    /// Box with corners `(x1, y1)` and `(x2, y2)`; defaults cover the whole screen.
    pub fn draw_box(
        &mut self,
        x1: Option<i32>,
        y1: Option<i32>,
        x2: Option<i32>,
        y2: Option<i32>,
    ) -> io::Result<()> {
        let size = self.size()?;
        let (x1, y1) = Coord::new(x1.unwrap_or(1), y1.unwrap_or(1)).resolve(size);
        let (x2, y2) = Coord::new(
            x2.unwrap_or(i32::from(size.columns)),
            y2.unwrap_or(i32::from(size.rows)),
        )
        .resolve(size);

        let glyphs = *self.glyphs.glyphs();
        let inner = self.horizontal_run(span(x1, x2).saturating_sub(2));

        let mut scope = self.line_drawing()?;
        scope.emit(&encode::move_to(x1, y1))?;
        scope.write(&format!("{}{}{}", glyphs.top_left, inner, glyphs.top_right))?;
        scope.emit(&encode::move_to(x1, y2))?;
        scope.write(&format!("{}{}{}", glyphs.bottom_left, inner, glyphs.bottom_right))?;
        if y2 > y1.saturating_add(1) {
            let (top, bottom) = (i32::from(y1) + 1, i32::from(y2) - 1);
            scope.draw_vertical_line(i32::from(x1), Some(top), Some(bottom))?;
            scope.draw_vertical_line(i32::from(x2), Some(top), Some(bottom))?;
        }
        scope.finish()
    }

    /// Cursor visible, replace mode, default attributes, line drawing off.
    pub fn soft_reset(&mut self) -> io::Result<()> {
        let line_drawing =
            self.line_drawing_depth > 0 && self.glyphs.needs_charset_switch();
        self.line_drawing_depth = 0;
        self.emit(&encode::soft_reset(line_drawing))?;
        self.flush()
    }

    fn horizontal_run(&self, count: usize) -> String {
        std::iter::repeat(self.glyphs.glyphs().horizontal)
            .take(count)
            .collect()
    }
}

/// Cells from `from` to `to` inclusive; zero when reversed.
fn span(from: u16, to: u16) -> usize {
    if to < from {
        0
    } else {
        usize::from(to - from) + 1
    }
}

/// Scoped line-drawing mode returned by [`Surface::line_drawing`].
///
/// Leaves the mode on drop. Call `finish()` to see the error, if any.
#[derive(Debug)]
pub struct LineDrawing<'a, D: Device> {
    surface: &'a mut Surface<D>,
    done: bool,
}

impl<D: Device> LineDrawing<'_, D> {
    pub fn finish(mut self) -> io::Result<()> {
        self.done = true;
        self.surface.disable_line_drawing()
    }
}

impl<D: Device> Deref for LineDrawing<'_, D> {
    type Target = Surface<D>;

    fn deref(&self) -> &Surface<D> {
        self.surface
    }
}

impl<D: Device> DerefMut for LineDrawing<'_, D> {
    fn deref_mut(&mut self) -> &mut Surface<D> {
        self.surface
    }
}

impl<D: Device> Drop for LineDrawing<'_, D> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Err(err) = self.surface.disable_line_drawing() {
            tracing::warn!(%err, "failed to leave line-drawing mode");
        }
    }
}
