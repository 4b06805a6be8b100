//! ANSI/VT100 control sequences emitted by the surface.

pub const CSI: &str = "\x1b[";

pub const CLEAR_SCREEN: &str = "\x1b[2J";
pub const RESET_ATTRIBUTES: &str = "\x1b[m";
pub const BOLD: &str = "\x1b[1m";
pub const REVERSE_VIDEO: &str = "\x1b[7m";
pub const SHOW_CURSOR: &str = "\x1b[?25h";
pub const HIDE_CURSOR: &str = "\x1b[?25l";
pub const ERASE_LINE: &str = "\x1b[2K";
pub const ERASE_TO_START_OF_LINE: &str = "\x1b[1K";
pub const ERASE_TO_END_OF_LINE: &str = "\x1b[K";
pub const INSERT_MODE: &str = "\x1b[4h";
pub const REPLACE_MODE: &str = "\x1b[4l";
pub const CURSOR_DOWN: &str = "\x1b[B";
pub const REQUEST_CURSOR_POSITION: &str = "\x1b[6n";
pub const REQUEST_DEVICE_STATUS: &str = "\x1b[5n";

/// Select the DEC special graphics set for G0.
pub const LINE_DRAWING_ON: &str = "\x1b(0";
/// Back to US ASCII for G0.
pub const LINE_DRAWING_OFF: &str = "\x1b(B";

pub const DOUBLE_HEIGHT_TOP: &str = "\x1b#3";
pub const DOUBLE_HEIGHT_BOTTOM: &str = "\x1b#4";

/// Absolute cursor position, 1-based.
pub fn move_to(col: u16, row: u16) -> String {
    format!("{CSI}{row};{col}f")
}

/// Cursor to `col` on the current row.
pub fn column(col: u16) -> String {
    format!("{CSI}{col}G")
}

pub fn color256(index: u8, background: bool) -> String {
    let plane = if background { 48 } else { 38 };
    format!("{CSI}{plane};5;{index}m")
}

/// Cursor visible, replace mode, default attributes; leaves line drawing
/// when `line_drawing` is set.
pub fn soft_reset(line_drawing: bool) -> String {
    let mut out = String::with_capacity(16);
    out.push_str(SHOW_CURSOR);
    out.push_str(REPLACE_MODE);
    out.push_str(RESET_ATTRIBUTES);
    if line_drawing {
        out.push_str(LINE_DRAWING_OFF);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_to_is_row_then_column() {
        assert_eq!(move_to(78, 5), "\x1b[5;78f");
    }

    #[test]
    fn color_planes() {
        assert_eq!(color256(208, false), "\x1b[38;5;208m");
        assert_eq!(color256(17, true), "\x1b[48;5;17m");
    }

    #[test]
    fn soft_reset_sequence() {
        assert_eq!(soft_reset(false), "\x1b[?25h\x1b[4l\x1b[m");
        assert_eq!(soft_reset(true), "\x1b[?25h\x1b[4l\x1b[m\x1b(B");
    }
}
