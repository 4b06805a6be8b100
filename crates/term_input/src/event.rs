use std::fmt;

/// The interrupt control byte (Ctrl+C).
pub const INTERRUPT: u8 = 0x03;

/// A decoded terminal input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A printable byte or a control byte, exactly as received.
    Key(Key),
    /// Bare ESC (after timeout — no follow-up byte arrived).
    Escape,
    /// Arrow key, from `CSI A`..`CSI D`.
    Arrow(Direction),
    /// Cursor position report: `CSI row ; col R`.
    CursorPosition { row: u16, col: u16 },
    /// Device status report: `CSI payload n`. Payload is the raw parameter text.
    DeviceStatus(String),
    /// The interrupt control byte.
    Interrupt,
}

impl InputEvent {
    /// Whether the session must terminate when nothing consumes this event.
    pub fn terminates_if_unhandled(&self) -> bool {
        matches!(self, InputEvent::Interrupt)
    }
}

/// A single-byte key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(pub u8);

impl Key {
    pub fn byte(self) -> u8 {
        self.0
    }

    /// Symbolic name for control bytes; `None` for everything else.
    pub fn name(self) -> Option<&'static str> {
        control_name(self.0)
    }

    pub fn is_control(self) -> bool {
        self.name().is_some()
    }

    /// The key as a character when it is printable ASCII.
    pub fn as_char(self) -> Option<char> {
        match self.0 {
            0x20..=0x7e => Some(self.0 as char),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.name(), self.as_char()) {
            (Some(name), _) => f.write_str(name),
            (None, Some(c)) => write!(f, "{c}"),
            (None, None) => write!(f, "{:#04x}", self.0),
        }
    }
}

/// Arrow key direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Right,
    Left,
}

fn control_name(byte: u8) -> Option<&'static str> {
    const C0: [&str; 32] = [
        "NUL", "^A", "^B", "^C", "^D", "^E", "^F", "BEL", //
        "BS", "TAB", "LF", "^K", "^L", "CR", "^N", "^O", //
        "^P", "^Q", "^R", "^S", "^T", "NAK", "^V", "^W", //
        "^X", "^Y", "^Z", "ESC", "^\\", "^]", "^^", "^_",
    ];
    match byte {
        0x00..=0x1f => Some(C0[byte as usize]),
        0x7f => Some("DEL"),
        _ => None,
    }
}
