use crate::error::ProtocolError;
use crate::event::{Direction, InputEvent, Key, INTERRUPT};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a lone ESC waits for a follow-up byte before it counts as a key.
pub const DEFAULT_ESCAPE_TIMEOUT: Duration = Duration::from_millis(50);

const ESC: u8 = 0x1b;

/// Decoder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseState {
    Normal,
    SawEscape,
    InControlSequence,
}

/// What a table row matches.
#[derive(Debug, Clone, Copy)]
enum On {
    Byte(u8),
    Range(u8, u8),
    /// Fallback when no explicit row of the state matches.
    Default,
}

impl On {
    fn matches(self, byte: u8) -> bool {
        match self {
            On::Byte(b) => b == byte,
            On::Range(lo, hi) => (lo..=hi).contains(&byte),
            On::Default => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Act {
    Enter(ParseState),
    ArmEscapeTimer,
    EmitKey,
    EmitInterrupt,
    EmitArrow(Direction),
    EmitDeviceStatus,
    EmitCursorPosition,
    Store,
}

struct Transition {
    on: On,
    acts: &'static [Act],
}

const fn row(on: On, acts: &'static [Act]) -> Transition {
    Transition { on, acts }
}

const NORMAL: &[Transition] = &[
    row(On::Byte(ESC), &[Act::Enter(ParseState::SawEscape), Act::ArmEscapeTimer]),
    row(On::Byte(INTERRUPT), &[Act::EmitInterrupt]),
    row(On::Default, &[Act::EmitKey]),
];

const SAW_ESCAPE: &[Transition] = &[
    row(On::Byte(b'['), &[Act::Enter(ParseState::InControlSequence)]),
    row(On::Default, &[Act::EmitKey, Act::Enter(ParseState::Normal)]),
];

const IN_CONTROL_SEQUENCE: &[Transition] = &[
    row(On::Range(b'0', b'9'), &[Act::Store]),
    row(On::Byte(b';'), &[Act::Store]),
    row(On::Byte(b'n'), &[Act::EmitDeviceStatus, Act::Enter(ParseState::Normal)]),
    row(On::Byte(b'R'), &[Act::EmitCursorPosition, Act::Enter(ParseState::Normal)]),
    row(On::Byte(b'A'), &[Act::EmitArrow(Direction::Up), Act::Enter(ParseState::Normal)]),
    row(On::Byte(b'B'), &[Act::EmitArrow(Direction::Down), Act::Enter(ParseState::Normal)]),
    row(On::Byte(b'C'), &[Act::EmitArrow(Direction::Right), Act::Enter(ParseState::Normal)]),
    row(On::Byte(b'D'), &[Act::EmitArrow(Direction::Left), Act::Enter(ParseState::Normal)]),
];

fn table(state: ParseState) -> &'static [Transition] {
    match state {
        ParseState::Normal => NORMAL,
        ParseState::SawEscape => SAW_ESCAPE,
        ParseState::InControlSequence => IN_CONTROL_SEQUENCE,
    }
}

fn lookup(state: ParseState, byte: u8) -> Result<&'static Transition, ProtocolError> {
    let rows = table(state);
    rows.iter()
        .find(|t| t.on.matches(byte))
        .or_else(|| rows.iter().find(|t| matches!(t.on, On::Default)))
        .ok_or(ProtocolError { byte, state })
}

/// Terminal input decoder — table-driven state machine, no I/O.
///
/// Append raw bytes with `feed()` and pull events with `next_event()` or
/// `events()`. Decoding advances one byte at a time, so the caller decides
/// when to yield between events. A lone ESC is held until either another
/// byte arrives or `expire_escape()` is called at or after
/// `escape_deadline()`.
#[derive(Debug)]
pub struct Decoder {
    state: ParseState,
    buf: VecDeque<u8>,
    pending: String,
    escape_timeout: Duration,
    escape_deadline: Option<Instant>,
    failed: Option<ProtocolError>,
}

impl Decoder {
    pub fn new(escape_timeout: Duration) -> Self {
        Self {
            state: ParseState::Normal,
            buf: VecDeque::with_capacity(64),
            pending: String::new(),
            escape_timeout,
            escape_deadline: None,
            failed: None,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn escape_timeout(&self) -> Duration {
        self.escape_timeout
    }

    /// Append raw bytes. Nothing is decoded until events are pulled.
    pub fn feed(&mut self, data: &[u8]) {
        self.buf.extend(data);
    }

    /// Whether undecoded bytes remain in the buffer.
    pub fn has_buffered(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Deadline of the outstanding escape timer, if one is armed.
    pub fn escape_deadline(&self) -> Option<Instant> {
        self.escape_deadline
    }

    pub fn is_failed(&self) -> bool {
        self.failed.is_some()
    }

    /// Decode buffered bytes until one event completes.
    ///
    /// Returns `None` once the buffer is exhausted. After a protocol error
    /// every call returns that error again.
    pub fn next_event(&mut self) -> Option<Result<InputEvent, ProtocolError>> {
        if let Some(err) = self.failed {
            return Some(Err(err));
        }
        while let Some(byte) = self.buf.pop_front() {
            match self.step(byte) {
                Ok(Some(event)) => return Some(Ok(event)),
                Ok(None) => {}
                Err(err) => {
                    tracing::error!(%err, "input decoder failed");
                    self.failed = Some(err);
                    return Some(Err(err));
                }
            }
        }
        None
    }

    /// Lazy iterator over decoded events. Ends when the buffer runs dry or
    /// right after yielding a protocol error.
    pub fn events(&mut self) -> Events<'_> {
        Events {
            decoder: self,
            done: false,
        }
    }

    /// Feed `data` and collect every event it completes.
    pub fn decode(&mut self, data: &[u8]) -> Result<Vec<InputEvent>, ProtocolError> {
        self.feed(data);
        self.events().collect()
    }

    /// Fire the escape timer if it is due at `now`.
    ///
    /// Resolves a pending lone ESC into `InputEvent::Escape`. A no-op when no
    /// timer is armed, when it was canceled by later input, or when bytes are
    /// still waiting in the buffer (they arrived before the timer could fire).
    pub fn expire_escape(&mut self, now: Instant) -> Option<InputEvent> {
        if self.failed.is_some() || self.has_buffered() {
            return None;
        }
        let deadline = self.escape_deadline?;
        if now < deadline {
            return None;
        }
        self.escape_deadline = None;
        if self.state != ParseState::SawEscape {
            return None;
        }
        tracing::trace!("escape timeout fired");
        self.state = ParseState::Normal;
        Some(InputEvent::Escape)
    }

    fn step(&mut self, byte: u8) -> Result<Option<InputEvent>, ProtocolError> {
        if self.escape_deadline.take().is_some() {
            tracing::trace!("escape timer canceled by new input");
        }

        let transition = lookup(self.state, byte)?;
        tracing::trace!(byte, state = ?self.state, "decode byte");

        let mut out = None;
        for act in transition.acts {
            match *act {
                Act::Enter(next) => {
                    if next != self.state {
                        tracing::trace!(from = ?self.state, to = ?next, "state change");
                    }
                    self.state = next;
                }
                Act::ArmEscapeTimer => {
                    self.escape_deadline = Some(Instant::now() + self.escape_timeout);
                }
                Act::EmitKey => out = Some(InputEvent::Key(Key(byte))),
                Act::EmitInterrupt => out = Some(InputEvent::Interrupt),
                Act::EmitArrow(direction) => {
                    self.pending.clear();
                    out = Some(InputEvent::Arrow(direction));
                }
                Act::EmitDeviceStatus => {
                    out = Some(InputEvent::DeviceStatus(std::mem::take(&mut self.pending)));
                }
                Act::EmitCursorPosition => {
                    let (row, col) = parse_position(&self.pending);
                    self.pending.clear();
                    out = Some(InputEvent::CursorPosition { row, col });
                }
                Act::Store => self.pending.push(byte as char),
            }
        }
        Ok(out)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(DEFAULT_ESCAPE_TIMEOUT)
    }
}

/// Iterator returned by [`Decoder::events`].
#[derive(Debug)]
pub struct Events<'a> {
    decoder: &'a mut Decoder,
    done: bool,
}

impl Iterator for Events<'_> {
    type Item = Result<InputEvent, ProtocolError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.decoder.next_event();
        if matches!(item, None | Some(Err(_))) {
            self.done = true;
        }
        item
    }
}

/// Parse a `row;col` payload. Missing or empty fields default to 1.
fn parse_position(payload: &str) -> (u16, u16) {
    let mut fields = payload.split(';').map(|field| {
        if field.is_empty() {
            1
        } else {
            field.bytes().fold(0u16, |acc, b| {
                acc.saturating_mul(10).saturating_add(u16::from(b - b'0'))
            })
        }
    });
    let row = fields.next().unwrap_or(1);
    let col = fields.next().unwrap_or(1);
    (row, col)
}
