//! Terminal control surface: output encoding, device access, and the event
//! session that feeds decoded input to a consumer.

mod device;
pub mod encode;
mod glyphs;
mod guard;
mod session;
mod surface;

pub use device::{check_device, Device, MemoryDevice, StdoutDevice, TerminalSize};
pub use glyphs::{GlyphSet, Glyphs};
pub use guard::{setup_terminal, TerminalGuard};
pub use session::{spawn_reader, Consumer, Flow, InputChunk, Session};
pub use surface::{Coord, LineDrawing, Surface};
pub use term_input::{Direction, InputEvent, Key};
