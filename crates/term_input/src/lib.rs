mod error;
mod event;
mod parser;

pub use error::ProtocolError;
pub use event::{Direction, InputEvent, Key, INTERRUPT};
pub use parser::{Decoder, Events, ParseState, DEFAULT_ESCAPE_TIMEOUT};
