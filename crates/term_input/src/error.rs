use crate::parser::ParseState;
use thiserror::Error;

/// A byte arrived in a state with no matching transition and no default.
///
/// Fatal for the decoder that raised it: the table cannot safely resume, so
/// the decoder keeps returning this error for every later call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no transition for byte {byte:#04x} in state {state:?}")]
pub struct ProtocolError {
    pub byte: u8,
    pub state: ParseState,
}
