//! Errors raised by the terminal control layer.

use std::io;
use term_input::ProtocolError;
use thiserror::Error;

/// Fatal conditions of a terminal session. None of them is retried.
#[derive(Debug, Error)]
pub enum TermError {
    /// Input or output is not an interactive terminal, or `TERM` is unusable.
    #[error("unsupported terminal: {0}")]
    UnsupportedDevice(String),

    /// The input decoder hit a byte it has no transition for.
    #[error("terminal protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The interrupt key arrived and nothing was registered to handle it.
    #[error("terminated by unhandled interrupt")]
    UnhandledInterrupt,

    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, TermError>;
