use crate::error::{Result, TermError};
use std::io::{self, Write};

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalSize {
    pub rows: u16,
    pub columns: u16,
}

/// An output sink that can report the terminal's current size.
///
/// The size is queried on every call; implementations must not cache it.
pub trait Device: Write {
    fn size(&self) -> io::Result<TerminalSize>;
}

/// The process's controlling terminal, written through stdout.
#[derive(Debug)]
pub struct StdoutDevice {
    out: io::Stdout,
}

impl StdoutDevice {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for StdoutDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for StdoutDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl Device for StdoutDevice {
    fn size(&self) -> io::Result<TerminalSize> {
        let (columns, rows) = crossterm::terminal::size()?;
        Ok(TerminalSize { rows, columns })
    }
}

/// In-memory device: collects output and reports a settable size.
#[derive(Debug, Clone)]
pub struct MemoryDevice {
    pub output: Vec<u8>,
    pub size: TerminalSize,
}

impl MemoryDevice {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            output: Vec::new(),
            size: TerminalSize { rows, columns },
        }
    }

    /// Output so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// Return and forget the output so far.
    pub fn take_output(&mut self) -> String {
        let text = self.contents();
        self.output.clear();
        text
    }
}

impl Write for MemoryDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Device for MemoryDevice {
    fn size(&self) -> io::Result<TerminalSize> {
        Ok(self.size)
    }
}

/// Refuse anything that is not an interactive, capable terminal.
pub fn check_device(stdin_tty: bool, stdout_tty: bool, term: Option<&str>) -> Result<()> {
    if !stdin_tty || !stdout_tty {
        return Err(TermError::UnsupportedDevice("not a tty".to_string()));
    }
    match term {
        None | Some("") => Err(TermError::UnsupportedDevice("TERM is not set".to_string())),
        Some("dumb") => Err(TermError::UnsupportedDevice(
            "not a useful terminal (TERM=dumb)".to_string(),
        )),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_tty() {
        assert!(matches!(
            check_device(false, true, Some("xterm")),
            Err(TermError::UnsupportedDevice(_))
        ));
        assert!(matches!(
            check_device(true, false, Some("xterm")),
            Err(TermError::UnsupportedDevice(_))
        ));
    }

    #[test]
    fn rejects_dumb_or_missing_term() {
        assert!(check_device(true, true, Some("dumb")).is_err());
        assert!(check_device(true, true, None).is_err());
        assert!(check_device(true, true, Some("")).is_err());
    }

    #[test]
    fn accepts_real_terminal() {
        assert!(check_device(true, true, Some("xterm-256color")).is_ok());
    }

    #[test]
    fn memory_device_reports_live_size() {
        let mut device = MemoryDevice::new(80, 24);
        assert_eq!(device.size().unwrap(), TerminalSize { rows: 24, columns: 80 });
        device.size = TerminalSize { rows: 50, columns: 132 };
        assert_eq!(device.size().unwrap().columns, 132);
    }
}
