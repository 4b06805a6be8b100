use super::device::{check_device, StdoutDevice};
use super::encode;
use super::glyphs::GlyphSet;
use super::surface::Surface;
use crate::config::Config;
use crate::error::Result;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::tty::IsTty;
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// Restores the terminal exactly once: on drop, on panic, or on an explicit
/// `restore()` before the process exits.
pub struct TerminalGuard {
    cleanup: Arc<Mutex<Option<Box<dyn FnOnce() + Send + 'static>>>>,
}

impl TerminalGuard {
    pub fn new() -> Self {
        Self {
            cleanup: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set_cleanup<F: FnOnce() + Send + 'static>(&self, cleanup: F) {
        *self.cleanup.lock() = Some(Box::new(cleanup));
    }

    pub fn install_panic_hook(&self) {
        let cleanup = Arc::clone(&self.cleanup);
        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if let Some(cleanup_fn) = cleanup.lock().take() {
                cleanup_fn();
            }
            default_hook(info);
        }));
    }

    /// Run the cleanup now if it has not run yet.
    pub fn restore(&self) {
        if let Some(cleanup_fn) = self.cleanup.lock().take() {
            cleanup_fn();
        }
    }
}

impl Default for TerminalGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TerminalGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalGuard")
            .field("armed", &self.cleanup.lock().is_some())
            .finish()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Open the controlling terminal: validate it, enter raw mode, and arm the
/// guard that puts everything back.
pub fn setup_terminal(config: &Config) -> Result<(Surface<StdoutDevice>, TerminalGuard)> {
    let term = std::env::var("TERM").ok();
    check_device(io::stdin().is_tty(), io::stdout().is_tty(), term.as_deref())?;

    let glyphs = GlyphSet::select(config.glyphs, |key| std::env::var(key).ok());
    tracing::debug!(?glyphs, term = term.as_deref().unwrap_or(""), "opening terminal");

    enable_raw_mode()?;
    let guard = TerminalGuard::new();
    guard.set_cleanup(move || {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = stdout.write_all(encode::soft_reset(glyphs.needs_charset_switch()).as_bytes());
        let _ = stdout.flush();
        tracing::debug!("terminal restored");
    });
    guard.install_panic_hook();

    Ok((Surface::new(StdoutDevice::new(), glyphs), guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn cleanup_runs_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let guard = TerminalGuard::new();
        let counter = Arc::clone(&runs);
        guard.set_cleanup(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        guard.restore();
        guard.restore();
        drop(guard);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cleanup_runs_on_drop() {
        let runs = Arc::new(AtomicUsize::new(0));
        {
            let guard = TerminalGuard::new();
            let counter = Arc::clone(&runs);
            guard.set_cleanup(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
