use crate::config::{Config, GlyphPreference};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ansiterm", version, about = "ANSI terminal control surface demos")]
pub struct Cli {
    /// Config file (default: <config dir>/ansiterm/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Line-drawing glyphs.
    #[arg(long, global = true, value_enum)]
    pub glyphs: Option<GlyphPreference>,

    /// How long a lone ESC waits for a follow-up byte.
    #[arg(long, global = true, value_name = "MS")]
    pub escape_timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every decoded input event (p: cursor report, s: status, q: quit).
    Keys {
        /// Leave Ctrl+C unhandled so the session terminates on it.
        #[arg(long)]
        unhandled_interrupt: bool,
    },
    /// Draw a framed screen; arrows move the marker, q quits.
    Draw,
    /// Print the current terminal size.
    Size,
}

impl Cli {
    /// Command-line flags override file values.
    pub fn apply(&self, config: &mut Config) {
        if let Some(glyphs) = self.glyphs {
            config.glyphs = glyphs;
        }
        if let Some(ms) = self.escape_timeout_ms {
            config.escape_timeout_ms = ms;
        }
    }
}
