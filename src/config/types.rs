use serde::{Deserialize, Serialize};
use std::time::Duration;
use term_input::DEFAULT_ESCAPE_TIMEOUT;

/// Root configuration container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// How long a lone ESC waits for a follow-up byte, in milliseconds (default: 50).
    #[serde(default = "default_escape_timeout_ms")]
    pub escape_timeout_ms: u64,
    /// Line-drawing glyph set (default: auto).
    #[serde(default)]
    pub glyphs: GlyphPreference,
}

fn default_escape_timeout_ms() -> u64 {
    DEFAULT_ESCAPE_TIMEOUT.as_millis() as u64
}

impl Config {
    pub fn escape_timeout(&self) -> Duration {
        Duration::from_millis(self.escape_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            escape_timeout_ms: default_escape_timeout_ms(),
            glyphs: GlyphPreference::default(),
        }
    }
}

/// Which glyphs draw lines and boxes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GlyphPreference {
    /// Pick from the locale and `TERM` at startup.
    #[default]
    Auto,
    Unicode,
    Vt100,
    Ascii,
}
