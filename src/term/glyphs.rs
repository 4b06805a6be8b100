use crate::config::GlyphPreference;

/// Characters used for lines and boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyphs {
    pub horizontal: char,
    pub vertical: char,
    pub top_left: char,
    pub top_right: char,
    pub bottom_right: char,
    pub bottom_left: char,
}

const UNICODE: Glyphs = Glyphs {
    horizontal: '\u{2501}',
    vertical: '\u{2503}',
    top_left: '\u{250f}',
    top_right: '\u{2513}',
    bottom_right: '\u{251b}',
    bottom_left: '\u{2517}',
};

/// DEC special graphics: these letters render as line segments while the
/// line-drawing character set is selected.
const VT100: Glyphs = Glyphs {
    horizontal: 'q',
    vertical: 'x',
    top_left: 'l',
    top_right: 'k',
    bottom_right: 'j',
    bottom_left: 'm',
};

const ASCII: Glyphs = Glyphs {
    horizontal: '-',
    vertical: '|',
    top_left: '+',
    top_right: '+',
    bottom_right: '+',
    bottom_left: '+',
};

/// `TERM` prefixes known to support the VT100 alternate character set.
const VT_FAMILIES: &[&str] = &["vt1", "vt2", "vt3", "xterm", "screen", "tmux", "rxvt", "linux"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphSet {
    Unicode,
    Vt100,
    Ascii,
}

impl GlyphSet {
    /// Resolve a preference, consulting the environment only for `Auto`.
    pub fn select(preference: GlyphPreference, env: impl Fn(&str) -> Option<String>) -> Self {
        match preference {
            GlyphPreference::Unicode => GlyphSet::Unicode,
            GlyphPreference::Vt100 => GlyphSet::Vt100,
            GlyphPreference::Ascii => GlyphSet::Ascii,
            GlyphPreference::Auto => Self::detect(env),
        }
    }

    fn detect(env: impl Fn(&str) -> Option<String>) -> Self {
        let locale = ["LC_ALL", "LC_CTYPE", "LANG"]
            .iter()
            .find_map(|key| env(key).filter(|value| !value.is_empty()));
        if locale.as_deref().is_some_and(is_utf8_locale) {
            return GlyphSet::Unicode;
        }
        match env("TERM") {
            Some(term) if VT_FAMILIES.iter().any(|family| term.starts_with(family)) => {
                GlyphSet::Vt100
            }
            _ => GlyphSet::Ascii,
        }
    }

    pub fn glyphs(self) -> &'static Glyphs {
        match self {
            GlyphSet::Unicode => &UNICODE,
            GlyphSet::Vt100 => &VT100,
            GlyphSet::Ascii => &ASCII,
        }
    }

    /// Whether drawing needs the alternate character set switched on.
    pub fn needs_charset_switch(self) -> bool {
        self == GlyphSet::Vt100
    }
}

fn is_utf8_locale(locale: &str) -> bool {
    let lower = locale.to_ascii_lowercase();
    lower.ends_with("utf-8") || lower.ends_with("utf8")
}
