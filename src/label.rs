use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::PathBuf;

static GLYPH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([A-Z0-9]+)\}").unwrap());

/// Title text of a label plus the optional style hints it carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
    pub font_size: Option<f32>,
    pub font_weight: Option<String>,
    pub fill: Option<String>,
    pub x_offset: f32,
    pub y_offset: f32,
}

impl Title {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: None,
            font_weight: None,
            fill: None,
            x_offset: 0.0,
            y_offset: 0.0,
        }
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn with_offsets(mut self, x: f32, y: f32) -> Self {
        self.x_offset = x;
        self.y_offset = y;
        self
    }
}

/// What is drawn next to the title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum VisualContent {
    /// Card symbols such as `W` or `PW`, one icon per glyph.
    Glyphs(Vec<String>),
    /// A single named icon file.
    Icon(String),
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelRecord {
    pub title: Title,
    pub caption: Option<String>,
    pub content: VisualContent,
    /// Filled in by asset resolution; empty until then.
    pub icon_paths: Vec<PathBuf>,
}

impl LabelRecord {
    pub fn new(title: Title, content: VisualContent) -> Self {
        Self {
            title,
            caption: None,
            content,
            icon_paths: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Title::new(text), VisualContent::None)
    }

    /// A label showing the card symbols of `symbol`, e.g. `{W}{U}`.
    pub fn with_symbol(title: Title, symbol: &str) -> Self {
        Self::new(title, VisualContent::Glyphs(parse_glyphs(symbol)))
    }

    pub fn with_icon(title: Title, icon: impl Into<String>) -> Self {
        Self::new(title, VisualContent::Icon(icon.into()))
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

/// Splits a symbol string like `{W}{U}{7}` into `["W", "U", "7"]`.
/// Anything outside braces, and lowercase symbols, are ignored.
pub fn parse_glyphs(symbol: &str) -> Vec<String> {
    GLYPH_RE
        .captures_iter(symbol)
        .map(|caps| caps[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_glyph_sequences() {
        assert_eq!(parse_glyphs("{W}{U}{B}"), vec!["W", "U", "B"]);
        assert_eq!(parse_glyphs("{PW}"), vec!["PW"]);
        assert_eq!(parse_glyphs("{7}{X}"), vec!["7", "X"]);
        assert!(parse_glyphs("").is_empty());
        assert!(parse_glyphs("W/U").is_empty());
    }

    #[test]
    fn builds_symbol_label() {
        let label = LabelRecord::with_symbol(Title::new("Azorius"), "{W}{U}");
        assert_eq!(
            label.content,
            VisualContent::Glyphs(vec!["W".to_string(), "U".to_string()])
        );
        assert!(label.icon_paths.is_empty());
    }
}
