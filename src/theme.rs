use serde::{Deserialize, Serialize};

/// Visual style of a single label. Sizes are in sheet units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub title_font_size: f32,
    /// Long titles shrink until they fit, but never below this size.
    pub min_title_font_size: f32,
    pub title_font_weight: String,
    pub title_fill: String,
    pub caption_font_size: f32,
    pub caption_fill: String,
    pub outline_stroke: String,
    pub outline_stroke_width: f32,
    pub outline_radius: f32,
    pub background: String,
    pub icon_size: f32,
    pub glyph_size: f32,
    pub glyph_gap: f32,
    pub icon_column_width: f32,
    pub text_padding: f32,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "Helvetica, Arial, sans-serif".to_string(),
            title_font_size: 42.0,
            min_title_font_size: 22.0,
            title_font_weight: "bold".to_string(),
            title_fill: "#000000".to_string(),
            caption_font_size: 26.0,
            caption_fill: "#555555".to_string(),
            outline_stroke: "#9A9A9A".to_string(),
            outline_stroke_width: 2.0,
            outline_radius: 25.0,
            background: "#FFFFFF".to_string(),
            icon_size: 110.0,
            glyph_size: 56.0,
            glyph_gap: 6.0,
            icon_column_width: 190.0,
            text_padding: 20.0,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
