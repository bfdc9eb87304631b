use crate::error::ConfigError;
use crate::symbols::LabelKind;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Letter paper, in tenths of a millimetre.
pub const LETTER_WIDTH: f32 = 2160.0;
pub const LETTER_HEIGHT: f32 = 2790.0;

pub const DEFAULT_LABELS_PER_SHEET: usize = 30;
pub const SUPPORTED_LABELS_PER_SHEET: [usize; 2] = [24, 30];

/// Accepts only the label stocks the calibration constants are known for.
pub fn check_labels_per_sheet(value: usize) -> Result<usize, ConfigError> {
    if SUPPORTED_LABELS_PER_SHEET.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::UnsupportedLabelsPerSheet {
            value,
            supported: &SUPPORTED_LABELS_PER_SHEET,
        })
    }
}

const DEFAULT_SET_TYPES: [&str; 13] = [
    "core",
    "expansion",
    "starter",
    "masters",
    "commander",
    "planechase",
    "draft_innovation",
    "duel_deck",
    "premium_deck",
    "from_the_vault",
    "archenemy",
    "box",
    "funny",
];

// Playtest cards, art series, foreign black border reprints and theme decks.
const DEFAULT_IGNORED_SETS: [&str; 14] = [
    "cmb1", "amh1", "cmb2", "fbb", "sum", "4bb", "bchr", "rin", "ren", "rqs", "itp", "sir", "sis",
    "cst",
];

/// Physical sheet and the calibration constants of the label stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    /// Vertical bias compensating for print-head alignment on the stock.
    pub offset_y: f32,
    pub labels_per_sheet: usize,
    /// Added to the naive column pitch (`K_x`).
    pub column_correction: f32,
    /// Subtracted from the naive row pitch (`K_y`).
    pub row_correction: f32,
    /// Horizontal space between two neighbouring labels.
    pub column_gutter: f32,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            width: LETTER_WIDTH,
            height: LETTER_HEIGHT,
            margin: 40.0,
            offset_y: 90.0,
            labels_per_sheet: DEFAULT_LABELS_PER_SHEET,
            column_correction: 10.0,
            row_correction: 18.0,
            column_gutter: 37.0,
        }
    }
}

/// Inclusion rules applied to the set catalogue when no explicit codes are requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRules {
    pub set_types: Vec<String>,
    pub minimum_set_size: u32,
    pub ignored_sets: Vec<String>,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            set_types: DEFAULT_SET_TYPES.iter().map(|v| v.to_string()).collect(),
            minimum_set_size: 50,
            ignored_sets: DEFAULT_IGNORED_SETS.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// How page PDFs are produced from the rendered SVG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfMode {
    /// Shapes and text stay vector graphics.
    #[default]
    Vector,
    /// The page is rasterized and embedded as one image.
    Raster,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub kind: LabelKind,
    pub repeat: bool,
    pub outline: bool,
    pub output_dir: PathBuf,
    pub pdf_mode: PdfMode,
    /// Raster pixels per sheet unit when producing PDF pages.
    pub raster_scale: f32,
    /// Sheet units per inch; 254 for tenths of a millimetre.
    pub units_per_inch: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            kind: LabelKind::All,
            repeat: false,
            outline: false,
            output_dir: PathBuf::from("output"),
            pdf_mode: PdfMode::Vector,
            raster_scale: 1.0,
            units_per_inch: 254.0,
        }
    }
}

impl RenderConfig {
    /// Checks the page output settings. Runs before the output directory is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("raster scale", self.raster_scale),
            ("units per inch", self.units_per_inch),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    pub api_endpoint: String,
    /// Downloaded set and glyph icons.
    pub cache_dir: PathBuf,
    /// Icons shipped with the tool (card type artwork).
    pub icons_dir: PathBuf,
    pub timeout_secs: u64,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "https://api.scryfall.com".to_string(),
            cache_dir: std::env::temp_dir().join("mtglabels").join("svg"),
            icons_dir: PathBuf::from("assets").join("icons"),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub sheet: SheetConfig,
    pub filter: FilterRules,
    pub render: RenderConfig,
    pub assets: AssetConfig,
    pub theme: Theme,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SheetConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    margin: Option<f32>,
    offset_y: Option<f32>,
    labels_per_sheet: Option<usize>,
    column_correction: Option<f32>,
    row_correction: Option<f32>,
    column_gutter: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct FilterConfigFile {
    set_types: Option<Vec<String>>,
    minimum_set_size: Option<u32>,
    ignored_sets: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    kind: Option<LabelKind>,
    repeat: Option<bool>,
    outline: Option<bool>,
    output_dir: Option<PathBuf>,
    pdf_mode: Option<PdfMode>,
    raster_scale: Option<f32>,
    units_per_inch: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct AssetConfigFile {
    api_endpoint: Option<String>,
    cache_dir: Option<PathBuf>,
    icons_dir: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeFile {
    font_family: Option<String>,
    title_font_size: Option<f32>,
    min_title_font_size: Option<f32>,
    title_font_weight: Option<String>,
    title_fill: Option<String>,
    caption_font_size: Option<f32>,
    caption_fill: Option<String>,
    outline_stroke: Option<String>,
    icon_size: Option<f32>,
    glyph_size: Option<f32>,
    icon_column_width: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    sheet: Option<SheetConfigFile>,
    filter: Option<FilterConfigFile>,
    render: Option<RenderConfigFile>,
    assets: Option<AssetConfigFile>,
    theme: Option<ThemeFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed = parse_config_file(&contents)?;
    apply_config_file(&mut config, parsed)?;
    Ok(config)
}

fn parse_config_file(contents: &str) -> anyhow::Result<ConfigFile> {
    match serde_json::from_str::<ConfigFile>(contents) {
        Ok(parsed) => Ok(parsed),
        Err(json_err) => json5::from_str::<ConfigFile>(contents)
            .map_err(|_| anyhow::anyhow!("invalid config file: {json_err}")),
    }
}

fn apply_config_file(config: &mut Config, parsed: ConfigFile) -> Result<(), ConfigError> {
    if let Some(sheet) = parsed.sheet {
        if let Some(v) = sheet.width {
            config.sheet.width = v;
        }
        if let Some(v) = sheet.height {
            config.sheet.height = v;
        }
        if let Some(v) = sheet.margin {
            config.sheet.margin = v;
        }
        if let Some(v) = sheet.offset_y {
            config.sheet.offset_y = v;
        }
        if let Some(v) = sheet.labels_per_sheet {
            config.sheet.labels_per_sheet = check_labels_per_sheet(v)?;
        }
        if let Some(v) = sheet.column_correction {
            config.sheet.column_correction = v;
        }
        if let Some(v) = sheet.row_correction {
            config.sheet.row_correction = v;
        }
        if let Some(v) = sheet.column_gutter {
            config.sheet.column_gutter = v;
        }
    }

    if let Some(filter) = parsed.filter {
        if let Some(v) = filter.set_types {
            config.filter.set_types = v;
        }
        if let Some(v) = filter.minimum_set_size {
            config.filter.minimum_set_size = v;
        }
        if let Some(v) = filter.ignored_sets {
            config.filter.ignored_sets = v.into_iter().map(|code| code.to_lowercase()).collect();
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.kind {
            config.render.kind = v;
        }
        if let Some(v) = render.repeat {
            config.render.repeat = v;
        }
        if let Some(v) = render.outline {
            config.render.outline = v;
        }
        if let Some(v) = render.output_dir {
            config.render.output_dir = v;
        }
        if let Some(v) = render.pdf_mode {
            config.render.pdf_mode = v;
        }
        if let Some(v) = render.raster_scale {
            config.render.raster_scale = v;
        }
        if let Some(v) = render.units_per_inch {
            config.render.units_per_inch = v;
        }
    }

    if let Some(assets) = parsed.assets {
        if let Some(v) = assets.api_endpoint {
            config.assets.api_endpoint = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = assets.cache_dir {
            config.assets.cache_dir = v;
        }
        if let Some(v) = assets.icons_dir {
            config.assets.icons_dir = v;
        }
        if let Some(v) = assets.timeout_secs {
            config.assets.timeout_secs = v;
        }
    }

    if let Some(theme) = parsed.theme {
        if let Some(v) = theme.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = theme.title_font_size {
            config.theme.title_font_size = v;
        }
        if let Some(v) = theme.min_title_font_size {
            config.theme.min_title_font_size = v;
        }
        if let Some(v) = theme.title_font_weight {
            config.theme.title_font_weight = v;
        }
        if let Some(v) = theme.title_fill {
            config.theme.title_fill = v;
        }
        if let Some(v) = theme.caption_font_size {
            config.theme.caption_font_size = v;
        }
        if let Some(v) = theme.caption_fill {
            config.theme.caption_fill = v;
        }
        if let Some(v) = theme.outline_stroke {
            config.theme.outline_stroke = v;
        }
        if let Some(v) = theme.icon_size {
            config.theme.icon_size = v;
        }
        if let Some(v) = theme.glyph_size {
            config.theme.glyph_size = v;
        }
        if let Some(v) = theme.icon_column_width {
            config.theme.icon_column_width = v;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_letter_stock() {
        let config = Config::default();
        assert_eq!(config.sheet.labels_per_sheet, 30);
        assert_eq!(config.sheet.width, 2160.0);
        assert_eq!(config.sheet.offset_y, 90.0);
        assert!(!config.render.repeat);
        assert!(!config.render.outline);
        assert_eq!(config.filter.minimum_set_size, 50);
        assert!(config.filter.ignored_sets.iter().any(|code| code == "cmb1"));
    }

    #[test]
    fn config_file_overrides_only_given_keys() {
        let parsed = parse_config_file(
            r#"{
                "sheet": { "labelsPerSheet": 24, "offsetY": 0 },
                "filter": { "ignoredSets": ["LEA"] },
                "render": { "kind": "alpha", "repeat": true }
            }"#,
        )
        .unwrap();
        let mut config = Config::default();
        apply_config_file(&mut config, parsed).unwrap();
        assert_eq!(config.sheet.labels_per_sheet, 24);
        assert_eq!(config.sheet.offset_y, 0.0);
        assert_eq!(config.sheet.margin, 40.0);
        assert_eq!(config.filter.ignored_sets, vec!["lea".to_string()]);
        assert_eq!(config.render.kind, LabelKind::Alpha);
        assert!(config.render.repeat);
        assert!(!config.render.outline);
    }

    #[test]
    fn config_file_accepts_json5() {
        let parsed = parse_config_file(
            "{\n  // calibration for the new printer\n  sheet: { rowCorrection: 12, },\n}",
        )
        .unwrap();
        let mut config = Config::default();
        apply_config_file(&mut config, parsed).unwrap();
        assert_eq!(config.sheet.row_correction, 12.0);
    }

    #[test]
    fn rejects_garbage_config() {
        assert!(parse_config_file("labelsPerSheet = 30").is_err());
    }

    #[test]
    fn config_file_rejects_unsupported_sheet_counts() {
        let parsed = parse_config_file(r#"{ "sheet": { "labelsPerSheet": 21 } }"#).unwrap();
        let mut config = Config::default();
        assert_eq!(
            apply_config_file(&mut config, parsed).unwrap_err(),
            ConfigError::UnsupportedLabelsPerSheet {
                value: 21,
                supported: &SUPPORTED_LABELS_PER_SHEET,
            }
        );
        assert_eq!(check_labels_per_sheet(24), Ok(24));
    }

    #[test]
    fn render_settings_must_be_positive_and_finite() {
        assert!(RenderConfig::default().validate().is_ok());

        let mut render = RenderConfig::default();
        render.units_per_inch = 0.0;
        assert!(matches!(
            render.validate(),
            Err(ConfigError::NonPositive { field: "units per inch", .. })
        ));

        let mut render = RenderConfig::default();
        render.raster_scale = f32::NAN;
        assert!(matches!(
            render.validate(),
            Err(ConfigError::NotFinite { field: "raster scale", .. })
        ));

        let mut render = RenderConfig::default();
        render.units_per_inch = -254.0;
        assert!(render.validate().is_err());
    }

    #[test]
    fn config_file_selects_pdf_mode() {
        let parsed = parse_config_file(r#"{ "render": { "pdfMode": "raster" } }"#).unwrap();
        let mut config = Config::default();
        apply_config_file(&mut config, parsed).unwrap();
        assert_eq!(config.render.pdf_mode, PdfMode::Raster);
        assert_eq!(Config::default().render.pdf_mode, PdfMode::Vector);
    }
}
