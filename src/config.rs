use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where symbols go on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolLayout {
    /// One column below the title, evenly spread over the symbol band.
    Vertical,
    /// One right-aligned row near the bottom edge.
    Horizontal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontReference {
    pub path: PathBuf,
    pub size: f32,
}

impl Default for FontReference {
    fn default() -> Self {
        Self {
            path: PathBuf::from("arial.ttf"),
            size: 20.0,
        }
    }
}

/// Font used when [`FontReference`] cannot be loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackFont {
    File(PathBuf),
    /// Family query against the system font database, e.g. `sans-serif`.
    System(String),
    /// The font compiled into the crate; always available.
    Builtin,
}

impl Default for FallbackFont {
    fn default() -> Self {
        Self::System("sans-serif".to_string())
    }
}

/// Fixed offsets of the label layout, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutMetrics {
    pub border_stroke: u32,
    pub title_x: i32,
    pub title_y: i32,
    pub title_margin: u32,
    pub min_wrap_columns: usize,
    pub break_on_hyphens: bool,
    pub line_spacing: i32,
    pub symbol_top_offset: i32,
    pub symbol_bottom_margin: i32,
    pub symbol_x_fraction: f32,
    pub row_margin: i32,
    pub caption_x: i32,
    pub caption_bottom_offset: i32,
    pub caption_buffer: i32,
    pub caption_bottom_margin: i32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            border_stroke: 3,
            title_x: 10,
            title_y: 10,
            title_margin: 20,
            min_wrap_columns: 10,
            break_on_hyphens: true,
            line_spacing: 4,
            symbol_top_offset: 100,
            symbol_bottom_margin: 60,
            symbol_x_fraction: 1.0 / 3.0,
            row_margin: 10,
            caption_x: 10,
            caption_bottom_offset: 40,
            caption_buffer: 20,
            caption_bottom_margin: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub theme: Theme,
    pub max_symbols: usize,
    pub symbol_box_size: u32,
    pub font: FontReference,
    pub fallback_font: FallbackFont,
    pub symbol_layout: SymbolLayout,
    pub metrics: LayoutMetrics,
    /// Fixed line drawn under the title.
    pub notice: Option<String>,
    /// Base directory for relative pictogram paths.
    pub symbols_dir: Option<PathBuf>,
    pub require_symbols: bool,
}

impl RenderConfig {
    pub fn portrait() -> Self {
        Self {
            canvas_width: 300,
            canvas_height: 600,
            theme: Theme::ghs_default(),
            max_symbols: 8,
            symbol_box_size: 50,
            font: FontReference::default(),
            fallback_font: FallbackFont::default(),
            symbol_layout: SymbolLayout::Vertical,
            metrics: LayoutMetrics::default(),
            notice: None,
            symbols_dir: None,
            require_symbols: false,
        }
    }

    pub fn landscape() -> Self {
        Self {
            canvas_width: 600,
            canvas_height: 300,
            symbol_layout: SymbolLayout::Horizontal,
            ..Self::portrait()
        }
    }

    pub fn from_profile(name: &str) -> Option<Self> {
        match name {
            "portrait" => Some(Self::portrait()),
            "landscape" => Some(Self::landscape()),
            _ => None,
        }
    }

    /// Resolves a pictogram reference against `symbols_dir`.
    pub fn resolve_asset(&self, path: &Path) -> PathBuf {
        match &self.symbols_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::portrait()
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct MetricsFile {
    border_stroke: Option<u32>,
    title_x: Option<i32>,
    title_y: Option<i32>,
    title_margin: Option<u32>,
    min_wrap_columns: Option<usize>,
    break_on_hyphens: Option<bool>,
    line_spacing: Option<i32>,
    symbol_top_offset: Option<i32>,
    symbol_bottom_margin: Option<i32>,
    symbol_x_fraction: Option<f32>,
    row_margin: Option<i32>,
    caption_x: Option<i32>,
    caption_bottom_offset: Option<i32>,
    caption_buffer: Option<i32>,
    caption_bottom_margin: Option<i32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    background: Option<String>,
    text_color: Option<String>,
    border_color: Option<String>,
    symbol_text_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    profile: Option<String>,
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    width: Option<u32>,
    height: Option<u32>,
    max_symbols: Option<usize>,
    symbol_box_size: Option<u32>,
    font_path: Option<PathBuf>,
    font_size: Option<f32>,
    fallback_font: Option<FallbackFont>,
    symbol_layout: Option<SymbolLayout>,
    notice: Option<String>,
    symbols_dir: Option<PathBuf>,
    require_symbols: Option<bool>,
    layout: Option<MetricsFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<RenderConfig> {
    let Some(path) = path else {
        return Ok(RenderConfig::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<RenderConfig> {
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    let mut config = match parsed.profile.as_deref() {
        Some(name) => RenderConfig::from_profile(name)
            .ok_or_else(|| anyhow::anyhow!("unknown profile '{name}'"))?,
        None => RenderConfig::default(),
    };

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::from_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme '{theme_name}'"))?;
    }
    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.border_color {
            config.theme.border_color = v;
        }
        if let Some(v) = vars.symbol_text_color {
            config.theme.symbol_text_color = v;
        }
    }

    if let Some(v) = parsed.width {
        config.canvas_width = v;
    }
    if let Some(v) = parsed.height {
        config.canvas_height = v;
    }
    if let Some(v) = parsed.max_symbols {
        config.max_symbols = v;
    }
    if let Some(v) = parsed.symbol_box_size {
        if v == 0 {
            anyhow::bail!("symbolBoxSize must be at least 1");
        }
        config.symbol_box_size = v;
    }
    if let Some(v) = parsed.font_path {
        config.font.path = v;
    }
    if let Some(v) = parsed.font_size {
        config.font.size = v;
    }
    if let Some(v) = parsed.fallback_font {
        config.fallback_font = v;
    }
    if let Some(v) = parsed.symbol_layout {
        config.symbol_layout = v;
    }
    if parsed.notice.is_some() {
        config.notice = parsed.notice;
    }
    if parsed.symbols_dir.is_some() {
        config.symbols_dir = parsed.symbols_dir;
    }
    if let Some(v) = parsed.require_symbols {
        config.require_symbols = v;
    }

    if let Some(layout) = parsed.layout {
        let m = &mut config.metrics;
        if let Some(v) = layout.border_stroke {
            m.border_stroke = v;
        }
        if let Some(v) = layout.title_x {
            m.title_x = v;
        }
        if let Some(v) = layout.title_y {
            m.title_y = v;
        }
        if let Some(v) = layout.title_margin {
            m.title_margin = v;
        }
        if let Some(v) = layout.min_wrap_columns {
            m.min_wrap_columns = v;
        }
        if let Some(v) = layout.break_on_hyphens {
            m.break_on_hyphens = v;
        }
        if let Some(v) = layout.line_spacing {
            m.line_spacing = v;
        }
        if let Some(v) = layout.symbol_top_offset {
            m.symbol_top_offset = v;
        }
        if let Some(v) = layout.symbol_bottom_margin {
            m.symbol_bottom_margin = v;
        }
        if let Some(v) = layout.symbol_x_fraction {
            m.symbol_x_fraction = v;
        }
        if let Some(v) = layout.row_margin {
            m.row_margin = v;
        }
        if let Some(v) = layout.caption_x {
            m.caption_x = v;
        }
        if let Some(v) = layout.caption_bottom_offset {
            m.caption_bottom_offset = v;
        }
        if let Some(v) = layout.caption_buffer {
            m.caption_buffer = v;
        }
        if let Some(v) = layout.caption_bottom_margin {
            m.caption_bottom_margin = v;
        }
    }

    Ok(config)
}
