use crate::config::{FallbackFont, RenderConfig, SymbolLayout, load_config};
use crate::layout_dump::write_layout_dump;
use crate::render::render_label_to_file;
use crate::request::{ContainerSize, HazardSymbol, LabelRequest, SymbolKind, load_request};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ghslabel", version, about = "Render a GHS chemical hazard label to PNG")]
pub struct Args {
    /// Chemical name shown as the label title
    #[arg(short = 'n', long = "name")]
    pub name: Option<String>,

    /// Hazard symbol: a pictogram file (.png) or a text label. Repeatable.
    #[arg(short = 's', long = "symbol")]
    pub symbols: Vec<String>,

    /// Container size, e.g. "500 mL"
    #[arg(short = 'z', long = "size")]
    pub size: Option<String>,

    /// Output PNG file
    #[arg(short = 'o', long = "output", default_value = "ghs_label.png")]
    pub output: PathBuf,

    /// JSON5 request file with chemicalName, hazardSymbols and containerSize
    #[arg(short = 'r', long = "request")]
    pub request: Option<PathBuf>,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas profile
    #[arg(short = 'p', long = "profile", value_enum)]
    pub profile: Option<Profile>,

    /// Symbol placement policy
    #[arg(short = 'l', long = "layout", value_enum)]
    pub layout: Option<LayoutArg>,

    /// How to interpret --symbol values
    #[arg(long = "symbol-kind", value_enum, default_value = "auto")]
    pub symbol_kind: SymbolKindArg,

    /// TrueType/OpenType font file
    #[arg(short = 'f', long = "font")]
    pub font: Option<PathBuf>,

    /// Font size in pixels
    #[arg(long = "font-size")]
    pub font_size: Option<f32>,

    /// Font file used when --font cannot be loaded
    #[arg(long = "fallback-font")]
    pub fallback_font: Option<PathBuf>,

    /// Fixed notice printed under the title
    #[arg(long = "notice")]
    pub notice: Option<String>,

    /// Directory relative pictogram paths are resolved against
    #[arg(short = 'd', long = "symbols-dir")]
    pub symbols_dir: Option<PathBuf>,

    /// Write the computed layout as JSON
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Profile {
    Portrait,
    Landscape,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum LayoutArg {
    Vertical,
    Horizontal,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum SymbolKindArg {
    Auto,
    Text,
    Pictogram,
}

impl From<SymbolKindArg> for SymbolKind {
    fn from(arg: SymbolKindArg) -> Self {
        match arg {
            SymbolKindArg::Auto => SymbolKind::Auto,
            SymbolKindArg::Text => SymbolKind::Text,
            SymbolKindArg::Pictogram => SymbolKind::Pictogram,
        }
    }
}

pub fn run() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = build_config(&args)?;
    let request = build_request(&args)?;

    let report = render_label_to_file(&request, &config, &args.output)?;
    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &report.layout, &report.warnings)?;
    }
    if report.warnings.is_empty() {
        println!("GHS label saved as {}", report.output.display());
    } else {
        println!(
            "GHS label saved as {} ({} warning(s))",
            report.output.display(),
            report.warnings.len()
        );
    }
    Ok(())
}

fn build_config(args: &Args) -> Result<RenderConfig> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(profile) = args.profile {
        let base = match profile {
            Profile::Portrait => RenderConfig::portrait(),
            Profile::Landscape => RenderConfig::landscape(),
        };
        config.canvas_width = base.canvas_width;
        config.canvas_height = base.canvas_height;
        config.symbol_layout = base.symbol_layout;
    }
    if let Some(layout) = args.layout {
        config.symbol_layout = match layout {
            LayoutArg::Vertical => SymbolLayout::Vertical,
            LayoutArg::Horizontal => SymbolLayout::Horizontal,
        };
    }
    if let Some(font) = &args.font {
        config.font.path = font.clone();
    }
    if let Some(size) = args.font_size {
        config.font.size = size;
    }
    if let Some(fallback) = &args.fallback_font {
        config.fallback_font = FallbackFont::File(fallback.clone());
    }
    if args.notice.is_some() {
        config.notice = args.notice.clone();
    }
    if args.symbols_dir.is_some() {
        config.symbols_dir = args.symbols_dir.clone();
    }
    // Every field of the label is mandatory on the command line.
    config.require_symbols = true;
    Ok(config)
}

fn build_request(args: &Args) -> Result<LabelRequest> {
    let mut request = match args.request.as_deref() {
        Some(path) => load_request(path)?,
        None => LabelRequest::new(String::new(), Vec::new(), ContainerSize::Text(String::new())),
    };
    if let Some(name) = &args.name {
        request.chemical_name = name.trim().to_string();
    }
    if !args.symbols.is_empty() {
        let kind = SymbolKind::from(args.symbol_kind);
        request.hazard_symbols = args
            .symbols
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| HazardSymbol::parse(s, kind))
            .collect();
    }
    if let Some(size) = &args.size {
        request.container_size = ContainerSize::parse(size);
    }
    Ok(request)
}
