use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::layout::{LabelLayout, SymbolPlacement, TextBlock, compute_layout};
use crate::request::{HazardSymbol, LabelRequest};
use crate::text_metrics::{LoadedFont, resolve_font};
use resvg::tiny_skia::{FilterQuality, Pixmap, PixmapPaint, Transform};
use std::io;
use std::path::{Path, PathBuf};

/// A finished label that has not been written anywhere yet.
#[derive(Debug)]
pub struct RenderedLabel {
    pub pixmap: Pixmap,
    pub layout: LabelLayout,
    /// Recoverable problems met along the way.
    pub warnings: Vec<RenderError>,
}

impl RenderedLabel {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        self.pixmap
            .encode_png()
            .map_err(|err| RenderError::Raster(err.to_string()))
    }

    pub fn save(&self, output: &Path) -> Result<(), RenderError> {
        write_output_png(&self.pixmap, output)
    }
}

/// Outcome of [`render_label_to_file`].
#[derive(Debug)]
pub struct RenderReport {
    pub output: PathBuf,
    pub layout: LabelLayout,
    pub warnings: Vec<RenderError>,
}

pub fn render_label(request: &LabelRequest, config: &RenderConfig) -> Result<RenderedLabel, RenderError> {
    if config.canvas_width == 0 || config.canvas_height == 0 {
        return Err(RenderError::InvalidRequest(format!(
            "canvas must be non-empty, got {}x{}",
            config.canvas_width, config.canvas_height
        )));
    }
    request.validate(config.require_symbols)?;

    let (font, mut warnings) = resolve_font(&config.font, &config.fallback_font);
    let layout = compute_layout(request, config, &font);
    let svg = render_svg(&layout, config, &font);
    let mut pixmap = rasterize(&svg, &font, config)?;
    warnings.extend(composite_pictograms(&mut pixmap, &layout, config));

    Ok(RenderedLabel {
        pixmap,
        layout,
        warnings,
    })
}

pub fn render_label_to_file(
    request: &LabelRequest,
    config: &RenderConfig,
    output: &Path,
) -> Result<RenderReport, RenderError> {
    let rendered = render_label(request, config)?;
    rendered.save(output)?;
    Ok(RenderReport {
        output: output.to_path_buf(),
        layout: rendered.layout,
        warnings: rendered.warnings,
    })
}

/// Builds the vector scene for everything except pictograms, which are
/// composited onto the raster afterwards.
pub fn render_svg(layout: &LabelLayout, config: &RenderConfig, font: &LoadedFont) -> String {
    let theme = &config.theme;
    let width = layout.width;
    let height = layout.height;
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&theme.background)
    ));

    if layout.border_stroke > 0 {
        let stroke = layout.border_stroke as f32;
        let inset = stroke / 2.0;
        svg.push_str(&format!(
            "<rect x=\"{inset:.2}\" y=\"{inset:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{stroke:.2}\" shape-rendering=\"crispEdges\"/>",
            (width as f32 - stroke).max(0.0),
            (height as f32 - stroke).max(0.0),
            escape_xml(&theme.border_color)
        ));
    }

    svg.push_str(&text_block_svg(&layout.title, &theme.text_color, font));
    if let Some(notice) = &layout.notice {
        svg.push_str(&text_block_svg(notice, &theme.text_color, font));
    }

    for placement in &layout.symbols {
        if let HazardSymbol::Text(text) = &placement.symbol {
            svg.push_str(&text_svg(
                placement.x as f32,
                placement.y as f32 + font.ascent(),
                text,
                &theme.symbol_text_color,
                font,
            ));
        }
    }

    let caption = &layout.caption;
    svg.push_str(&text_svg(
        caption.x as f32,
        caption.y as f32 + font.ascent(),
        &caption.text,
        &theme.text_color,
        font,
    ));

    svg.push_str("</svg>");
    svg
}

fn text_block_svg(block: &TextBlock, fill: &str, font: &LoadedFont) -> String {
    if block.lines.is_empty() {
        return String::new();
    }
    let x = block.x as f32;
    let start_y = block.y as f32 + font.ascent();
    let mut text = String::new();
    text.push_str(&format!(
        "<text x=\"{x:.2}\" y=\"{start_y:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">",
        escape_xml(&quote_family(font.family())),
        font.size(),
        escape_xml(fill)
    ));
    for (idx, line) in block.lines.iter().enumerate() {
        let dy = if idx == 0 { 0 } else { block.line_advance };
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    text.push_str("</text>");
    text
}

fn text_svg(x: f32, baseline: f32, content: &str, fill: &str, font: &LoadedFont) -> String {
    format!(
        "<text x=\"{x:.2}\" y=\"{baseline:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        escape_xml(&quote_family(font.family())),
        font.size(),
        escape_xml(fill),
        escape_xml(content)
    )
}

fn quote_family(family: &str) -> String {
    if family.contains(' ') {
        format!("'{family}'")
    } else {
        family.to_string()
    }
}

fn rasterize(svg: &str, font: &LoadedFont, config: &RenderConfig) -> Result<Pixmap, RenderError> {
    let mut opt = usvg::Options::default();
    opt.font_family = font.family().to_string();
    opt.font_size = font.size();
    // Only the resolved font is visible to the rasterizer, so output does not
    // depend on what else is installed.
    if let Some(data) = font.data() {
        opt.fontdb_mut().load_font_data(data.to_vec());
    }

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|err| RenderError::Raster(err.to_string()))?;
    let mut pixmap = Pixmap::new(config.canvas_width, config.canvas_height).ok_or_else(|| {
        RenderError::Raster(format!(
            "failed to allocate {}x{} pixmap",
            config.canvas_width, config.canvas_height
        ))
    })?;
    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, Transform::default(), &mut pixmap_mut);
    Ok(pixmap)
}

fn composite_pictograms(pixmap: &mut Pixmap, layout: &LabelLayout, config: &RenderConfig) -> Vec<RenderError> {
    let mut warnings = Vec::new();
    for placement in &layout.symbols {
        let HazardSymbol::Pictogram(reference) = &placement.symbol else {
            continue;
        };
        let path = config.resolve_asset(reference);
        match load_pictogram(&path) {
            Ok(glyph) => draw_pictogram(pixmap, &glyph, placement),
            Err(err) => {
                log::warn!("{err}; skipping symbol {}", placement.index + 1);
                warnings.push(err);
            }
        }
    }
    warnings
}

pub fn load_pictogram(path: &Path) -> Result<Pixmap, RenderError> {
    let bytes = std::fs::read(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => RenderError::SymbolAssetMissing {
            path: path.to_path_buf(),
        },
        _ => RenderError::SymbolAssetUnreadable {
            path: path.to_path_buf(),
            reason: err.to_string(),
        },
    })?;
    Pixmap::decode_png(&bytes).map_err(|err| RenderError::SymbolAssetUnreadable {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

/// Scales the glyph into the placement box and blends it source-over.
fn draw_pictogram(canvas: &mut Pixmap, glyph: &Pixmap, placement: &SymbolPlacement) {
    let sx = placement.width as f32 / glyph.width() as f32;
    let sy = placement.height as f32 / glyph.height() as f32;
    let paint = PixmapPaint {
        quality: FilterQuality::Bicubic,
        ..PixmapPaint::default()
    };
    let transform = Transform::from_row(sx, 0.0, 0.0, sy, placement.x as f32, placement.y as f32);
    canvas.draw_pixmap(0, 0, glyph.as_ref(), &paint, transform, None);
}

pub fn write_output_png(pixmap: &Pixmap, output: &Path) -> Result<(), RenderError> {
    let bytes = pixmap
        .encode_png()
        .map_err(|err| RenderError::Raster(err.to_string()))?;
    std::fs::write(output, bytes).map_err(|source| RenderError::PersistFailed {
        path: output.to_path_buf(),
        source,
    })?;
    log::info!("label saved as {}", output.display());
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
