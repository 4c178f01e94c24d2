mod caption;
mod symbols;
pub(crate) mod text;
pub(crate) mod types;
pub use types::*;
use caption::*;
use symbols::*;
use text::*;

use crate::config::{RenderConfig, SymbolLayout};
use crate::request::LabelRequest;
use crate::text_metrics::LoadedFont;

/// Computes where every element of the label goes. No I/O happens here:
/// pictograms are placed whether or not their files exist, so a missing
/// asset never shifts its neighbours.
pub fn compute_layout(request: &LabelRequest, config: &RenderConfig, font: &LoadedFont) -> LabelLayout {
    let m = &config.metrics;
    let columns = wrap_columns(
        config.canvas_width,
        m.title_margin,
        font.reference_glyph_width(),
        m.min_wrap_columns,
    );
    let line_advance = font.line_height().ceil() as i32 + m.line_spacing;

    let title = TextBlock {
        lines: wrap_text(&request.chemical_name, columns, m.break_on_hyphens),
        x: m.title_x,
        y: m.title_y,
        line_advance,
        columns,
    };
    let mut cursor = LayoutCursor::new(title.y);
    cursor.advance_to(title.bottom());

    let notice = config
        .notice
        .as_deref()
        .filter(|text| !text.trim().is_empty())
        .map(|text| {
            let block = TextBlock {
                lines: wrap_text(text, columns, m.break_on_hyphens),
                x: m.title_x,
                y: cursor.y(),
                line_advance,
                columns,
            };
            cursor.advance_to(block.bottom());
            block
        });

    let kept = request.hazard_symbols.len().min(config.max_symbols);
    let dropped_symbols = request.hazard_symbols.len() - kept;
    if dropped_symbols > 0 {
        log::debug!(
            "dropping {dropped_symbols} symbols beyond the limit of {}",
            config.max_symbols
        );
    }
    let symbols = &request.hazard_symbols[..kept];

    let run = match config.symbol_layout {
        SymbolLayout::Vertical => place_vertical(symbols, config, font, &mut cursor),
        SymbolLayout::Horizontal => place_horizontal(symbols, config, font, &mut cursor),
    };

    let caption = place_caption(request.caption(), config, font, &cursor, run.row_left);

    LabelLayout {
        width: config.canvas_width,
        height: config.canvas_height,
        border_stroke: m.border_stroke,
        policy: config.symbol_layout,
        title,
        notice,
        symbols: run.placements,
        dropped_symbols,
        symbol_spacing: run.spacing,
        symbol_cursor: cursor.y(),
        caption,
    }
}
