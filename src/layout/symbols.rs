use crate::config::RenderConfig;
use crate::request::HazardSymbol;
use crate::text_metrics::LoadedFont;

use super::types::{LayoutCursor, SymbolPlacement};

pub(super) struct SymbolRun {
    pub placements: Vec<SymbolPlacement>,
    pub spacing: i32,
    /// Left edge of a horizontal row.
    pub row_left: Option<i32>,
}

fn symbol_size(symbol: &HazardSymbol, box_size: u32, font: &LoadedFont) -> (u32, u32) {
    match symbol {
        HazardSymbol::Pictogram(_) => (box_size, box_size),
        HazardSymbol::Text(text) => (
            font.text_width(text).ceil().max(0.0) as u32,
            font.line_height().ceil().max(1.0) as u32,
        ),
    }
}

/// Spreads the symbols evenly over the band between the cursor and the
/// bottom margin, one column at a fixed fraction of the canvas width.
pub(super) fn place_vertical(
    symbols: &[HazardSymbol],
    config: &RenderConfig,
    font: &LoadedFont,
    cursor: &mut LayoutCursor,
) -> SymbolRun {
    let m = &config.metrics;
    let height = config.canvas_height as i32;
    cursor.advance_to(m.symbol_top_offset);
    let band = (height - cursor.y() - m.symbol_bottom_margin).max(0);
    let spacing = if symbols.is_empty() {
        0
    } else {
        band / symbols.len() as i32
    };
    let x = (config.canvas_width as f32 * m.symbol_x_fraction).round() as i32;

    let mut placements = Vec::with_capacity(symbols.len());
    for (index, symbol) in symbols.iter().enumerate() {
        let (width, height) = symbol_size(symbol, config.symbol_box_size, font);
        placements.push(SymbolPlacement {
            index,
            symbol: symbol.clone(),
            x,
            y: cursor.y(),
            width,
            height,
        });
        cursor.advance_by(spacing);
    }
    log::debug!(
        "vertical symbol band: {} symbols, spacing {spacing}, cursor {}",
        symbols.len(),
        cursor.y()
    );

    SymbolRun {
        placements,
        spacing,
        row_left: None,
    }
}

/// Lays the symbols out in one row flush with the trailing edge, resting on
/// the bottom margin. When the row would not fit, text labels are shortened
/// first and pictograms shrink after that.
pub(super) fn place_horizontal(
    symbols: &[HazardSymbol],
    config: &RenderConfig,
    font: &LoadedFont,
    cursor: &mut LayoutCursor,
) -> SymbolRun {
    let m = &config.metrics;
    let gap = m.row_margin.max(0);
    if symbols.is_empty() {
        return SymbolRun {
            placements: Vec::new(),
            spacing: gap,
            row_left: None,
        };
    }

    let width = config.canvas_width as i32;
    let height = config.canvas_height as i32;
    let count = symbols.len() as i32;
    let available = (width - 2 * gap).max(0);
    let mut box_size = config.symbol_box_size.max(1) as i32;
    let row = fit_text_labels(symbols, box_size as u32, available, gap, font);
    let pictograms = row
        .iter()
        .filter(|s| matches!(s, HazardSymbol::Pictogram(_)))
        .count() as i32;
    let text_total: i32 = row
        .iter()
        .map(|s| match s {
            HazardSymbol::Text(_) => symbol_size(s, box_size as u32, font).0 as i32,
            HazardSymbol::Pictogram(_) => 0,
        })
        .sum();

    let natural = text_total + pictograms * box_size + gap * (count - 1);
    if natural > available && pictograms > 0 {
        let room = available - text_total - gap * (count - 1);
        box_size = (room / pictograms).clamp(1, box_size);
        log::debug!("symbol row too wide ({natural}px), shrinking pictograms to {box_size}px");
    }

    let sizes: Vec<(u32, u32)> = row
        .iter()
        .map(|s| symbol_size(s, box_size as u32, font))
        .collect();
    let row_width = row_span(&sizes, gap);
    if row_width > available {
        log::warn!("symbol row is {row_width}px wide and overflows the {available}px canvas");
    }
    let row_height = sizes.iter().map(|(_, h)| *h as i32).max().unwrap_or(0);
    let row_left = (width - gap - row_width).max(gap);
    let row_top = (height - m.caption_bottom_margin - row_height).max(cursor.y());

    let mut placements = Vec::with_capacity(symbols.len());
    let mut x = row_left;
    for (index, (symbol, (w, h))) in row.into_iter().zip(sizes).enumerate() {
        placements.push(SymbolPlacement {
            index,
            symbol,
            x,
            y: row_top + (row_height - h as i32) / 2,
            width: w,
            height: h,
        });
        x += w as i32 + gap;
    }
    cursor.advance_to(row_top + row_height);

    SymbolRun {
        placements,
        spacing: gap,
        row_left: Some(row_left),
    }
}

fn row_span(sizes: &[(u32, u32)], gap: i32) -> i32 {
    let widths: i32 = sizes.iter().map(|(w, _)| *w as i32).sum();
    widths + gap * (sizes.len() as i32 - 1).max(0)
}

/// Shortens the widest text labels, one character at a time with a
/// trailing ellipsis, until the row fits `available` or nothing is left to
/// shorten.
fn fit_text_labels(
    symbols: &[HazardSymbol],
    box_size: u32,
    available: i32,
    gap: i32,
    font: &LoadedFont,
) -> Vec<HazardSymbol> {
    let mut row = symbols.to_vec();
    let span = |row: &[HazardSymbol]| {
        let sizes: Vec<(u32, u32)> = row.iter().map(|s| symbol_size(s, box_size, font)).collect();
        row_span(&sizes, gap)
    };
    let mut row_width = span(&row);
    while row_width > available {
        let widest = row
            .iter()
            .enumerate()
            .filter_map(|(idx, symbol)| match symbol {
                HazardSymbol::Text(text) => shorten(text).map(|short| (idx, font.text_width(text), short)),
                HazardSymbol::Pictogram(_) => None,
            })
            .max_by(|a, b| a.1.total_cmp(&b.1));
        let Some((idx, _, short)) = widest else {
            break;
        };
        row[idx] = HazardSymbol::Text(short);
        row_width = span(&row);
    }
    row
}

fn shorten(text: &str) -> Option<String> {
    let mut chars: Vec<char> = text.trim_end_matches(ELLIPSIS).chars().collect();
    if chars.len() <= 1 {
        return None;
    }
    chars.pop();
    let mut short: String = chars.into_iter().collect();
    short.push(ELLIPSIS);
    Some(short)
}

const ELLIPSIS: char = '\u{2026}';
