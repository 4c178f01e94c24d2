use crate::config::{RenderConfig, SymbolLayout};
use crate::text_metrics::LoadedFont;

use super::types::{CaptionPlacement, LayoutCursor};

/// Places the size caption near the bottom edge, pushing it below the
/// symbols when the cursor comes within `caption_buffer` of the default
/// position. The pushed position is clamped to the bottom margin.
pub(super) fn place_caption(
    text: String,
    config: &RenderConfig,
    font: &LoadedFont,
    cursor: &LayoutCursor,
    row_left: Option<i32>,
) -> CaptionPlacement {
    let m = &config.metrics;
    let height = config.canvas_height as i32;
    let default_y = height - m.caption_bottom_offset;
    let lowest = height - m.caption_bottom_margin;

    let contended = match config.symbol_layout {
        SymbolLayout::Vertical => true,
        SymbolLayout::Horizontal => match row_left {
            Some(left) => m.caption_x as f32 + font.text_width(&text) >= left as f32,
            None => false,
        },
    };

    let mut y = default_y;
    let mut pushed = false;
    if contended && cursor.y() >= default_y - m.caption_buffer {
        y = (cursor.y() + m.caption_buffer).min(lowest);
        pushed = true;
        log::debug!("caption pushed from {default_y} to {y} (cursor {})", cursor.y());
    }

    CaptionPlacement {
        text,
        x: m.caption_x,
        y,
        default_y,
        pushed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caption(config: &RenderConfig, cursor: i32, row_left: Option<i32>) -> CaptionPlacement {
        place_caption(
            "Size: 500 mL".to_string(),
            config,
            &LoadedFont::approximate(20.0),
            &LayoutCursor::new(cursor),
            row_left,
        )
    }

    #[test]
    fn caption_stays_at_default_when_clear() {
        let placed = caption(&RenderConfig::portrait(), 300, None);
        assert_eq!(placed.y, 560);
        assert!(!placed.pushed);
    }

    #[test]
    fn caption_moves_below_cursor_within_buffer() {
        let placed = caption(&RenderConfig::portrait(), 545, None);
        assert_eq!(placed.y, 565);
        assert!(placed.pushed);
    }

    #[test]
    fn pushed_caption_is_clamped_to_bottom_margin() {
        let placed = caption(&RenderConfig::portrait(), 590, None);
        assert_eq!(placed.y, 580);
    }

    #[test]
    fn horizontal_caption_ignores_distant_row() {
        let placed = caption(&RenderConfig::landscape(), 280, Some(420));
        assert_eq!(placed.y, 260);
        assert!(!placed.pushed);
    }

    #[test]
    fn horizontal_caption_yields_to_row_it_reaches() {
        let placed = caption(&RenderConfig::landscape(), 280, Some(100));
        assert!(placed.pushed);
        assert_eq!(placed.y, 280);
    }
}
