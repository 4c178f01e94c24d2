use serde::Serialize;

use crate::config::SymbolLayout;
use crate::request::HazardSymbol;

/// Running vertical offset of the next free row. It only moves down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutCursor {
    y: i32,
}

impl LayoutCursor {
    pub fn new(y: i32) -> Self {
        Self { y }
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn advance_by(&mut self, delta: i32) {
        self.y += delta.max(0);
    }

    pub fn advance_to(&mut self, y: i32) {
        self.y = self.y.max(y);
    }
}

/// A wrapped block of text anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub x: i32,
    pub y: i32,
    pub line_advance: i32,
    pub columns: usize,
}

impl TextBlock {
    pub fn bottom(&self) -> i32 {
        self.y + self.lines.len() as i32 * self.line_advance
    }

    pub fn line_top(&self, idx: usize) -> i32 {
        self.y + idx as i32 * self.line_advance
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolPlacement {
    /// Position in the request's symbol list.
    pub index: usize,
    pub symbol: HazardSymbol,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptionPlacement {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub default_y: i32,
    /// Moved below the symbols to avoid overlap.
    pub pushed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    pub width: u32,
    pub height: u32,
    pub border_stroke: u32,
    pub policy: SymbolLayout,
    pub title: TextBlock,
    pub notice: Option<TextBlock>,
    pub symbols: Vec<SymbolPlacement>,
    pub dropped_symbols: usize,
    pub symbol_spacing: i32,
    /// Cursor position once every symbol has been placed.
    pub symbol_cursor: i32,
    pub caption: CaptionPlacement,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_never_moves_up() {
        let mut cursor = LayoutCursor::new(100);
        cursor.advance_to(40);
        assert_eq!(cursor.y(), 100);
        cursor.advance_by(-15);
        assert_eq!(cursor.y(), 100);
        cursor.advance_by(55);
        cursor.advance_to(180);
        assert_eq!(cursor.y(), 180);
    }

    #[test]
    fn text_block_bottom_counts_lines() {
        let block = TextBlock {
            lines: vec!["Sodium".to_string(), "hydroxide".to_string()],
            x: 10,
            y: 10,
            line_advance: 24,
            columns: 12,
        };
        assert_eq!(block.bottom(), 58);
        assert_eq!(block.line_top(1), 34);
    }
}
