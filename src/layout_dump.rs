use crate::error::RenderError;
use crate::layout::{CaptionPlacement, LabelLayout, TextBlock};
use crate::request::HazardSymbol;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub policy: String,
    pub width: u32,
    pub height: u32,
    pub border_stroke: u32,
    pub title: TextBlock,
    pub notice: Option<TextBlock>,
    pub symbols: Vec<SymbolDump>,
    pub dropped_symbols: usize,
    pub symbol_spacing: i32,
    pub symbol_cursor: i32,
    pub caption: CaptionPlacement,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SymbolDump {
    pub index: usize,
    pub kind: String,
    pub label: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl LayoutDump {
    pub fn from_layout(layout: &LabelLayout, warnings: &[RenderError]) -> Self {
        let symbols = layout
            .symbols
            .iter()
            .map(|placement| SymbolDump {
                index: placement.index,
                kind: match placement.symbol {
                    HazardSymbol::Text(_) => "text".to_string(),
                    HazardSymbol::Pictogram(_) => "pictogram".to_string(),
                },
                label: placement.symbol.label(),
                x: placement.x,
                y: placement.y,
                width: placement.width,
                height: placement.height,
            })
            .collect();

        LayoutDump {
            policy: format!("{:?}", layout.policy),
            width: layout.width,
            height: layout.height,
            border_stroke: layout.border_stroke,
            title: layout.title.clone(),
            notice: layout.notice.clone(),
            symbols,
            dropped_symbols: layout.dropped_symbols,
            symbol_spacing: layout.symbol_spacing,
            symbol_cursor: layout.symbol_cursor,
            caption: layout.caption.clone(),
            warnings: warnings.iter().map(|w| w.to_string()).collect(),
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &LabelLayout, warnings: &[RenderError]) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, warnings);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::layout::compute_layout;
    use crate::request::{LabelRequest, SymbolKind};
    use crate::text_metrics::LoadedFont;
    use std::path::PathBuf;

    #[test]
    fn dump_serializes_symbols_and_caption() {
        let request =
            LabelRequest::from_raw("Acetone", &["flame.png", "Irritant"], "500 mL", SymbolKind::Auto);
        let layout = compute_layout(&request, &RenderConfig::portrait(), &LoadedFont::approximate(20.0));
        let warnings = vec![RenderError::SymbolAssetMissing {
            path: PathBuf::from("flame.png"),
        }];
        let dump = LayoutDump::from_layout(&layout, &warnings);
        let json = serde_json::to_value(&dump).expect("serializes");
        assert_eq!(json["policy"], "Vertical");
        assert_eq!(json["symbols"][0]["kind"], "pictogram");
        assert_eq!(json["symbols"][1]["label"], "Irritant");
        assert_eq!(json["caption"]["text"], "Size: 500 mL");
        assert_eq!(json["warnings"].as_array().map(Vec::len), Some(1));
    }
}
