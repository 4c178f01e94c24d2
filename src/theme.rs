use serde::{Deserialize, Serialize};

/// Label colors. Values are CSS color strings and are handed to the
/// SVG rasterizer unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub background: String,
    pub text_color: String,
    pub border_color: String,
    pub symbol_text_color: String,
}

impl Theme {
    pub fn ghs_default() -> Self {
        Self {
            background: "#FFFFFF".to_string(),
            text_color: "#000000".to_string(),
            border_color: "#000000".to_string(),
            symbol_text_color: "#FF0000".to_string(),
        }
    }

    pub fn high_contrast() -> Self {
        Self {
            background: "#FFFFFF".to_string(),
            text_color: "#000000".to_string(),
            border_color: "#CC0000".to_string(),
            symbol_text_color: "#CC0000".to_string(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ghs" | "default" => Some(Self::ghs_default()),
            "high-contrast" | "highContrast" => Some(Self::high_contrast()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::ghs_default()
    }
}
