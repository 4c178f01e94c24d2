use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::RenderError;

static QUANTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([-+]?[0-9]+(?:[.,][0-9]+)?)\s*([^\s0-9][^0-9]*?)?\s*$")
        .expect("quantity pattern is valid")
});

const PICTOGRAM_EXTENSIONS: &[&str] = &["png"];

/// How a raw symbol reference should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    #[default]
    Auto,
    Text,
    Pictogram,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HazardSymbol {
    /// Drawn as colored text.
    Text(String),
    /// Decoded from an image file and composited onto the canvas.
    Pictogram(PathBuf),
}

impl HazardSymbol {
    pub fn parse(raw: &str, kind: SymbolKind) -> Self {
        let raw = raw.trim();
        match kind {
            SymbolKind::Text => Self::Text(raw.to_string()),
            SymbolKind::Pictogram => Self::Pictogram(PathBuf::from(raw)),
            SymbolKind::Auto => {
                if has_pictogram_extension(Path::new(raw)) {
                    Self::Pictogram(PathBuf::from(raw))
                } else {
                    Self::Text(raw.to_string())
                }
            }
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Pictogram(path) => path.display().to_string(),
        }
    }
}

fn has_pictogram_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            PICTOGRAM_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContainerSize {
    Text(String),
    Quantity { amount: f64, unit: String },
}

impl ContainerSize {
    /// Reads `"500 mL"`, `"2.5L"` or `"1,5 kg"` as a quantity; anything else
    /// is kept verbatim.
    pub fn parse(raw: &str) -> Self {
        let Some(caps) = QUANTITY_RE.captures(raw) else {
            return Self::Text(raw.trim().to_string());
        };
        let number = caps[1].replace(',', ".");
        match number.parse::<f64>() {
            Ok(amount) => Self::Quantity {
                amount,
                unit: caps
                    .get(2)
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default(),
            },
            Err(_) => Self::Text(raw.trim().to_string()),
        }
    }

    fn validate(&self) -> Result<(), RenderError> {
        match self {
            Self::Text(text) if text.trim().is_empty() => Err(RenderError::InvalidRequest(
                "container size is empty".to_string(),
            )),
            Self::Quantity { amount, .. } if !amount.is_finite() || *amount <= 0.0 => {
                Err(RenderError::InvalidRequest(format!(
                    "container size must be positive, got {amount}"
                )))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ContainerSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Quantity { amount, unit } => {
                if amount.fract() == 0.0 && amount.abs() < 1e15 {
                    write!(f, "{}", *amount as i64)?;
                } else {
                    write!(f, "{amount}")?;
                }
                if !unit.is_empty() {
                    write!(f, " {unit}")?;
                }
                Ok(())
            }
        }
    }
}

/// The input of a single render call.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRequest {
    pub chemical_name: String,
    pub hazard_symbols: Vec<HazardSymbol>,
    pub container_size: ContainerSize,
}

impl LabelRequest {
    pub fn new(
        chemical_name: impl Into<String>,
        hazard_symbols: Vec<HazardSymbol>,
        container_size: ContainerSize,
    ) -> Self {
        Self {
            chemical_name: chemical_name.into(),
            hazard_symbols,
            container_size,
        }
    }

    /// Builds a request from raw strings, classifying symbols with `kind`.
    pub fn from_raw<S: AsRef<str>>(
        chemical_name: &str,
        symbols: &[S],
        container_size: &str,
        kind: SymbolKind,
    ) -> Self {
        Self {
            chemical_name: chemical_name.trim().to_string(),
            hazard_symbols: symbols
                .iter()
                .map(|s| AsRef::<str>::as_ref(s))
                .filter(|s| !s.trim().is_empty())
                .map(|s| HazardSymbol::parse(s, kind))
                .collect(),
            container_size: ContainerSize::parse(container_size),
        }
    }

    pub fn validate(&self, require_symbols: bool) -> Result<(), RenderError> {
        if self.chemical_name.trim().is_empty() {
            return Err(RenderError::InvalidRequest(
                "chemical name is empty".to_string(),
            ));
        }
        if require_symbols && self.hazard_symbols.is_empty() {
            return Err(RenderError::InvalidRequest(
                "at least one hazard symbol is required".to_string(),
            ));
        }
        self.container_size.validate()
    }

    pub fn caption(&self) -> String {
        format!("Size: {}", self.container_size)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestFile {
    chemical_name: String,
    #[serde(default)]
    hazard_symbols: Vec<String>,
    container_size: RawSize,
    #[serde(default)]
    symbol_kind: SymbolKind,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSize {
    Text(String),
    Number(f64),
}

/// Parses a JSON5 request file body.
pub fn parse_request(input: &str) -> Result<LabelRequest, RenderError> {
    let parsed: RequestFile =
        json5::from_str(input).map_err(|err| RenderError::Config(err.to_string()))?;
    let size = match parsed.container_size {
        RawSize::Text(text) => text,
        RawSize::Number(n) => n.to_string(),
    };
    Ok(LabelRequest::from_raw(
        &parsed.chemical_name,
        &parsed.hazard_symbols,
        &size,
        parsed.symbol_kind,
    ))
}

pub fn load_request(path: &Path) -> Result<LabelRequest, RenderError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|err| RenderError::Config(format!("{}: {err}", path.display())))?;
    parse_request(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_size_parses_quantities() {
        assert_eq!(
            ContainerSize::parse("500 mL"),
            ContainerSize::Quantity {
                amount: 500.0,
                unit: "mL".to_string()
            }
        );
        assert_eq!(
            ContainerSize::parse("2,5L"),
            ContainerSize::Quantity {
                amount: 2.5,
                unit: "L".to_string()
            }
        );
        assert_eq!(
            ContainerSize::parse("one drum"),
            ContainerSize::Text("one drum".to_string())
        );
    }

    #[test]
    fn container_size_display_drops_integral_fraction() {
        assert_eq!(ContainerSize::parse("500 mL").to_string(), "500 mL");
        assert_eq!(ContainerSize::parse("2.5 L").to_string(), "2.5 L");
        assert_eq!(ContainerSize::parse("12").to_string(), "12");
    }

    #[test]
    fn auto_symbol_kind_uses_extension() {
        assert_eq!(
            HazardSymbol::parse("flame.png", SymbolKind::Auto),
            HazardSymbol::Pictogram(PathBuf::from("flame.png"))
        );
        assert_eq!(
            HazardSymbol::parse("FLAME.PNG", SymbolKind::Auto),
            HazardSymbol::Pictogram(PathBuf::from("FLAME.PNG"))
        );
        assert_eq!(
            HazardSymbol::parse("Flammable", SymbolKind::Auto),
            HazardSymbol::Text("Flammable".to_string())
        );
        assert_eq!(
            HazardSymbol::parse("flame.png", SymbolKind::Text),
            HazardSymbol::Text("flame.png".to_string())
        );
    }

    #[test]
    fn validate_rejects_blank_fields() {
        let empty_name = LabelRequest::from_raw("  ", &["Toxic"], "1 L", SymbolKind::Auto);
        assert!(matches!(
            empty_name.validate(false),
            Err(RenderError::InvalidRequest(_))
        ));

        let zero_size = LabelRequest::from_raw("Water", &["Toxic"], "0 mL", SymbolKind::Auto);
        assert!(zero_size.validate(false).is_err());

        let blank_size = LabelRequest::from_raw("Water", &["Toxic"], " ", SymbolKind::Auto);
        assert!(blank_size.validate(false).is_err());
    }

    #[test]
    fn signed_sizes_parse_as_quantities() {
        assert_eq!(
            ContainerSize::parse("-5 mL"),
            ContainerSize::Quantity {
                amount: -5.0,
                unit: "mL".to_string()
            }
        );
        assert_eq!(
            ContainerSize::parse("+2 L"),
            ContainerSize::Quantity {
                amount: 2.0,
                unit: "L".to_string()
            }
        );
    }

    #[test]
    fn validate_rejects_non_positive_sizes() {
        for raw in ["-5 mL", "-0.5 L", "0", "-0,0 kg"] {
            let request = LabelRequest::from_raw("Water", &["Toxic"], raw, SymbolKind::Auto);
            assert!(
                matches!(request.validate(false), Err(RenderError::InvalidRequest(_))),
                "{raw:?} should be rejected"
            );
        }
        let positive = LabelRequest::from_raw("Water", &["Toxic"], "+2 L", SymbolKind::Auto);
        assert!(positive.validate(false).is_ok());
    }

    #[test]
    fn request_file_rejects_non_positive_numeric_size() {
        for body in [
            r#"{ chemicalName: "Ethanol", hazardSymbols: ["Flammable"], containerSize: -5 }"#,
            r#"{ chemicalName: "Ethanol", hazardSymbols: ["Flammable"], containerSize: 0 }"#,
        ] {
            let request = parse_request(body).expect("parses");
            assert!(matches!(
                request.validate(true),
                Err(RenderError::InvalidRequest(_))
            ));
        }
    }

    #[test]
    fn empty_symbol_list_only_rejected_when_required() {
        let none: [&str; 0] = [];
        let request = LabelRequest::from_raw("Water", &none, "1 L", SymbolKind::Auto);
        assert!(request.validate(false).is_ok());
        assert!(request.validate(true).is_err());
    }

    #[test]
    fn request_file_accepts_json5() {
        let input = r#"{
            // comments are allowed
            chemicalName: "Acetone",
            hazardSymbols: ["flame.png", "Irritant"],
            containerSize: "500 mL",
        }"#;
        let request = parse_request(input).expect("request parses");
        assert_eq!(request.chemical_name, "Acetone");
        assert_eq!(request.hazard_symbols.len(), 2);
        assert_eq!(request.caption(), "Size: 500 mL");
    }

    #[test]
    fn request_file_accepts_numeric_size() {
        let request =
            parse_request(r#"{ chemicalName: "Ethanol", containerSize: 250 }"#).expect("parses");
        assert_eq!(request.container_size.to_string(), "250");
        assert!(request.hazard_symbols.is_empty());
    }
}
