use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::fs;
use std::path::{Path, PathBuf};
use ttf_parser::Face;

use crate::config::{FallbackFont, FontReference};
use crate::error::RenderError;

static SYSTEM_FONTS: Lazy<Database> = Lazy::new(|| {
    let mut db = Database::new();
    db.load_system_fonts();
    log::debug!("loaded {} system font faces", db.len());
    db
});

const REFERENCE_CHAR: char = 'A';
const FALLBACK_GLYPH_WIDTH: u32 = 10;
const BUILTIN_ADVANCE: f32 = 0.56;
static BUILTIN_FONT: &[u8] = include_bytes!("../assets/fonts/Tuffy.ttf");

/// Where the font in use came from.
#[derive(Debug, Clone, PartialEq)]
pub enum FontSource {
    File(PathBuf),
    System(String),
    Builtin,
    /// Metrics only, see [`LoadedFont::approximate`].
    Approximate,
}

/// A parsed font at a fixed pixel size, or approximate metrics without
/// glyph data.
#[derive(Debug, Clone)]
pub struct LoadedFont {
    data: Option<Vec<u8>>,
    index: u32,
    family: String,
    size: f32,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    ascii_advances: [u16; 128],
    reference_width: Option<f32>,
    source: FontSource,
}

impl LoadedFont {
    pub fn from_file(path: &Path, size: f32) -> Result<Self, RenderError> {
        let bytes = fs::read(path).map_err(|err| RenderError::FontLoadFailed {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Self::from_bytes(bytes, 0, size, FontSource::File(path.to_path_buf())).map_err(|reason| {
            RenderError::FontLoadFailed {
                path: path.to_path_buf(),
                reason,
            }
        })
    }

    /// Looks `family` up in the system font database. A generic family
    /// (`sans-serif`, `serif`, ...) whose mapped name is not installed resolves
    /// to the first installed upright sans face instead.
    pub fn from_system(family: &str, size: f32) -> Option<Self> {
        let families = parse_families(family);
        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = match SYSTEM_FONTS.query(&query) {
            Some(id) => id,
            None if families.iter().any(|f| !matches!(f, Family::Name(_))) => {
                let id = any_system_face()?;
                log::debug!("no face mapped to '{family}', using first installed face");
                id
            }
            None => return None,
        };
        SYSTEM_FONTS
            .with_face_data(id, |data, index| {
                Self::from_bytes(
                    data.to_vec(),
                    index,
                    size,
                    FontSource::System(family.to_string()),
                )
                .ok()
            })
            .flatten()
    }

    /// The font compiled into the crate.
    pub fn builtin(size: f32) -> Self {
        match Self::from_bytes(BUILTIN_FONT.to_vec(), 0, size, FontSource::Builtin) {
            Ok(font) => font,
            Err(reason) => {
                log::error!("built-in font is corrupt ({reason}); text will not be drawn");
                Self::approximate(size)
            }
        }
    }

    /// Fixed-advance metrics with no glyph data. Layout results do not depend
    /// on any font file, which makes them reproducible across hosts.
    pub fn approximate(size: f32) -> Self {
        Self {
            data: None,
            index: 0,
            family: "sans-serif".to_string(),
            size,
            units_per_em: 1000,
            ascender: 800,
            descender: -200,
            ascii_advances: [0; 128],
            reference_width: None,
            source: FontSource::Approximate,
        }
    }

    fn from_bytes(data: Vec<u8>, index: u32, size: f32, source: FontSource) -> Result<Self, String> {
        let face = Face::parse(&data, index).map_err(|err| err.to_string())?;
        let units_per_em = face.units_per_em().max(1);
        let scale = size / units_per_em as f32;

        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph_id) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph_id).unwrap_or(0);
            }
        }
        let reference_width = face
            .glyph_index(REFERENCE_CHAR)
            .and_then(|id| face.glyph_bounding_box(id))
            .map(|bbox| (bbox.x_max as f32 - bbox.x_min as f32) * scale);
        let family = family_name(&face).unwrap_or_else(|| "sans-serif".to_string());
        let ascender = face.ascender();
        let descender = face.descender();

        Ok(Self {
            data: Some(data),
            index,
            family,
            size,
            units_per_em,
            ascender,
            descender,
            ascii_advances,
            reference_width,
            source,
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn source(&self) -> &FontSource {
        &self.source
    }

    /// Raw font file contents; `None` for approximate metrics.
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    fn scale(&self) -> f32 {
        self.size / self.units_per_em as f32
    }

    /// Width of the reference glyph's bounding box in whole pixels.
    pub fn reference_glyph_width(&self) -> u32 {
        let width = match (&self.data, self.reference_width) {
            (None, _) => self.size * BUILTIN_ADVANCE,
            (_, Some(width)) => width,
            (_, None) => 0.0,
        };
        let rounded = width.round();
        if rounded < 1.0 {
            FALLBACK_GLYPH_WIDTH
        } else {
            rounded as u32
        }
    }

    /// Distance from the top of a text line to its baseline.
    pub fn ascent(&self) -> f32 {
        self.ascender as f32 * self.scale()
    }

    /// Height of one line of text, without extra spacing.
    pub fn line_height(&self) -> f32 {
        (self.ascender as f32 - self.descender as f32) * self.scale()
    }

    pub fn text_width(&self, text: &str) -> f32 {
        let fallback = self.size * BUILTIN_ADVANCE;
        let Some(data) = self.data.as_deref() else {
            return text.chars().filter(|c| *c != '\n').count() as f32 * fallback;
        };
        let scale = self.scale();

        if text.is_ascii() {
            return text
                .bytes()
                .filter(|b| *b != b'\n')
                .map(|b| match self.ascii_advances[b as usize] {
                    0 => fallback,
                    advance => advance as f32 * scale,
                })
                .sum();
        }

        let Ok(face) = Face::parse(data, self.index) else {
            return text.chars().count() as f32 * fallback;
        };
        text.chars()
            .filter(|c| *c != '\n')
            .map(|ch| {
                face.glyph_index(ch)
                    .and_then(|id| face.glyph_hor_advance(id))
                    .map(|advance| advance as f32 * scale)
                    .unwrap_or(fallback)
            })
            .sum()
    }
}

/// Resolves the configured font, falling back as needed. Every failed step
/// is returned as a warning.
pub fn resolve_font(font: &FontReference, fallback: &FallbackFont) -> (LoadedFont, Vec<RenderError>) {
    let mut warnings = Vec::new();
    match LoadedFont::from_file(&font.path, font.size) {
        Ok(loaded) => return (loaded, warnings),
        Err(err) => {
            log::warn!("{err}; falling back to default font");
            warnings.push(err);
        }
    }

    let system_family = match fallback {
        FallbackFont::Builtin => None,
        FallbackFont::System(family) => Some(family.as_str()),
        FallbackFont::File(path) => match LoadedFont::from_file(path, font.size) {
            Ok(loaded) => return (loaded, warnings),
            Err(err) => {
                log::warn!("{err}; trying system fonts");
                warnings.push(err);
                Some("sans-serif")
            }
        },
    };

    if let Some(family) = system_family {
        if let Some(loaded) = LoadedFont::from_system(family, font.size) {
            log::debug!("using system font '{}'", loaded.family());
            return (loaded, warnings);
        }
        let err = RenderError::FontLoadFailed {
            path: PathBuf::from(family),
            reason: "no matching system font".to_string(),
        };
        log::warn!("{err}; using built-in font");
        warnings.push(err);
    }

    (LoadedFont::builtin(font.size), warnings)
}

fn any_system_face() -> Option<fontdb::ID> {
    let upright = || {
        SYSTEM_FONTS
            .faces()
            .filter(|face| face.style == Style::Normal && face.weight == Weight::NORMAL)
    };
    let sans = |name: &str| name.contains("Sans") && !name.contains("Mono");
    upright()
        .find(|face| face.families.iter().any(|(name, _)| sans(name.as_str())))
        .or_else(|| upright().next())
        .or_else(|| SYSTEM_FONTS.faces().next())
        .map(|face| face.id)
}

fn family_name(face: &Face<'_>) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|name| name.name_id == ttf_parser::name_id::FAMILY)
        .find_map(|name| name.to_string())
}

fn parse_families(font_family: &str) -> Vec<Family<'_>> {
    let mut families = Vec::new();
    for part in font_family.split(',') {
        let raw = part.trim().trim_matches('"').trim_matches('\'');
        if raw.is_empty() {
            continue;
        }
        let family = match raw.to_ascii_lowercase().as_str() {
            "serif" => Family::Serif,
            "sans-serif" | "system-ui" => Family::SansSerif,
            "monospace" => Family::Monospace,
            "cursive" => Family::Cursive,
            "fantasy" => Family::Fantasy,
            _ => Family::Name(raw),
        };
        families.push(family);
    }
    if families.is_empty() {
        families.push(Family::SansSerif);
    }
    families
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_font_file_reports_path() {
        let err = LoadedFont::from_file(Path::new("/definitely/missing/arial.ttf"), 20.0)
            .expect_err("file does not exist");
        match err {
            RenderError::FontLoadFailed { path, .. } => {
                assert_eq!(path, PathBuf::from("/definitely/missing/arial.ttf"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn garbage_font_file_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.ttf");
        fs::write(&path, b"not a font").expect("write");
        assert!(matches!(
            LoadedFont::from_file(&path, 20.0),
            Err(RenderError::FontLoadFailed { .. })
        ));
    }

    #[test]
    fn approximate_metrics_scale_with_size() {
        let small = LoadedFont::approximate(10.0);
        let large = LoadedFont::approximate(20.0);
        assert!((large.text_width("Hello") - small.text_width("Hello") * 2.0).abs() < 0.01);
        assert_eq!(large.reference_glyph_width(), 11);
        assert!(large.line_height() > large.ascent());
        assert!(large.data().is_none());
    }

    #[test]
    fn builtin_font_carries_glyph_data() {
        let font = LoadedFont::builtin(20.0);
        assert_eq!(font.source(), &FontSource::Builtin);
        assert!(font.data().is_some());
        assert_ne!(font.family(), "sans-serif");
        assert!(font.text_width("Acetone") > 0.0);
        assert!(font.reference_glyph_width() >= 1);
        assert!(font.line_height() > font.ascent());
    }

    #[test]
    fn builtin_fallback_records_primary_failure() {
        let font = FontReference {
            path: PathBuf::from("/missing/font.ttf"),
            size: 20.0,
        };
        let (loaded, warnings) = resolve_font(&font, &FallbackFont::Builtin);
        assert_eq!(loaded.source(), &FontSource::Builtin);
        assert!(loaded.data().is_some());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].is_recoverable());
    }

    #[test]
    fn default_fallback_always_yields_drawable_font() {
        let font = FontReference {
            path: PathBuf::from("/missing/arial.ttf"),
            size: 20.0,
        };
        let (loaded, _) = resolve_font(&font, &FallbackFont::default());
        assert!(loaded.data().is_some());
        if !SYSTEM_FONTS.is_empty() {
            assert!(matches!(loaded.source(), FontSource::System(_)));
        }
    }

    #[test]
    fn generic_family_finds_an_installed_face() {
        if SYSTEM_FONTS.is_empty() {
            return;
        }
        let font = LoadedFont::from_system("sans-serif", 20.0).expect("some face is installed");
        assert!(font.data().is_some());
        assert!(LoadedFont::from_system("No Such Family 7f3a", 20.0).is_none());
    }

    #[test]
    fn generic_families_map_to_fontdb() {
        let families = parse_families("\"Inter\", sans-serif");
        assert_eq!(families.len(), 2);
        assert!(matches!(families[0], Family::Name("Inter")));
        assert!(matches!(families[1], Family::SansSerif));
        assert!(matches!(parse_families("")[0], Family::SansSerif));
    }
}
