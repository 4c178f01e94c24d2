use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while rendering a label.
///
/// Font and pictogram failures are recoverable: they are collected as
/// warnings on [`crate::render::RenderedLabel`] and the render continues.
/// The remaining kinds abort the call.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("font '{}' could not be loaded: {reason}", path.display())]
    FontLoadFailed { path: PathBuf, reason: String },

    #[error("pictogram '{}' not found", path.display())]
    SymbolAssetMissing { path: PathBuf },

    #[error("pictogram '{}' could not be decoded: {reason}", path.display())]
    SymbolAssetUnreadable { path: PathBuf, reason: String },

    #[error("unable to save label to '{}': {source}", path.display())]
    PersistFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid label request: {0}")]
    InvalidRequest(String),

    #[error("rasterization failed: {0}")]
    Raster(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RenderError {
    /// True for the kinds that only degrade the output.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FontLoadFailed { .. }
                | Self::SymbolAssetMissing { .. }
                | Self::SymbolAssetUnreadable { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_and_font_failures_are_recoverable() {
        let missing = RenderError::SymbolAssetMissing {
            path: PathBuf::from("flame.png"),
        };
        let font = RenderError::FontLoadFailed {
            path: PathBuf::from("arial.ttf"),
            reason: "not found".to_string(),
        };
        assert!(missing.is_recoverable());
        assert!(font.is_recoverable());
        assert!(!RenderError::InvalidRequest("empty".to_string()).is_recoverable());
    }

    #[test]
    fn persist_failure_names_path_and_cause() {
        let err = RenderError::PersistFailed {
            path: PathBuf::from("/nope/label.png"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let message = err.to_string();
        assert!(message.contains("/nope/label.png"));
        assert!(message.contains("denied"));
    }
}
