#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod request;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{FallbackFont, FontReference, LayoutMetrics, RenderConfig, SymbolLayout, load_config};
pub use error::RenderError;
pub use layout::{LabelLayout, compute_layout};
pub use render::{RenderReport, RenderedLabel, render_label, render_label_to_file};
pub use request::{ContainerSize, HazardSymbol, LabelRequest, SymbolKind};
pub use theme::Theme;
