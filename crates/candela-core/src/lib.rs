//! Candela Core — domain layer for display-adaptive image viewing.
//!
//! This crate contains the color-kind classification, the image and display
//! data model, exposure math, and the render-options resolver. No GPU, I/O,
//! or async dependencies.

pub mod color;
pub mod constants;
pub mod display;
pub mod image;
pub mod render;

// Re-exports for convenience.
pub use color::{classify, AdvancedColorKind, CustomColorSpace, CustomGamma};
pub use display::{AdvancedColorInfo, DisplayStateTracker, DisplayTransition};
pub use image::{ImageCll, ImageInfo, PixelBuffer};
pub use render::options::{RenderEffectKind, RenderOptions, RenderOverrides};
pub use render::resolve::resolve;
