//! Trait seams for the external collaborators: the decoder, the swap-chain
//! renderer, and the platform capability query.
//!
//! Keeping these as traits lets the session run against the GPU renderer in
//! the shell, the software renderer in tests and the demo, or fakes.

use std::io::{Read, Seek, Write};
use std::path::Path;

use candela_core::image::{ImageCll, ImageInfo, PixelBuffer};
use candela_core::render::options::RenderOptions;

use crate::acquire::AcquireOptions;

/// Decode failure reported by a decoder backend.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The payload was rejected. `heif_payload` reports whether the content
    /// was recognized as the HEIF container family, which acquisition uses
    /// to distinguish a missing codec from a corrupt file.
    #[error("decoder rejected the data")]
    InvalidData { heif_payload: bool },

    #[error("I/O error while decoding: {0}")]
    Io(#[from] std::io::Error),
}

/// A successful decode: normalized metadata plus the pixel handle the
/// renderer will upload.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub info: ImageInfo,
    pub pixels: PixelBuffer,
}

/// The decoder service. The two entry points are mutually exclusive per
/// file; routing between them is decided by extension before any I/O.
pub trait Decoder: Send + Sync {
    /// Decode from a filesystem path (formats whose decoder requires
    /// path access: Radiance RGBE, OpenEXR, DDS).
    fn decode_from_path(
        &self,
        path: &Path,
        extension: &str,
        options: &AcquireOptions,
    ) -> Result<DecodedImage, DecodeError>;

    /// Decode from a seekable stream (everything else).
    fn decode_from_stream(
        &self,
        stream: &mut (dyn ReadSeek),
        options: &AcquireOptions,
    ) -> Result<DecodedImage, DecodeError>;
}

/// `Read + Seek` trait object alias for stream decoding.
pub trait ReadSeek: Read + Seek + Send {}
impl<T: Read + Seek + Send> ReadSeek for T {}

/// Platform features the session must probe before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformFeature {
    /// HEIF/AVIF container decoding (the 19H1 gate).
    HeifAvifDecode,
}

/// Capability query for version-gated platform features.
pub trait PlatformCapabilities: Send + Sync {
    fn is_available(&self, feature: PlatformFeature) -> bool;
}

/// Errors surfaced by the renderer service.
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("no image is loaded")]
    NoImageLoaded,

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Container formats for SDR export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Png,
    Jpeg,
}

impl ContainerFormat {
    /// Choose the export container from the target file's extension.
    pub fn for_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Self::Jpeg,
            _ => Self::Png,
        }
    }
}

/// The swap-chain renderer, treated as an opaque service.
///
/// Draw and resource-creation calls are non-reentrant and must only be
/// invoked from the single owning context.
pub trait Renderer: Send {
    /// Upload decoded pixels and, when `compute_cll` is set, analyze content
    /// light levels. With `compute_cll` false the renderer must return the
    /// sentinel pair without running the analysis.
    fn load_image(&mut self, pixels: &PixelBuffer, compute_cll: bool) -> ImageCll;

    /// Replace the active options atomically.
    fn set_render_options(&mut self, options: &RenderOptions);

    fn create_window_size_dependent_resources(&mut self);

    fn draw(&mut self);

    /// Tonemap the loaded image to SDR and encode it into `target`.
    fn export_image_to_sdr(
        &mut self,
        target: &mut dyn Write,
        format: ContainerFormat,
    ) -> Result<(), RendererError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_format_by_extension() {
        assert_eq!(ContainerFormat::for_extension("jpg"), ContainerFormat::Jpeg);
        assert_eq!(ContainerFormat::for_extension("JPEG"), ContainerFormat::Jpeg);
        assert_eq!(ContainerFormat::for_extension("png"), ContainerFormat::Png);
        assert_eq!(ContainerFormat::for_extension("tif"), ContainerFormat::Png);
    }
}
