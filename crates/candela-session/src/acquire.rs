//! Image acquisition: decoder routing, platform gating, temp-file
//! materialization, and the decode-failure taxonomy.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use candela_core::color::CustomColorSpace;
use candela_core::image::{ImageCll, ImageInfo, PixelBuffer};

use crate::error::LoadError;
use crate::services::{DecodeError, Decoder, PlatformCapabilities, PlatformFeature};

/// Decode-time overrides flowing from the launch configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcquireOptions {
    /// Assign the HDR10/BT.2100 color space to every loaded image.
    pub force_bt2100: bool,
    /// Caller-specified source color space, replacing embedded metadata.
    pub custom_color_space: Option<CustomColorSpace>,
}

/// Which of the two mutually exclusive decoders handles a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeRoute {
    /// The decoder needs filesystem-path access; the source is first
    /// materialized to a writable temporary location.
    Path,
    /// The decoder reads from a stream.
    Stream,
}

impl DecodeRoute {
    /// Route by normalized extension. Pure and total: the path decoder
    /// covers exactly {hdr, exr, dds}, every other extension streams.
    pub fn for_extension(extension: &str) -> Self {
        match extension {
            "hdr" | "exr" | "dds" => Self::Path,
            _ => Self::Stream,
        }
    }
}

/// Lowercased extension without the leading dot.
pub fn normalized_extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Whether the extension belongs to the HEIF/AVIF container family and is
/// therefore subject to the platform capability gate.
pub fn is_heif_family_extension(extension: &str) -> bool {
    matches!(extension, "heic" | "avif")
}

/// A successful acquisition, ready for the renderer.
#[derive(Debug, Clone)]
pub struct AcquiredImage {
    pub info: ImageInfo,
    pub pixels: PixelBuffer,
}

/// Acquire an image from disk through the routed decoder.
///
/// Order of operations is part of the contract:
/// 1. route by extension (no I/O),
/// 2. platform gate for HEIF-family extensions (no I/O, file untouched),
/// 3. materialize + decode,
/// 4. map failures into the typed taxonomy.
pub fn acquire_image<D: Decoder + ?Sized, P: PlatformCapabilities + ?Sized>(
    decoder: &D,
    caps: &P,
    path: &Path,
    options: &AcquireOptions,
) -> Result<AcquiredImage, LoadError> {
    let extension = normalized_extension(path);

    if is_heif_family_extension(&extension)
        && !caps.is_available(PlatformFeature::HeifAvifDecode)
    {
        tracing::warn!(
            ext = extension.as_str(),
            "HEIF-family image on a platform without the decode gate"
        );
        return Err(LoadError::PlatformTooOld);
    }

    let route = DecodeRoute::for_extension(&extension);
    tracing::debug!(path = %path.display(), ext = extension.as_str(), ?route, "acquiring image");

    let decoded = match route {
        DecodeRoute::Path => {
            // The path decoder requires a real filesystem path it can open
            // itself; stage a copy in a writable temporary directory. A
            // failed copy fails the acquisition outright.
            let staging =
                tempfile::tempdir().map_err(|e| LoadError::InvalidFile(e.to_string()))?;
            let file_name = path
                .file_name()
                .ok_or_else(|| LoadError::InvalidFile(format!("{}: not a file", path.display())))?;
            let staged = staging.path().join(file_name);
            std::fs::copy(path, &staged)
                .map_err(|e| LoadError::InvalidFile(format!("{}: {e}", path.display())))?;

            decoder.decode_from_path(&staged, &extension, options)
        }
        DecodeRoute::Stream => {
            let file = File::open(path)
                .map_err(|e| LoadError::InvalidFile(format!("{}: {e}", path.display())))?;
            let mut reader = BufReader::new(file);
            decoder.decode_from_stream(&mut reader, options)
        }
    };

    let decoded = decoded.map_err(|e| classify_decode_failure(&extension, e))?;
    Ok(AcquiredImage {
        info: decoded.info,
        pixels: decoded.pixels,
    })
}

/// Decide whether the image's content light levels must be computed.
///
/// Only meaningful for HDR content; SDR/WCG images carry the sentinel
/// without ever invoking the analysis.
pub fn wants_cll(info: &ImageInfo) -> bool {
    info.image_kind == candela_core::color::AdvancedColorKind::HighDynamicRange
}

/// Clamp a renderer-produced CLL to the sentinel for non-HDR images,
/// regardless of what the decoder or renderer reported.
pub fn normalize_cll(info: &ImageInfo, cll: ImageCll) -> ImageCll {
    if wants_cll(info) {
        cll
    } else {
        ImageCll::SENTINEL
    }
}

/// Map a decode failure into the typed taxonomy.
///
/// A HEIF-family payload that failed to decode in a `.heic` or `.avif` file
/// means the codec is missing, not that the file is corrupt; the remediation
/// shown to the user differs.
fn classify_decode_failure(extension: &str, error: DecodeError) -> LoadError {
    match error {
        DecodeError::InvalidData { heif_payload: true } if extension == "heic" => {
            LoadError::MissingHevcCodec
        }
        DecodeError::InvalidData { heif_payload: true } if extension == "avif" => {
            LoadError::MissingAv1Codec
        }
        DecodeError::InvalidData { .. } => {
            LoadError::InvalidFile("decoder rejected the data".to_owned())
        }
        DecodeError::Io(e) => LoadError::InvalidFile(e.to_string()),
    }
}
