//! Image metadata and pixel representation for the viewing pipeline.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::color::AdvancedColorKind;

/// Metadata for one decode attempt. Produced once per load, immutable,
/// replaced wholesale by the next load.
///
/// When `is_valid` is false every other field is meaningless except
/// `is_heif`, which stays authoritative for error classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub bits_per_pixel: u32,
    pub bits_per_channel: u32,
    pub is_float: bool,
    /// Pixel dimensions.
    pub size: Vec2,
    /// Count of embedded color profiles.
    pub num_profiles: u32,
    pub image_kind: AdvancedColorKind,
    /// The image is assigned the HDR10/BT.2100 color space regardless of
    /// embedded metadata (HEIF HDR10, Xbox screenshots, or a launch override).
    pub force_bt2100_color_space: bool,
    pub is_valid: bool,
    /// True for the HEIF/AVIF container family.
    pub is_heif: bool,
}

impl ImageInfo {
    /// An invalid placeholder carrying only the HEIF-family flag.
    pub fn invalid(is_heif: bool) -> Self {
        Self {
            bits_per_pixel: 0,
            bits_per_channel: 0,
            is_float: false,
            size: Vec2::ZERO,
            num_profiles: 0,
            image_kind: AdvancedColorKind::StandardDynamicRange,
            force_bt2100_color_space: false,
            is_valid: false,
            is_heif,
        }
    }
}

/// Content light level statistics for an HDR image, in nits.
///
/// `-1.0` is the "not computed / not applicable" sentinel and is distinct
/// from a legitimately computed `0.0`. Both fields are either computed or
/// both the sentinel, never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageCll {
    pub max_nits: f32,
    pub med_nits: f32,
}

impl ImageCll {
    /// The uncomputed / not-applicable pair.
    pub const SENTINEL: Self = Self {
        max_nits: -1.0,
        med_nits: -1.0,
    };

    pub fn new(max_nits: f32, med_nits: f32) -> Self {
        Self { max_nits, med_nits }
    }

    /// Whether the values should present as "N/A".
    ///
    /// The threshold is strictly negative: a computed 0.0 (fully black
    /// image) is a valid measurement.
    pub fn is_na(&self) -> bool {
        self.max_nits < 0.0
    }
}

impl Default for ImageCll {
    fn default() -> Self {
        Self::SENTINEL
    }
}

/// Decoded pixels handed from acquisition to the renderer service.
///
/// Always RGBA f32, scene-referred linear (scRGB: 1.0 = 80 nits).
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 4]>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, pixels: Vec<[f32; 4]>) -> Self {
        debug_assert_eq!((width * height) as usize, pixels.len());
        Self {
            width,
            height,
            pixels,
        }
    }
}
