//! Advanced-color classification of decoded images.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Color capability classification shared by images and displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdvancedColorKind {
    /// Standard dynamic range, sRGB-class gamut.
    StandardDynamicRange,
    /// Wide color gamut at standard dynamic range.
    WideColorGamut,
    /// High dynamic range.
    HighDynamicRange,
}

impl AdvancedColorKind {
    /// Human-readable label for status text and shells.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::StandardDynamicRange => "SDR",
            Self::WideColorGamut => "WCG",
            Self::HighDynamicRange => "HDR",
        }
    }
}

impl fmt::Display for AdvancedColorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a decoded image from its raw decoder metadata.
///
/// Total function: metadata that matches no rule falls through to
/// `StandardDynamicRange`. Rules, lowest to highest precedence:
///
/// - bit depth > 8bpc or an embedded color profile approximates wide gamut
/// - floating-point pixel data is HDR (JPEG XR, OpenEXR, Radiance RGBE)
/// - an HDR10/BT.2100 color space assignment is HDR regardless of the rest
pub fn classify(
    bits_per_channel: u32,
    num_profiles: u32,
    is_float: bool,
    force_bt2100: bool,
) -> AdvancedColorKind {
    let mut kind = AdvancedColorKind::StandardDynamicRange;

    if bits_per_channel > 8 || num_profiles >= 1 {
        kind = AdvancedColorKind::WideColorGamut;
    }

    if is_float {
        kind = AdvancedColorKind::HighDynamicRange;
    }

    if force_bt2100 {
        kind = AdvancedColorKind::HighDynamicRange;
    }

    kind
}

/// Transfer function selector for a caller-supplied color space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomGamma {
    /// 2.2 power-law gamma.
    Gamma22,
    /// Linear (1.0) gamma.
    Gamma10,
}

/// A caller-specified source color space, overriding embedded metadata.
///
/// Chromaticities are CIE xy coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomColorSpace {
    pub red: Vec2,
    pub green: Vec2,
    pub blue: Vec2,
    pub white_point: Vec2,
    pub gamma: CustomGamma,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_8bpc_is_sdr() {
        assert_eq!(
            classify(8, 0, false, false),
            AdvancedColorKind::StandardDynamicRange
        );
    }

    #[test]
    fn test_deep_or_profiled_is_wcg() {
        assert_eq!(classify(16, 0, false, false), AdvancedColorKind::WideColorGamut);
        assert_eq!(classify(8, 1, false, false), AdvancedColorKind::WideColorGamut);
    }

    #[test]
    fn test_float_is_hdr() {
        assert_eq!(
            classify(16, 0, true, false),
            AdvancedColorKind::HighDynamicRange
        );
    }

    #[test]
    fn test_bt2100_wins_over_everything() {
        // 10bpc integer HDR10, no profile: only the BT.2100 flag makes it HDR.
        assert_eq!(
            classify(10, 0, false, true),
            AdvancedColorKind::HighDynamicRange
        );
        assert_eq!(
            classify(8, 0, false, true),
            AdvancedColorKind::HighDynamicRange
        );
    }

    #[test]
    fn test_degenerate_metadata_is_sdr() {
        // Zeroed metadata must classify, not fail.
        assert_eq!(
            classify(0, 0, false, false),
            AdvancedColorKind::StandardDynamicRange
        );
    }
}
