//! The central decision engine: {image, display, overrides} → RenderOptions.

use crate::color::AdvancedColorKind;
use crate::constants;
use crate::display::AdvancedColorInfo;
use crate::image::{ImageCll, ImageInfo};
use crate::render::options::{RenderEffectKind, RenderOptions, RenderOverrides};

/// Resolve the canonical render options from current session state.
///
/// Deterministic and stateless: the same inputs always yield the same
/// options, so the session can re-run it on every state change and replace
/// the renderer's options atomically.
///
/// Effect precedence: explicit user choice, then the launch-forced effect,
/// then the kind-based default (SDR/WCG view unmodified, HDR must be
/// tonemapped even for an SDR display).
pub fn resolve(
    image: &ImageInfo,
    _cll: ImageCll,
    display: &AdvancedColorInfo,
    overrides: &RenderOverrides,
) -> RenderOptions {
    let default_effect = match image.image_kind {
        AdvancedColorKind::StandardDynamicRange | AdvancedColorKind::WideColorGamut => {
            RenderEffectKind::None
        }
        AdvancedColorKind::HighDynamicRange => RenderEffectKind::HdrTonemap,
    };

    let effect = overrides
        .effect
        .or(overrides.forced_effect)
        .unwrap_or(default_effect);

    // Manual exposure is only meaningful for HDR content; SDR and WCG are
    // corrected by the display's own SDR white level. Forcing identity here
    // keeps a prior HDR exposure from leaking into the next image.
    let exposure_applicable = image.image_kind == AdvancedColorKind::HighDynamicRange;
    let sdr_exposure = if exposure_applicable {
        overrides.exposure
    } else {
        1.0
    };

    RenderOptions {
        effect,
        sdr_exposure,
        display_max_cll_override_nits: overrides.display_max_cll_override.unwrap_or(0.0),
        display: *display,
        exposure_applicable,
    }
}

impl RenderOptions {
    /// The peak luminance the tonemapper should target, in nits.
    ///
    /// Override wins over the reported value; a reported 0 (display gave no
    /// data) falls back to a kind-based default.
    pub fn effective_display_max_nits(&self) -> f32 {
        if self.display_max_cll_override_nits > 0.0 {
            return self.display_max_cll_override_nits;
        }

        if self.display.max_luminance_nits > 0.0 {
            return self.display.max_luminance_nits;
        }

        match self.display.kind {
            AdvancedColorKind::HighDynamicRange => constants::DEFAULT_HDR_DISPLAY_MAX_NITS,
            _ => constants::DEFAULT_SDR_DISPLAY_MAX_NITS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn image_of_kind(kind: AdvancedColorKind) -> ImageInfo {
        ImageInfo {
            bits_per_pixel: 64,
            bits_per_channel: 16,
            is_float: kind == AdvancedColorKind::HighDynamicRange,
            size: Vec2::new(192.0, 108.0),
            num_profiles: 0,
            image_kind: kind,
            force_bt2100_color_space: false,
            is_valid: true,
            is_heif: false,
        }
    }

    fn hdr_display() -> AdvancedColorInfo {
        let mut d = AdvancedColorInfo::with_kind(AdvancedColorKind::HighDynamicRange);
        d.max_luminance_nits = 1499.0;
        d
    }

    #[test]
    fn test_sdr_image_defaults() {
        let opts = resolve(
            &image_of_kind(AdvancedColorKind::StandardDynamicRange),
            ImageCll::SENTINEL,
            &hdr_display(),
            &RenderOverrides::default(),
        );
        assert_eq!(opts.effect, RenderEffectKind::None);
        assert_eq!(opts.sdr_exposure, 1.0);
        assert!(!opts.exposure_applicable);
    }

    #[test]
    fn test_hdr_image_defaults_to_tonemap_on_any_display() {
        for display_kind in [
            AdvancedColorKind::StandardDynamicRange,
            AdvancedColorKind::HighDynamicRange,
        ] {
            let opts = resolve(
                &image_of_kind(AdvancedColorKind::HighDynamicRange),
                ImageCll::new(604.0, 80.0),
                &AdvancedColorInfo::with_kind(display_kind),
                &RenderOverrides::default(),
            );
            assert_eq!(opts.effect, RenderEffectKind::HdrTonemap);
            assert!(opts.exposure_applicable);
        }
    }

    #[test]
    fn test_prior_hdr_exposure_does_not_leak_into_sdr() {
        let overrides = RenderOverrides {
            exposure: 8.0,
            ..Default::default()
        };
        let opts = resolve(
            &image_of_kind(AdvancedColorKind::WideColorGamut),
            ImageCll::SENTINEL,
            &hdr_display(),
            &overrides,
        );
        assert_eq!(opts.sdr_exposure, 1.0);
        assert!(!opts.exposure_applicable);
    }

    #[test]
    fn test_user_choice_beats_forced_effect() {
        let overrides = RenderOverrides {
            effect: Some(RenderEffectKind::LuminanceHeatmap),
            forced_effect: Some(RenderEffectKind::SdrOverlay),
            ..Default::default()
        };
        let opts = resolve(
            &image_of_kind(AdvancedColorKind::HighDynamicRange),
            ImageCll::SENTINEL,
            &hdr_display(),
            &overrides,
        );
        assert_eq!(opts.effect, RenderEffectKind::LuminanceHeatmap);
    }

    #[test]
    fn test_forced_effect_beats_default() {
        let overrides = RenderOverrides {
            forced_effect: Some(RenderEffectKind::MaxLuminance),
            ..Default::default()
        };
        let opts = resolve(
            &image_of_kind(AdvancedColorKind::HighDynamicRange),
            ImageCll::SENTINEL,
            &hdr_display(),
            &overrides,
        );
        assert_eq!(opts.effect, RenderEffectKind::MaxLuminance);
    }

    #[test]
    fn test_disabled_override_resolves_to_no_override() {
        let opts = resolve(
            &image_of_kind(AdvancedColorKind::HighDynamicRange),
            ImageCll::SENTINEL,
            &hdr_display(),
            &RenderOverrides::default(),
        );
        // Must be the sentinel, not the display's real peak luminance.
        assert_eq!(opts.display_max_cll_override_nits, 0.0);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let image = image_of_kind(AdvancedColorKind::HighDynamicRange);
        let display = hdr_display();
        let overrides = RenderOverrides {
            effect: Some(RenderEffectKind::SdrOverlay),
            exposure: 2.0,
            ..Default::default()
        };
        let a = resolve(&image, ImageCll::SENTINEL, &display, &overrides);
        let b = resolve(&image, ImageCll::SENTINEL, &display, &overrides);
        assert_eq!(a, b);
    }

    #[test]
    fn test_effective_max_nits_precedence() {
        let mut opts = resolve(
            &image_of_kind(AdvancedColorKind::HighDynamicRange),
            ImageCll::SENTINEL,
            &hdr_display(),
            &RenderOverrides::default(),
        );
        assert_eq!(opts.effective_display_max_nits(), 1499.0);

        opts.display_max_cll_override_nits = 800.0;
        assert_eq!(opts.effective_display_max_nits(), 800.0);

        opts.display_max_cll_override_nits = 0.0;
        opts.display.max_luminance_nits = 0.0;
        assert_eq!(opts.effective_display_max_nits(), 600.0);

        opts.display.kind = AdvancedColorKind::StandardDynamicRange;
        assert_eq!(opts.effective_display_max_nits(), 300.0);
    }
}
