//! The resolved render-options contract between the coordinator and the
//! renderer service, plus the user-override state it is resolved from.

use serde::{Deserialize, Serialize};

use crate::display::AdvancedColorInfo;

/// Render effects inserted into the render pipeline: HDR tonemappers and
/// visual analysis tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderEffectKind {
    /// Pass through unmodified.
    None,
    /// Map HDR luminance into the display's range.
    HdrTonemap,
    /// Draw SDR content as grayscale, HDR highlights in color.
    SdrOverlay,
    /// Clip to the display's maximum luminance.
    MaxLuminance,
    /// False-color luminance visualization.
    LuminanceHeatmap,
}

impl RenderEffectKind {
    /// Descriptive label for UI menus.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::None => "No effect",
            Self::HdrTonemap => "HDR tonemap",
            Self::SdrOverlay => "Draw SDR as grayscale",
            Self::MaxLuminance => "Clip to max luminance",
            Self::LuminanceHeatmap => "Luminance heatmap",
        }
    }

    /// All effects selectable from a shell, in menu order.
    pub fn all() -> &'static [Self] {
        const ALL: [RenderEffectKind; 5] = [
            RenderEffectKind::None,
            RenderEffectKind::HdrTonemap,
            RenderEffectKind::SdrOverlay,
            RenderEffectKind::MaxLuminance,
            RenderEffectKind::LuminanceHeatmap,
        ];
        &ALL
    }
}

/// Mutable override state owned by the session, consumed by the resolver.
///
/// `Default` is the no-override state: kind-based effect defaults apply and
/// exposure is identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderOverrides {
    /// Effect explicitly chosen by the user since the last defaults reset.
    pub effect: Option<RenderEffectKind>,
    /// Exposure multiplier for HDR content. 1.0 = identity.
    pub exposure: f32,
    /// Experimental display peak-luminance override, when enabled.
    pub display_max_cll_override: Option<f32>,
    /// Effect forced by the launch configuration; sticky for the session
    /// until the user explicitly changes the effect control.
    pub forced_effect: Option<RenderEffectKind>,
}

impl Default for RenderOverrides {
    fn default() -> Self {
        Self {
            effect: None,
            exposure: 1.0,
            display_max_cll_override: None,
            forced_effect: None,
        }
    }
}

impl RenderOverrides {
    /// Drop back to kind-based defaults after a resetting display
    /// transition. The launch-forced effect survives; it is cleared only by
    /// an explicit user effect change.
    pub fn reset_to_defaults(&mut self) {
        self.effect = None;
        self.exposure = 1.0;
    }
}

/// The resolved, atomic options vector consumed by the renderer.
///
/// Never partially updated: the resolver produces a complete replacement
/// from current state on every call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub effect: RenderEffectKind,
    /// Exposure multiplier applied to scene luminance.
    pub sdr_exposure: f32,
    /// Display peak-luminance override in nits. 0.0 = no override.
    pub display_max_cll_override_nits: f32,
    /// The display snapshot these options were resolved against.
    pub display: AdvancedColorInfo,
    /// Whether the exposure control is meaningful for the current image.
    /// SDR/WCG correction belongs to the display's own white-level
    /// adjustment, not this pipeline.
    pub exposure_applicable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_overrides_are_identity() {
        let o = RenderOverrides::default();
        assert_eq!(o.effect, None);
        assert_eq!(o.exposure, 1.0);
        assert_eq!(o.display_max_cll_override, None);
        assert_eq!(o.forced_effect, None);
    }

    #[test]
    fn test_reset_keeps_forced_effect() {
        let mut o = RenderOverrides {
            effect: Some(RenderEffectKind::LuminanceHeatmap),
            exposure: 4.0,
            display_max_cll_override: Some(1000.0),
            forced_effect: Some(RenderEffectKind::SdrOverlay),
        };
        o.reset_to_defaults();
        assert_eq!(o.effect, None);
        assert_eq!(o.exposure, 1.0);
        // The experimental override and the launch force are session state.
        assert_eq!(o.display_max_cll_override, Some(1000.0));
        assert_eq!(o.forced_effect, Some(RenderEffectKind::SdrOverlay));
    }

    #[test]
    fn test_effect_labels_cover_menu() {
        assert_eq!(RenderEffectKind::all().len(), 5);
        for e in RenderEffectKind::all() {
            assert!(!e.label().is_empty());
        }
    }
}
