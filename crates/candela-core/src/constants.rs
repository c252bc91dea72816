//! Luminance tuning constants shared with the renderer contract.

/// Conservative default for HDR displays that report no peak luminance;
/// prevents egregious behavior on low spec displays.
pub const DEFAULT_HDR_DISPLAY_MAX_NITS: f32 = 600.0;

/// Empirically chosen to produce reasonable results on typical SDR displays.
/// Note that going below this target can produce artifacts in the OS tone
/// mapper.
pub const DEFAULT_SDR_DISPLAY_MAX_NITS: f32 = 300.0;

/// Based on BT.2100 recommended SDR viewing conditions.
pub const DEFAULT_PAPER_WHITE_NITS: f32 = 203.0;

/// Fallback content max light level when none was computed.
pub const DEFAULT_IMAGE_MAX_CLL: f32 = 600.0;

/// Fallback content median light level when none was computed.
pub const DEFAULT_IMAGE_MED_CLL: f32 = 80.0;

/// Luminance of scene-referred scRGB (1.0, 1.0, 1.0) in nits.
pub const SCRGB_WHITE_NITS: f32 = 80.0;
