//! Exposure adjustment mapping between a linear UI control and the
//! exponential multiplier the renderer consumes.
//!
//! ```text
//! multiplier = 2^slider        slider = log2(multiplier)
//! ```
//!
//! The user sees the multiplier as a percentage; the renderer applies it
//! directly to scene luminance.

/// Convert a linear control position to the exposure multiplier.
pub fn slider_to_exposure(slider: f64) -> f64 {
    2.0_f64.powf(slider)
}

/// Convert an exposure multiplier back to the linear control position.
///
/// The multiplier is clamped to the smallest positive value before the
/// logarithm so a zero or negative input cannot produce a NaN.
pub fn exposure_to_slider(multiplier: f64) -> f64 {
    multiplier.max(f64::MIN_POSITIVE).log2()
}

/// Render the multiplier as the percentage string shown next to the control.
pub fn format_exposure_percent(slider: f64) -> String {
    format!("{:.1}%", slider_to_exposure(slider) * 100.0)
}
