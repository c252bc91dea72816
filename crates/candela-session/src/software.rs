//! Software reference implementation of the renderer service.
//!
//! Good enough for tests and the terminal demo: CPU content-light-level
//! histogram analysis and SDR export. The swap-chain renderer a shell would
//! use implements the same trait on the GPU.

use std::io::Write;

use candela_core::constants::SCRGB_WHITE_NITS;
use candela_core::image::{ImageCll, PixelBuffer};
use candela_core::render::options::RenderOptions;

use crate::services::{ContainerFormat, Renderer, RendererError};

/// Rec. 709 luminance weights.
const LUMA_REC709: [f32; 3] = [0.2126, 0.7152, 0.0722];

// Histogram shape: 400 bins with a gamma of 0.1 measures luminance to
// within 10% error for anything above ~1.5 nits, up to 1 million nits.
const HIST_NUM_BINS: usize = 400;
const HIST_GAMMA: f32 = 0.1;
const HIST_MAX_NITS: f32 = 1_000_000.0;

/// MaxCLL is nominally the single brightest pixel, but the 99.9th
/// percentile is more robust against extreme outliers.
const MAX_CLL_PERCENTILE: f32 = 0.999;

#[derive(Debug, Default)]
pub struct SoftwareRenderer {
    image: Option<PixelBuffer>,
    options: Option<RenderOptions>,
    draw_count: u64,
    resize_count: u64,
}

impl SoftwareRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_options(&self) -> Option<&RenderOptions> {
        self.options.as_ref()
    }

    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }

    pub fn resize_count(&self) -> u64 {
        self.resize_count
    }
}

impl Renderer for SoftwareRenderer {
    fn load_image(&mut self, pixels: &PixelBuffer, compute_cll: bool) -> ImageCll {
        self.image = Some(pixels.clone());
        if compute_cll {
            compute_content_light(pixels)
        } else {
            ImageCll::SENTINEL
        }
    }

    fn set_render_options(&mut self, options: &RenderOptions) {
        tracing::debug!(
            effect = ?options.effect,
            exposure = options.sdr_exposure,
            target_nits = options.effective_display_max_nits(),
            "render options replaced"
        );
        self.options = Some(*options);
    }

    fn create_window_size_dependent_resources(&mut self) {
        self.resize_count += 1;
    }

    fn draw(&mut self) {
        self.draw_count += 1;
    }

    fn export_image_to_sdr(
        &mut self,
        target: &mut dyn Write,
        format: ContainerFormat,
    ) -> Result<(), RendererError> {
        let Some(image) = &self.image else {
            return Err(RendererError::NoImageLoaded);
        };

        // Export always runs with a neutral effect chain at identity
        // exposure; a white-scale clamp stands in for the GPU tonemapper.
        let rgba: Vec<u8> = image
            .pixels
            .iter()
            .flat_map(|px| {
                [
                    encode_srgb(px[0]),
                    encode_srgb(px[1]),
                    encode_srgb(px[2]),
                    (px[3].clamp(0.0, 1.0) * 255.0).round() as u8,
                ]
            })
            .collect();

        match format {
            ContainerFormat::Png => {
                use image::ImageEncoder;
                image::codecs::png::PngEncoder::new(target)
                    .write_image(
                        &rgba,
                        image.width,
                        image.height,
                        image::ExtendedColorType::Rgba8,
                    )
                    .map_err(|e| RendererError::Encode(e.to_string()))?;
            }
            ContainerFormat::Jpeg => {
                let rgb: Vec<u8> = rgba
                    .chunks_exact(4)
                    .flat_map(|px| [px[0], px[1], px[2]])
                    .collect();
                image::codecs::jpeg::JpegEncoder::new(target)
                    .encode(
                        &rgb,
                        image.width,
                        image.height,
                        image::ExtendedColorType::Rgb8,
                    )
                    .map_err(|e| RendererError::Encode(e.to_string()))?;
            }
        }

        Ok(())
    }
}

/// Compute a modified MaxCLL / median CLL from a luminance histogram.
///
/// An all-zero histogram (no pixels, or a driver reporting nothing) yields
/// the sentinel pair.
fn compute_content_light(image: &PixelBuffer) -> ImageCll {
    if image.pixels.is_empty() {
        return ImageCll::SENTINEL;
    }

    let mut histogram = [0.0_f32; HIST_NUM_BINS];
    let weight = 1.0 / image.pixels.len() as f32;

    for px in &image.pixels {
        let nits = (px[0] * LUMA_REC709[0] + px[1] * LUMA_REC709[1] + px[2] * LUMA_REC709[2])
            .max(0.0)
            * SCRGB_WHITE_NITS;
        let bin = ((nits / HIST_MAX_NITS).powf(HIST_GAMMA) * HIST_NUM_BINS as f32) as usize;
        histogram[bin.min(HIST_NUM_BINS - 1)] += weight;
    }

    let mut max_bin = HIST_NUM_BINS - 1;
    let mut med_bin = 0;
    let mut running_sum = 0.0_f32; // Cumulative histogram sums to 1.0.

    // The last bucket is skipped: spurious counts at ~1 million nits show up
    // nondeterministically on some drivers and would hijack MaxCLL.
    for i in (0..HIST_NUM_BINS - 1).rev() {
        running_sum += histogram[i];

        if running_sum < 1.0 - MAX_CLL_PERCENTILE {
            max_bin = i;
        }

        if running_sum > 0.5 {
            // Test patterns can be majority 0 nits, so a median of 0 is valid.
            med_bin = i;
            break;
        }
    }

    let bin_to_nits = |bin: usize| {
        (bin as f32 / HIST_NUM_BINS as f32).powf(1.0 / HIST_GAMMA) * HIST_MAX_NITS
    };

    let max_nits = bin_to_nits(max_bin);
    let med_nits = bin_to_nits(med_bin);

    // Nothing luminous was binned at all: report unknown rather than a
    // fabricated zero.
    if running_sum == 0.0 {
        return ImageCll::SENTINEL;
    }

    ImageCll::new(max_nits, med_nits)
}

/// sRGB OETF per IEC 61966-2-1, with input clamped to [0, 1].
fn encode_srgb(linear: f32) -> u8 {
    let l = linear.clamp(0.0, 1.0);
    let encoded = if l <= 0.003_130_8 {
        l * 12.92
    } else {
        1.055 * l.powf(1.0 / 2.4) - 0.055
    };
    (encoded * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_image(value: f32, count: usize) -> PixelBuffer {
        PixelBuffer::new(count as u32, 1, vec![[value, value, value, 1.0]; count])
    }

    #[test]
    fn test_empty_image_is_sentinel() {
        let cll = compute_content_light(&PixelBuffer::new(0, 0, Vec::new()));
        assert!(cll.is_na());
    }

    #[test]
    fn test_skipped_cll_is_sentinel() {
        let mut renderer = SoftwareRenderer::new();
        let cll = renderer.load_image(&uniform_image(1.0, 16), false);
        assert!(cll.is_na());
    }

    #[test]
    fn test_reference_white_lands_near_80_nits() {
        // scRGB (1,1,1) is 80 nits; binning quantizes within ~10%.
        let cll = compute_content_light(&uniform_image(1.0, 1024));
        assert!(
            (cll.max_nits - SCRGB_WHITE_NITS).abs() < SCRGB_WHITE_NITS * 0.1,
            "max {} nits",
            cll.max_nits
        );
        assert!((cll.med_nits - SCRGB_WHITE_NITS).abs() < SCRGB_WHITE_NITS * 0.1);
    }

    #[test]
    fn test_bright_outlier_is_excluded_from_max() {
        // One pixel at 8000 nits in a 10,000-pixel 80-nit field sits beyond
        // the 99.9th percentile and must not set MaxCLL.
        let mut pixels = vec![[1.0, 1.0, 1.0, 1.0]; 9_999];
        pixels.push([100.0, 100.0, 100.0, 1.0]);
        let cll = compute_content_light(&PixelBuffer::new(10_000, 1, pixels));
        assert!(cll.max_nits < 1000.0, "max {} nits", cll.max_nits);
    }

    #[test]
    fn test_black_image_reports_near_zero() {
        let cll = compute_content_light(&uniform_image(0.0, 256));
        assert!(!cll.is_na());
        assert!(cll.max_nits < 1e-6, "max {} nits", cll.max_nits);
        assert!(cll.med_nits < 1e-6);
    }

    #[test]
    fn test_png_export_round_trips_through_decoder() {
        let mut renderer = SoftwareRenderer::new();
        renderer.load_image(&uniform_image(0.5, 4), false);

        let mut bytes = Vec::new();
        renderer
            .export_image_to_sdr(&mut bytes, ContainerFormat::Png)
            .unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 4);
        assert_eq!(decoded.height(), 1);
    }

    #[test]
    fn test_export_without_image_fails() {
        let mut renderer = SoftwareRenderer::new();
        let mut bytes = Vec::new();
        let err = renderer
            .export_image_to_sdr(&mut bytes, ContainerFormat::Jpeg)
            .unwrap_err();
        assert!(matches!(err, RendererError::NoImageLoaded));
    }
}
