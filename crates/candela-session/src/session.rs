//! The session coordinator: the single owner of {current image, current
//! display, current overrides}, reconciling them into render options.
//!
//! This is the ONLY place session state changes. Every handler ends by
//! resolving and forwarding options to the renderer; there is no deferred or
//! batched recomputation.

use std::path::{Path, PathBuf};

use candela_core::display::{AdvancedColorInfo, DisplayStateTracker, DisplayTransition};
use candela_core::image::{ImageCll, ImageInfo};
use candela_core::render::options::{RenderEffectKind, RenderOptions, RenderOverrides};
use candela_core::render::resolve::resolve;

use crate::acquire::{self, AcquireOptions, AcquiredImage};
use crate::error::LoadError;
use crate::launch::LaunchConfiguration;
use crate::services::{ContainerFormat, Renderer, RendererError};

/// The image currently on screen.
#[derive(Debug, Clone)]
pub struct CurrentImage {
    pub info: ImageInfo,
    pub cll: ImageCll,
    /// Display name of the source file.
    pub name: String,
}

/// External events the session responds to. Processed strictly one at a
/// time by a single consumer; no two handlers interleave against the state.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    FileOpened(PathBuf),
    DisplayChanged(AdvancedColorInfo),
    OverrideChanged(OverrideChange),
    WindowResized,
    ExportRequested(PathBuf),
}

/// A single user-override mutation.
#[derive(Debug, Clone, Copy)]
pub enum OverrideChange {
    /// The user picked an effect; this also dissolves a launch-forced one.
    Effect(RenderEffectKind),
    /// Exposure multiplier from the brightness control.
    Exposure(f32),
    /// Experimental display peak-luminance override; `None` disables it.
    DisplayMaxCllOverride(Option<f32>),
}

/// Opaque token tying an in-flight acquisition to the load that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// What became of a completed load.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// The image is now current.
    Applied(ImageInfo),
    /// A newer load superseded this one; the result was discarded.
    Stale,
}

/// Owns the live session state and the renderer service.
pub struct Session<R: Renderer> {
    renderer: R,
    launch: LaunchConfiguration,
    display: DisplayStateTracker,
    image: Option<CurrentImage>,
    overrides: RenderOverrides,
    current_options: Option<RenderOptions>,
    load_generation: u64,
}

impl<R: Renderer> Session<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            launch: LaunchConfiguration::default(),
            display: DisplayStateTracker::new(),
            image: None,
            overrides: RenderOverrides::default(),
            current_options: None,
            load_generation: 0,
        }
    }

    /// Apply the validated launch configuration. Read-only input; the only
    /// session state it seeds is the forced effect and decode options.
    pub fn on_launch(&mut self, config: LaunchConfiguration) {
        if !config.error_flags.is_empty() {
            tracing::warn!(?config.error_flags, "launch configuration carries diagnostics");
        }
        self.overrides.forced_effect = config.forced_effect;
        self.launch = config;
        self.push_render_options();
    }

    pub fn launch(&self) -> &LaunchConfiguration {
        &self.launch
    }

    /// Decode-time options derived from the launch configuration.
    pub fn acquire_options(&self) -> AcquireOptions {
        AcquireOptions {
            force_bt2100: self.launch.force_bt2100,
            custom_color_space: self.launch.custom_color_space,
        }
    }

    /// Start a load. The returned ticket must be handed back to
    /// [`Session::complete_load`]; tickets from superseded loads are
    /// discarded there (latest load wins).
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        LoadTicket(self.load_generation)
    }

    /// Apply a finished acquisition.
    ///
    /// A failed or stale load leaves every piece of prior image-dependent
    /// state exactly as it was: no partial commit.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<AcquiredImage, LoadError>,
        name: &str,
    ) -> Result<LoadOutcome, LoadError> {
        if ticket.0 != self.load_generation {
            tracing::debug!(
                ticket = ticket.0,
                current = self.load_generation,
                "discarding stale load result"
            );
            return Ok(LoadOutcome::Stale);
        }

        let acquired = result?;

        // Upload to the renderer; content light levels are only computed
        // for HDR content and clamped to the sentinel for everything else.
        let compute_cll = acquire::wants_cll(&acquired.info);
        let cll = self.renderer.load_image(&acquired.pixels, compute_cll);
        let cll = acquire::normalize_cll(&acquired.info, cll);

        tracing::info!(
            name,
            kind = %acquired.info.image_kind,
            max_nits = cll.max_nits,
            "image loaded"
        );

        self.image = Some(CurrentImage {
            info: acquired.info,
            cll,
            name: name.to_owned(),
        });

        // A fresh image starts from kind-based defaults; a launch-forced
        // effect stays in force.
        self.overrides.reset_to_defaults();
        self.push_render_options();

        Ok(LoadOutcome::Applied(acquired.info))
    }

    /// A new display snapshot arrived.
    pub fn on_display_changed(&mut self, snapshot: AdvancedColorInfo) {
        match self.display.apply(snapshot) {
            DisplayTransition::Resetting => {
                // Kind changed between SDR/WCG/HDR: previously chosen options
                // may no longer be valid, recompute defaults from scratch.
                tracing::info!(kind = %snapshot.kind, "display kind changed, resetting options");
                self.overrides.reset_to_defaults();
            }
            DisplayTransition::Refreshing => {
                tracing::debug!("display parameters changed, refreshing options");
            }
        }
        self.push_render_options();
    }

    /// The user moved a control.
    pub fn on_override_changed(&mut self, change: OverrideChange) {
        match change {
            OverrideChange::Effect(effect) => {
                self.overrides.effect = Some(effect);
                self.overrides.forced_effect = None;
            }
            OverrideChange::Exposure(multiplier) => {
                self.overrides.exposure = multiplier;
            }
            OverrideChange::DisplayMaxCllOverride(value) => {
                self.overrides.display_max_cll_override = value;
            }
        }
        self.push_render_options();
    }

    /// The window changed size (possibly moving between displays).
    pub fn on_window_resized(&mut self) {
        self.renderer.create_window_size_dependent_resources();
        self.push_render_options();
        self.renderer.draw();
    }

    /// Export the current image to an SDR file; the container format is
    /// chosen by the target's extension.
    pub fn on_export_requested(&mut self, target: &Path) -> Result<(), RendererError> {
        if self.image.is_none() {
            return Err(RendererError::NoImageLoaded);
        }

        let format = ContainerFormat::for_extension(&acquire::normalized_extension(target));
        let mut file = std::fs::File::create(target)?;
        self.renderer.export_image_to_sdr(&mut file, format)?;
        tracing::info!(target = %target.display(), ?format, "exported image to SDR");
        Ok(())
    }

    /// The options most recently forwarded to the renderer.
    pub fn current_render_options(&self) -> Option<&RenderOptions> {
        self.current_options.as_ref()
    }

    pub fn current_image(&self) -> Option<&CurrentImage> {
        self.image.as_ref()
    }

    pub fn overrides(&self) -> &RenderOverrides {
        &self.overrides
    }

    pub fn display(&self) -> &DisplayStateTracker {
        &self.display
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Resolve from current state and hand the renderer a complete
    /// replacement options vector. Meaningless until both an image and a
    /// display snapshot exist.
    fn push_render_options(&mut self) {
        let (Some(image), Some(display)) = (&self.image, self.display.current()) else {
            return;
        };

        let options = resolve(&image.info, image.cll, display, &self.overrides);
        self.renderer.set_render_options(&options);
        self.current_options = Some(options);
        self.renderer.draw();
    }
}
