//! Candela Session — orchestration layer for the display-adaptive viewer.
//!
//! Owns image acquisition (decoder routing, platform gating, failure
//! taxonomy), launch-configuration parsing, and the session coordinator that
//! reconciles {image, display, overrides} into render options for the
//! renderer service.

pub mod acquire;
pub mod error;
pub mod handle;
pub mod image_backend;
pub mod launch;
pub mod services;
pub mod session;
pub mod software;

// Re-exports for convenience.
pub use acquire::{acquire_image, AcquireOptions, AcquiredImage, DecodeRoute};
pub use error::LoadError;
pub use handle::SessionHandle;
pub use launch::{parse_args, LaunchConfiguration, LaunchErrorFlags};
pub use services::{Decoder, PlatformCapabilities, PlatformFeature, Renderer};
pub use session::{Session, SessionEvent};
