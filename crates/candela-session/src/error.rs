//! Typed acquisition failures.
//!
//! Every variant is recoverable at the session level: a failed load leaves
//! the previously displayed image untouched.

/// Why an image could not be acquired.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Decode rejected the data or the file is inaccessible.
    #[error("unable to load image: {0}")]
    InvalidFile(String),

    /// The platform predates the HEIF/AVIF capability gate; no decode was
    /// attempted.
    #[error("this image format requires a newer OS version")]
    PlatformTooOld,

    /// HEIF-family payload in a `.heic` file but no HEVC decoder installed.
    #[error("the HEVC codec required for this image is not installed")]
    MissingHevcCodec,

    /// HEIF-family payload in an `.avif` file but no AV1 decoder installed.
    #[error("the AV1 codec required for this image is not installed")]
    MissingAv1Codec,
}

impl LoadError {
    /// User-facing guidance a shell can show next to the error.
    pub fn remediation(&self) -> &'static str {
        match self {
            Self::InvalidFile(_) => {
                "The file may be corrupt or use an unsupported format."
            }
            Self::PlatformTooOld => {
                "HEIF and AVIF images require a newer operating system version."
            }
            Self::MissingHevcCodec => {
                "Install the HEVC Video Extensions to view HEIC images."
            }
            Self::MissingAv1Codec => {
                "Install the AV1 Video Extension to view AVIF images."
            }
        }
    }
}
