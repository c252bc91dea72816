//! Launch configuration: the validated record produced from command-line
//! activation, consumed read-only by the session.
//!
//! Parsing is tolerant by design: a bad token sets a diagnostic flag and the
//! rest of the configuration still applies. Multiple simultaneous problems
//! accumulate in the flag set without masking each other.

use std::path::PathBuf;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use candela_core::color::{CustomColorSpace, CustomGamma};
use candela_core::render::options::RenderEffectKind;

/// Set of launch-time diagnostics. Flags combine; they never replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LaunchErrorFlags(u32);

impl LaunchErrorFlags {
    pub const INVALID_FILE: Self = Self(1 << 0);
    pub const INVALID_CMD_ARGS: Self = Self(1 << 1);
    pub const NEED_19H1: Self = Self(1 << 2);
    pub const NEED_HEVC: Self = Self(1 << 3);
    pub const NEED_AV1: Self = Self(1 << 4);

    pub fn empty() -> Self {
        Self(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Everything the shell decided at activation time. Produced once, then
/// read-only input to the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchConfiguration {
    pub use_fullscreen: bool,
    pub hide_ui: bool,
    /// Assign BT.2100 to every loaded image.
    pub force_bt2100: bool,
    pub initial_file: Option<PathBuf>,
    pub custom_color_space: Option<CustomColorSpace>,
    /// Effect forced for the session, replacing kind-based defaults.
    pub forced_effect: Option<RenderEffectKind>,
    pub error_flags: LaunchErrorFlags,
    /// File that triggered `INVALID_FILE`, for the diagnostic dialog.
    pub error_filename: Option<String>,
}

const INPUT_PREFIX: &str = "-input:";
const COLOR_PROFILE_PREFIX: &str = "-colorprofile:";
const RENDER_EFFECT_PREFIX: &str = "-rendereffect:";

/// Parse command-line activation arguments.
///
/// The first argument is the executable name and is ignored, so invoking
/// with no arguments succeeds with the default configuration. Matching is
/// ASCII-case-insensitive. Unrecognized tokens set `INVALID_CMD_ARGS`.
pub fn parse_args(args: &[String]) -> LaunchConfiguration {
    let mut config = LaunchConfiguration::default();

    for arg in args.iter().skip(1) {
        if arg.is_empty() {
            continue;
        }

        let lower = arg.to_ascii_lowercase();

        if lower == "-f" {
            config.use_fullscreen = true;
        } else if lower == "-h" {
            config.hide_ui = true;
        } else if lower == "-forcebt2100" {
            config.force_bt2100 = true;
        } else if let Some(path) = lower.strip_prefix(INPUT_PREFIX) {
            // Preserve the original casing of the path itself.
            let path = &arg[arg.len() - path.len()..];
            apply_input_path(&mut config, path);
        } else if let Some(list) = lower.strip_prefix(COLOR_PROFILE_PREFIX) {
            match parse_color_profile(list) {
                Some(space) => config.custom_color_space = Some(space),
                None => config.error_flags.insert(LaunchErrorFlags::INVALID_CMD_ARGS),
            }
        } else if let Some(name) = lower.strip_prefix(RENDER_EFFECT_PREFIX) {
            match parse_effect(name) {
                Some(effect) => config.forced_effect = Some(effect),
                None => config.error_flags.insert(LaunchErrorFlags::INVALID_CMD_ARGS),
            }
        } else {
            config.error_flags.insert(LaunchErrorFlags::INVALID_CMD_ARGS);
        }
    }

    config
}

fn apply_input_path(config: &mut LaunchConfiguration, path: &str) {
    let path_buf = PathBuf::from(path);
    if path_buf.is_file() {
        config.initial_file = Some(path_buf);
    } else {
        config.error_flags.insert(LaunchErrorFlags::INVALID_FILE);
        config.initial_file = None;
        config.error_filename = Some(path.to_owned());
    }
}

/// `<rx>,<ry>,<gx>,<gy>,<bx>,<by>,<wx>,<wy>,<gamma index>`
///
/// Fewer than nine fields or any non-numeric token rejects the whole list.
/// Gamma index 0 selects 2.2, 1 selects linear; any other integer falls back
/// to 2.2.
fn parse_color_profile(list: &str) -> Option<CustomColorSpace> {
    let fields: Vec<&str> = list.split(',').collect();
    if fields.len() < 9 {
        return None;
    }

    let mut values = [0.0_f32; 8];
    for (slot, field) in values.iter_mut().zip(&fields[..8]) {
        *slot = field.trim().parse().ok()?;
    }

    let gamma = match fields[8].trim().parse::<i32>().ok()? {
        1 => CustomGamma::Gamma10,
        _ => CustomGamma::Gamma22,
    };

    Some(CustomColorSpace {
        red: Vec2::new(values[0], values[1]),
        green: Vec2::new(values[2], values[3]),
        blue: Vec2::new(values[4], values[5]),
        white_point: Vec2::new(values[6], values[7]),
        gamma,
    })
}

fn parse_effect(name: &str) -> Option<RenderEffectKind> {
    match name {
        "none" => Some(RenderEffectKind::None),
        "hdrtonemap" => Some(RenderEffectKind::HdrTonemap),
        "sdroverlay" => Some(RenderEffectKind::SdrOverlay),
        "maxluminance" => Some(RenderEffectKind::MaxLuminance),
        "luminanceheatmap" => Some(RenderEffectKind::LuminanceHeatmap),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Vec<String> {
        std::iter::once("candela")
            .chain(tokens.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_no_arguments_is_default() {
        let config = parse_args(&args(&[]));
        assert!(!config.use_fullscreen);
        assert!(!config.hide_ui);
        assert!(config.error_flags.is_empty());
    }

    #[test]
    fn test_simple_flags() {
        let config = parse_args(&args(&["-f", "-h", "-forcebt2100"]));
        assert!(config.use_fullscreen);
        assert!(config.hide_ui);
        assert!(config.force_bt2100);
        assert!(config.error_flags.is_empty());
    }

    #[test]
    fn test_flags_are_case_insensitive() {
        let config = parse_args(&args(&["-F", "-ForceBT2100"]));
        assert!(config.use_fullscreen);
        assert!(config.force_bt2100);
    }

    #[test]
    fn test_color_profile_parses_to_gamma22() {
        let config = parse_args(&args(&[
            "-colorprofile:0.64,0.33,0.30,0.60,0.15,0.06,0.3127,0.3290,0",
        ]));
        let space = config.custom_color_space.expect("profile should parse");
        assert_eq!(space.gamma, CustomGamma::Gamma22);
        assert!((space.red.x - 0.64).abs() < 1e-6);
        assert!((space.white_point.y - 0.3290).abs() < 1e-6);
        assert!(config.error_flags.is_empty());
    }

    #[test]
    fn test_color_profile_gamma_index_one_is_linear() {
        let config = parse_args(&args(&[
            "-colorprofile:0.64,0.33,0.30,0.60,0.15,0.06,0.3127,0.3290,1",
        ]));
        assert_eq!(
            config.custom_color_space.unwrap().gamma,
            CustomGamma::Gamma10
        );
    }

    #[test]
    fn test_color_profile_unknown_gamma_index_falls_back() {
        let config = parse_args(&args(&[
            "-colorprofile:0.64,0.33,0.30,0.60,0.15,0.06,0.3127,0.3290,7",
        ]));
        assert_eq!(
            config.custom_color_space.unwrap().gamma,
            CustomGamma::Gamma22
        );
    }

    #[test]
    fn test_short_color_profile_sets_flag() {
        let config = parse_args(&args(&["-colorprofile:0.64,0.33"]));
        assert!(config.custom_color_space.is_none());
        assert!(config
            .error_flags
            .contains(LaunchErrorFlags::INVALID_CMD_ARGS));
    }

    #[test]
    fn test_non_numeric_color_profile_sets_flag() {
        let config = parse_args(&args(&[
            "-colorprofile:a,b,c,d,e,f,g,h,0",
        ]));
        assert!(config.custom_color_space.is_none());
        assert!(config
            .error_flags
            .contains(LaunchErrorFlags::INVALID_CMD_ARGS));
    }

    #[test]
    fn test_render_effect_names() {
        let cases = [
            ("none", RenderEffectKind::None),
            ("hdrtonemap", RenderEffectKind::HdrTonemap),
            ("sdroverlay", RenderEffectKind::SdrOverlay),
            ("maxluminance", RenderEffectKind::MaxLuminance),
            ("luminanceheatmap", RenderEffectKind::LuminanceHeatmap),
        ];
        for (name, expected) in cases {
            let config = parse_args(&args(&[&format!("-rendereffect:{name}")]));
            assert_eq!(config.forced_effect, Some(expected), "{name}");
        }
    }

    #[test]
    fn test_unknown_render_effect_sets_flag_without_force() {
        let config = parse_args(&args(&["-rendereffect:sepia"]));
        assert_eq!(config.forced_effect, None);
        assert!(config
            .error_flags
            .contains(LaunchErrorFlags::INVALID_CMD_ARGS));
    }

    #[test]
    fn test_unknown_token_does_not_mask_other_flags() {
        let config = parse_args(&args(&[
            "-bogus",
            "-input:/definitely/not/a/real/file.jxr",
            "-f",
        ]));
        assert!(config.error_flags.contains(LaunchErrorFlags::INVALID_CMD_ARGS));
        assert!(config.error_flags.contains(LaunchErrorFlags::INVALID_FILE));
        assert_eq!(
            config.error_filename.as_deref(),
            Some("/definitely/not/a/real/file.jxr")
        );
        // The parseable remainder still applies.
        assert!(config.use_fullscreen);
    }

    #[test]
    fn test_input_of_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sample.png");
        std::fs::write(&file, b"stub").unwrap();

        let token = format!("-input:{}", file.display());
        let config = parse_args(&args(&[&token]));
        assert_eq!(config.initial_file.as_deref(), Some(file.as_path()));
        assert!(config.error_flags.is_empty());
    }

    #[test]
    fn test_flag_set_semantics() {
        let mut flags = LaunchErrorFlags::empty();
        assert!(flags.is_empty());
        flags.insert(LaunchErrorFlags::NEED_HEVC);
        flags.insert(LaunchErrorFlags::NEED_19H1);
        assert!(flags.contains(LaunchErrorFlags::NEED_HEVC));
        assert!(flags.contains(LaunchErrorFlags::NEED_19H1));
        assert!(!flags.contains(LaunchErrorFlags::NEED_AV1));
    }
}
