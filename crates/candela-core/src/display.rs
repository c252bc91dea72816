//! Display advanced-color state and change reconciliation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::color::AdvancedColorKind;

/// Snapshot of the display's advanced-color capability, pushed in by the
/// display subsystem on every change event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdvancedColorInfo {
    pub kind: AdvancedColorKind,
    /// Peak luminance in nits. 0 means the display provided no valid data.
    pub max_luminance_nits: f32,
    /// Luminance of SDR reference white on this display, in nits.
    pub sdr_white_level_nits: f32,
    pub red_primary: Vec2,
    pub green_primary: Vec2,
    pub blue_primary: Vec2,
    pub white_point: Vec2,
}

impl AdvancedColorInfo {
    /// A snapshot with Rec.709 primaries and D65 white.
    pub fn with_kind(kind: AdvancedColorKind) -> Self {
        Self {
            kind,
            max_luminance_nits: 0.0,
            sdr_white_level_nits: 80.0,
            red_primary: Vec2::new(0.64, 0.33),
            green_primary: Vec2::new(0.30, 0.60),
            blue_primary: Vec2::new(0.15, 0.06),
            white_point: Vec2::new(0.3127, 0.3290),
        }
    }
}

/// How an incoming display snapshot relates to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayTransition {
    /// The advanced-color kind changed (or this is the first snapshot):
    /// all render options must be recomputed from defaults, discarding
    /// non-default user overrides.
    Resetting,
    /// Only peak luminance or white level changed: re-resolve with the same
    /// override state.
    Refreshing,
}

/// Retains the latest display snapshot plus the immediately-previous kind.
#[derive(Debug, Clone, Default)]
pub struct DisplayStateTracker {
    current: Option<AdvancedColorInfo>,
    previous_kind: Option<AdvancedColorKind>,
}

impl DisplayStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new snapshot and report how it must be reconciled.
    pub fn apply(&mut self, snapshot: AdvancedColorInfo) -> DisplayTransition {
        let transition = match &self.current {
            None => DisplayTransition::Resetting,
            Some(old) if old.kind != snapshot.kind => DisplayTransition::Resetting,
            Some(_) => DisplayTransition::Refreshing,
        };

        self.previous_kind = self.current.map(|c| c.kind);
        self.current = Some(snapshot);
        transition
    }

    pub fn current(&self) -> Option<&AdvancedColorInfo> {
        self.current.as_ref()
    }

    pub fn previous_kind(&self) -> Option<AdvancedColorKind> {
        self.previous_kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_snapshot_resets() {
        let mut tracker = DisplayStateTracker::new();
        let t = tracker.apply(AdvancedColorInfo::with_kind(
            AdvancedColorKind::StandardDynamicRange,
        ));
        assert_eq!(t, DisplayTransition::Resetting);
        assert!(tracker.current().is_some());
        assert_eq!(tracker.previous_kind(), None);
    }

    #[test]
    fn test_kind_change_resets() {
        let mut tracker = DisplayStateTracker::new();
        tracker.apply(AdvancedColorInfo::with_kind(
            AdvancedColorKind::StandardDynamicRange,
        ));
        let t = tracker.apply(AdvancedColorInfo::with_kind(
            AdvancedColorKind::HighDynamicRange,
        ));
        assert_eq!(t, DisplayTransition::Resetting);
        assert_eq!(
            tracker.previous_kind(),
            Some(AdvancedColorKind::StandardDynamicRange)
        );
    }

    #[test]
    fn test_luminance_only_change_refreshes() {
        let mut tracker = DisplayStateTracker::new();
        let mut snap = AdvancedColorInfo::with_kind(AdvancedColorKind::HighDynamicRange);
        snap.max_luminance_nits = 600.0;
        tracker.apply(snap);

        snap.max_luminance_nits = 1000.0;
        snap.sdr_white_level_nits = 240.0;
        let t = tracker.apply(snap);
        assert_eq!(t, DisplayTransition::Refreshing);
        assert_eq!(tracker.current().unwrap().max_luminance_nits, 1000.0);
    }
}
