//! Tree-wide configuration for the pose binding.
//!
//! A `Config` is supplied once, on the root attachment, and every descendant
//! reads the same value back through its registration channel.

use serde::{Deserialize, Serialize};

use crate::pose::{has_pose, CurrentPose};

/// Default reserved label that triggers a geometry capture before the next push.
pub const DEFAULT_FLIP_LABEL: &str = "flip";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reserved pose label for layout (FLIP) transitions.
    pub flip_label: String,
    /// When false, flip updates skip `PoseController::measure`.
    pub measure_on_flip: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flip_label: DEFAULT_FLIP_LABEL.to_string(),
            measure_on_flip: true,
        }
    }
}

impl Config {
    /// Whether an update carrying `pose` must capture geometry before its props land.
    pub fn measures_before(&self, pose: Option<&CurrentPose>) -> bool {
        self.measure_on_flip && has_pose(pose, &self.flip_label)
    }

    /// Exactly the flip label. Such a pose re-runs its transition even when unchanged.
    #[inline]
    pub fn is_flip(&self, pose: &CurrentPose) -> bool {
        !self.flip_label.is_empty() && pose.is_exactly(&self.flip_label)
    }
}
