//! Pose values and the pose resolver.
//!
//! A node's pose is either one label or an ordered list of labels. Initial
//! poses compose down the ancestor chain: every ancestor's labels are
//! prepended to the node's own, so a node starts in a state that reflects its
//! full lineage.
//!
//! Equality between pose values is element-wise over the non-empty labels
//! (`CurrentPose::same_labels`). `Single("a")` and `Sequence(["", "a"])` are
//! the same pose; `["a", "b"]` and `["b", "a"]` are not.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PoseError;

/// Opaque name of an animation state. The empty label is treated as absent.
pub type PoseLabel = String;

/// Target state(s) of a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CurrentPose {
    Single(PoseLabel),
    Sequence(Vec<PoseLabel>),
}

impl CurrentPose {
    /// Parse a pose from JSON: either a string or an array of strings.
    pub fn from_json(s: &str) -> Result<Self, PoseError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Labels in order, skipping empty entries.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        let slice: &[PoseLabel] = match self {
            CurrentPose::Single(label) => std::slice::from_ref(label),
            CurrentPose::Sequence(seq) => seq.as_slice(),
        };
        slice.iter().map(String::as_str).filter(|l| !l.is_empty())
    }

    /// Normalise into a sequence. A single label becomes a one-element list.
    pub fn to_sequence(&self) -> Vec<PoseLabel> {
        match self {
            CurrentPose::Single(label) => vec![label.clone()],
            CurrentPose::Sequence(seq) => seq.clone(),
        }
    }

    /// True when no non-empty label remains.
    pub fn is_blank(&self) -> bool {
        self.labels().next().is_none()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels().any(|l| l == label)
    }

    /// True when this is exactly the given single label (not a sequence containing it).
    pub fn is_exactly(&self, label: &str) -> bool {
        matches!(self, CurrentPose::Single(l) if l == label)
    }

    pub fn same_labels(&self, other: &CurrentPose) -> bool {
        self.labels().eq(other.labels())
    }
}

impl Default for CurrentPose {
    fn default() -> Self {
        CurrentPose::Sequence(Vec::new())
    }
}

impl fmt::Display for CurrentPose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrentPose::Single(label) => write!(f, "{label}"),
            CurrentPose::Sequence(seq) => write!(f, "[{}]", seq.join(", ")),
        }
    }
}

impl From<&str> for CurrentPose {
    fn from(label: &str) -> Self {
        CurrentPose::Single(label.to_string())
    }
}

impl From<String> for CurrentPose {
    fn from(label: String) -> Self {
        CurrentPose::Single(label)
    }
}

impl From<Vec<PoseLabel>> for CurrentPose {
    fn from(seq: Vec<PoseLabel>) -> Self {
        CurrentPose::Sequence(seq)
    }
}

impl<'a> FromIterator<&'a str> for CurrentPose {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        CurrentPose::Sequence(iter.into_iter().map(str::to_string).collect())
    }
}

/// Membership test used for flip detection. Absent poses contain nothing.
pub fn has_pose(pose: Option<&CurrentPose>, label: &str) -> bool {
    pose.is_some_and(|p| p.contains(label))
}

/// Two optional poses are equal when both are absent or both carry the same labels.
pub fn same_pose(a: Option<&CurrentPose>, b: Option<&CurrentPose>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.same_labels(b),
        _ => false,
    }
}

/// Compute the pose a node assumes before any transition runs.
///
/// `parent` is only queried when no override is declared. A node without an
/// ancestor passes a provider returning `None`, which contributes an empty
/// sequence, so a root declaring `"visible"` resolves to `["visible"]`.
pub fn resolve_initial_pose<F>(
    initial_override: Option<&CurrentPose>,
    parent: F,
    declared: Option<&CurrentPose>,
) -> CurrentPose
where
    F: FnOnce() -> Option<CurrentPose>,
{
    if let Some(explicit) = initial_override {
        return explicit.clone();
    }

    let mut seq = parent().map(|p| p.to_sequence()).unwrap_or_default();
    if let Some(own) = declared {
        seq.extend(own.to_sequence());
    }
    CurrentPose::Sequence(seq)
}

/// The pose to transition to right after attach, if the node is not already there.
pub fn resolve_first_transition_pose(
    declared: Option<&CurrentPose>,
    initial: &CurrentPose,
) -> Option<CurrentPose> {
    let declared = declared?;
    if declared.is_blank() || declared.same_labels(initial) {
        None
    } else {
        Some(declared.clone())
    }
}
