//! Error types for host-side misuse of the pose binding.
//!
//! The registration protocol itself never fails; these errors only surface when
//! the rendering host drives a node out of order or hands in malformed data.

use crate::node::LifecycleState;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum PoseError {
    /// `mount` was called on a node that already left `Unattached`.
    #[error("node already mounted (state: {state:?})")]
    AlreadyMounted { state: LifecycleState },

    /// A lifecycle call arrived after the node was torn down.
    #[error("node has been destroyed")]
    Destroyed,

    /// The ancestor that owned the registration channel no longer exists.
    #[error("registration channel is closed: ancestor was dropped")]
    ChannelClosed,

    /// Pose value could not be decoded.
    #[error("invalid pose: {reason}")]
    InvalidPose { reason: String },
}

impl PoseError {
    /// Error category for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::AlreadyMounted { .. } | Self::Destroyed => "lifecycle",
            Self::ChannelClosed => "registration",
            Self::InvalidPose { .. } => "validation",
        }
    }
}

impl From<serde_json::Error> for PoseError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPose {
            reason: err.to_string(),
        }
    }
}
