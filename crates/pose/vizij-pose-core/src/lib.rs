//! vizij-pose-core
//!
//! Binds a declaratively rendered tree of pose nodes to an imperatively driven
//! tree of animation controllers.
//!
//! Controllers can only be built once a node's element exists and once its
//! ancestor has a controller to parent it to. Mount notifications arrive
//! child-first, so children register through their ancestor's
//! [`RegistrationChannel`] and are attached, in registration order, when the
//! ancestor attaches.
//!
//! Everything here is single-threaded: the host renderer drives
//! [`PoseNode::mount`], [`PoseNode::update`] and [`PoseNode::unmount`] from its
//! UI thread, and the animation engine resolves [`Settle`] tokens from the same
//! thread.

pub mod channel;
pub mod compat;
pub mod config;
pub mod controller;
pub mod error;
pub mod node;
pub mod pose;
pub mod props;
pub mod settle;
pub mod snapshot;

pub use channel::{ChildRegistration, RegistrationChannel};
pub use config::Config;
pub use controller::{ControllerFactory, PoseController};
pub use error::PoseError;
pub use node::{Attachment, LifecycleState, PoseNode};
pub use pose::{
    has_pose, resolve_first_transition_pose, resolve_initial_pose, CurrentPose, PoseLabel,
};
pub use props::{
    Callback, ElementProps, LegacyOnChange, PoseProps, PoserProps, PropMap, RefCallback,
    ValueCallback, ValueHandlers,
};
pub use settle::{join_all, Liveness, Settle, Settler};
pub use snapshot::{compute_snapshot, LayoutElement, OffsetBox, PopFlowCache, PopStyle};
