//! Registration channel between a node and its descendants.
//!
//! Rendering runs parent-first but mount notifications arrive child-first, so
//! a descendant may ask for a controller before its ancestor has one. The
//! channel queues such requests and answers them once the ancestor attaches.

use std::fmt;
use std::rc::Rc;

use crate::config::Config;
use crate::controller::PoseController;
use crate::error::PoseError;
use crate::pose::CurrentPose;
use crate::props::{PoserProps, PropMap};
use crate::settle::Liveness;

type OnRegistered<C> = Box<dyn FnOnce(C)>;

/// A descendant's request for a controller.
pub struct ChildRegistration<C: PoseController> {
    pub element: C::Element,
    pub poser_props: PoserProps,
    on_registered: OnRegistered<C>,
    live: Liveness,
}

impl<C: PoseController> ChildRegistration<C> {
    pub fn new(
        element: C::Element,
        poser_props: PoserProps,
        live: Liveness,
        on_registered: impl FnOnce(C) + 'static,
    ) -> Self {
        Self {
            element,
            poser_props,
            on_registered: Box::new(on_registered),
            live,
        }
    }

    /// False once the requesting node was unmounted; such requests are dropped.
    pub fn is_live(&self) -> bool {
        self.live.is_alive()
    }

    /// Hand the newly built controller to the requesting node.
    pub fn complete(self, controller: C) {
        (self.on_registered)(controller)
    }
}

impl<C: PoseController> fmt::Debug for ChildRegistration<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildRegistration")
            .field("poser_props", &self.poser_props)
            .field("live", &self.is_live())
            .finish_non_exhaustive()
    }
}

/// Capabilities an ancestor exposes to its descendants.
pub trait RegistrationChannel<C: PoseController> {
    /// Build the child's controller now if the ancestor is attached, otherwise queue it.
    fn register_child(&self, registration: ChildRegistration<C>) -> Result<(), PoseError>;

    /// Detach `controller` from the ancestor's controller.
    fn on_unmount(&self, controller: &C);

    /// The ancestor's controller configuration.
    fn parent_pose_props(&self) -> PropMap;

    /// The ancestor's resolved initial pose, or `None` if it is gone.
    fn initial_pose_from_parent(&self) -> Option<CurrentPose>;

    fn config(&self) -> Rc<Config>;
}
