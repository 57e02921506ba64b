//! Contract with the animation engine.
//!
//! The binding never animates anything itself. It drives controllers through
//! this trait; adapters for a concrete engine (or test doubles) implement it.

use crate::props::{ElementProps, PoserProps};
use crate::settle::Settle;
use crate::snapshot::LayoutElement;

/// One animation controller bound to one host element.
pub trait PoseController: Sized {
    /// Host element handle. Cloning must not clone the underlying element.
    type Element: Clone + LayoutElement + 'static;

    /// Push the latest element props (styles, passthrough values).
    fn set_transition_props(&mut self, props: &ElementProps);

    /// Start moving towards `label`; the token settles when the pose is reached.
    fn set(&mut self, label: &str) -> Settle;

    /// Capture current geometry synchronously, ahead of a layout transition.
    fn measure(&mut self);

    /// Build a controller for a descendant, parented to this one.
    fn add_child(&mut self, element: &Self::Element, props: &PoserProps) -> Self;

    fn remove_child(&mut self, child: &Self);

    fn destroy(&mut self);
}

/// Builds root controllers (nodes without an ancestor channel).
pub trait ControllerFactory<C: PoseController> {
    fn create(&self, element: &C::Element, props: &PoserProps) -> C;
}

impl<C, F> ControllerFactory<C> for F
where
    C: PoseController,
    F: Fn(&C::Element, &PoserProps) -> C,
{
    fn create(&self, element: &C::Element, props: &PoserProps) -> C {
        self(element, props)
    }
}
