//! Property sets flowing through the binding.
//!
//! - `PoseProps`: what the owner of a node declares on every render.
//! - `PoserProps`: construction properties handed to the animation engine once.
//! - `ElementProps`: what is forwarded to the host element (and pushed into the
//!   controller on every update).

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::pose::CurrentPose;

/// Ordered string-keyed property map.
pub type PropMap = IndexMap<String, JsonValue>;

/// Notification without payload (pose transition completed).
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn()>);

impl Callback {
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    #[inline]
    pub fn call(&self) {
        (self.0)()
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// Handler receiving a value (animated value change, element change event).
#[derive(Clone)]
pub struct ValueCallback(Rc<dyn Fn(&JsonValue)>);

impl ValueCallback {
    pub fn new(f: impl Fn(&JsonValue) + 'static) -> Self {
        Self(Rc::new(f))
    }

    #[inline]
    pub fn call(&self, value: &JsonValue) {
        (self.0)(value)
    }

    pub fn ptr_eq(&self, other: &ValueCallback) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ValueCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueCallback(..)")
    }
}

/// Host hook receiving the element once it exists.
pub struct RefCallback<E>(Rc<dyn Fn(&E)>);

impl<E> RefCallback<E> {
    pub fn new(f: impl Fn(&E) + 'static) -> Self {
        Self(Rc::new(f))
    }

    #[inline]
    pub fn call(&self, element: &E) {
        (self.0)(element)
    }
}

impl<E> Clone for RefCallback<E> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<E> fmt::Debug for RefCallback<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefCallback(..)")
    }
}

/// Per-value change handlers keyed by value name.
pub type ValueHandlers = IndexMap<String, ValueCallback>;

/// The pre-2.0 `on_change` prop.
///
/// A handler map meant the animated values; a bare handler was always
/// intended for the host element. See `compat::normalize_change_handlers`.
#[derive(Clone, Debug)]
pub enum LegacyOnChange {
    Values(ValueHandlers),
    Element(ValueCallback),
}

/// Declared properties of one pose node.
pub struct PoseProps<E> {
    pub pose: Option<CurrentPose>,
    pub initial_pose: Option<CurrentPose>,
    /// Controller configuration (pose definitions, transitions) passed at construction.
    pub pose_props: PropMap,
    pub on_pose_complete: Option<Callback>,
    pub on_value_change: Option<ValueHandlers>,
    #[deprecated(note = "use `on_value_change` for animated values")]
    pub on_change: Option<LegacyOnChange>,
    pub pop_from_flow: bool,
    pub values: Option<PropMap>,
    pub parent_values: Option<PropMap>,
    pub inner_ref: Option<RefCallback<E>>,
    pub style: PropMap,
    /// Passthrough attributes forwarded verbatim to the element.
    pub attributes: PropMap,
}

#[allow(deprecated)]
impl<E> Default for PoseProps<E> {
    fn default() -> Self {
        Self {
            pose: None,
            initial_pose: None,
            pose_props: PropMap::new(),
            on_pose_complete: None,
            on_value_change: None,
            on_change: None,
            pop_from_flow: false,
            values: None,
            parent_values: None,
            inner_ref: None,
            style: PropMap::new(),
            attributes: PropMap::new(),
        }
    }
}

#[allow(deprecated)]
impl<E> Clone for PoseProps<E> {
    fn clone(&self) -> Self {
        Self {
            pose: self.pose.clone(),
            initial_pose: self.initial_pose.clone(),
            pose_props: self.pose_props.clone(),
            on_pose_complete: self.on_pose_complete.clone(),
            on_value_change: self.on_value_change.clone(),
            on_change: self.on_change.clone(),
            pop_from_flow: self.pop_from_flow,
            values: self.values.clone(),
            parent_values: self.parent_values.clone(),
            inner_ref: self.inner_ref.clone(),
            style: self.style.clone(),
            attributes: self.attributes.clone(),
        }
    }
}

impl<E> fmt::Debug for PoseProps<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoseProps")
            .field("pose", &self.pose)
            .field("initial_pose", &self.initial_pose)
            .field("pose_props", &self.pose_props)
            .field("pop_from_flow", &self.pop_from_flow)
            .field("style", &self.style)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

impl<E> PoseProps<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pose(mut self, pose: impl Into<CurrentPose>) -> Self {
        self.pose = Some(pose.into());
        self
    }

    pub fn with_initial_pose(mut self, pose: impl Into<CurrentPose>) -> Self {
        self.initial_pose = Some(pose.into());
        self
    }

    pub fn with_pose_props(mut self, pose_props: PropMap) -> Self {
        self.pose_props = pose_props;
        self
    }

    pub fn on_pose_complete(mut self, f: impl Fn() + 'static) -> Self {
        self.on_pose_complete = Some(Callback::new(f));
        self
    }

    pub fn popped(mut self, pop_from_flow: bool) -> Self {
        self.pop_from_flow = pop_from_flow;
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.style.insert(key.into(), value.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_inner_ref(mut self, f: impl Fn(&E) + 'static) -> Self {
        self.inner_ref = Some(RefCallback::new(f));
        self
    }
}

/// Construction properties for a controller.
#[derive(Clone, Debug, Default)]
pub struct PoserProps {
    pub config: PropMap,
    pub initial_pose: CurrentPose,
    pub values: Option<PropMap>,
    pub parent_values: Option<PropMap>,
    pub on_change: Option<ValueHandlers>,
}

/// Properties applied to the host element and pushed into the controller.
#[derive(Clone, Debug, Default)]
pub struct ElementProps {
    pub attributes: PropMap,
    pub style: PropMap,
    pub on_change: Option<ValueCallback>,
}
