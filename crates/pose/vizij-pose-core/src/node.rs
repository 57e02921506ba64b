//! Pose node lifecycle.
//!
//! A `PoseNode` binds one host element to one controller:
//!
//! ```text
//! Unattached -> AwaitingController -> Attached -> Unmounting -> Destroyed
//! ```
//!
//! Root nodes build their controller through a `ControllerFactory`. All other
//! nodes register with their ancestor's channel and attach when it answers.
//! On attach a node pushes its element props, flushes children that queued on
//! it, then runs its first transition.
//!
//! State lives behind `Rc<RefCell<..>>` so descendants can reach it through
//! the channel. No borrow is held while a child, the host, or a completion
//! callback runs, so those may call back into the node.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::channel::{ChildRegistration, RegistrationChannel};
use crate::compat::{filter_passthrough, normalize_change_handlers};
use crate::config::Config;
use crate::controller::{ControllerFactory, PoseController};
use crate::error::PoseError;
use crate::pose::{resolve_first_transition_pose, resolve_initial_pose, same_pose, CurrentPose};
use crate::props::{ElementProps, PoseProps, PoserProps, PropMap};
use crate::settle::{join_all, Liveness, Settle};
use crate::snapshot::PopFlowCache;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    Unattached,
    AwaitingController,
    Attached,
    Unmounting,
    Destroyed,
}

/// Where a node gets its controller from.
pub enum Attachment<C: PoseController> {
    /// Top of a controller tree.
    Root {
        factory: Rc<dyn ControllerFactory<C>>,
        config: Rc<Config>,
    },
    /// Registers with the nearest ancestor node.
    Child(Rc<dyn RegistrationChannel<C>>),
}

impl<C: PoseController> Attachment<C> {
    pub fn root(factory: impl ControllerFactory<C> + 'static) -> Self {
        Self::root_with_config(factory, Config::default())
    }

    pub fn root_with_config(factory: impl ControllerFactory<C> + 'static, config: Config) -> Self {
        Attachment::Root {
            factory: Rc::new(factory),
            config: Rc::new(config),
        }
    }

    pub fn child(channel: Rc<dyn RegistrationChannel<C>>) -> Self {
        Attachment::Child(channel)
    }
}

impl<C: PoseController> Clone for Attachment<C> {
    fn clone(&self) -> Self {
        match self {
            Attachment::Root { factory, config } => Attachment::Root {
                factory: Rc::clone(factory),
                config: Rc::clone(config),
            },
            Attachment::Child(channel) => Attachment::Child(Rc::clone(channel)),
        }
    }
}

struct NodeState<C: PoseController> {
    props: PoseProps<C::Element>,
    lifecycle: LifecycleState,
    element: Option<C::Element>,
    controller: Option<C>,
    pending_children: VecDeque<ChildRegistration<C>>,
    /// Set while `flush_children` drains the queue.
    flushing: bool,
    pop_cache: PopFlowCache,
    /// Initial pose the controller was constructed with.
    constructed_initial: Option<CurrentPose>,
    attachment: Attachment<C>,
    config: Rc<Config>,
    live: Liveness,
}

impl<C: PoseController> NodeState<C> {
    fn parent(&self) -> Option<Rc<dyn RegistrationChannel<C>>> {
        match &self.attachment {
            Attachment::Child(channel) => Some(Rc::clone(channel)),
            Attachment::Root { .. } => None,
        }
    }

    /// Props forwarded to the element, including the pop-from-flow snapshot.
    #[allow(deprecated)]
    fn element_props(&mut self) -> ElementProps {
        let handlers =
            normalize_change_handlers(self.props.on_value_change.as_ref(), self.props.on_change.as_ref());
        let mut style = self.props.style.clone();
        if let Some(pop) = self
            .pop_cache
            .resolve(self.props.pop_from_flow, self.element.as_ref())
        {
            pop.apply_to(&mut style);
        }
        ElementProps {
            attributes: filter_passthrough(&self.props.attributes),
            style,
            on_change: handlers.element,
        }
    }

    #[allow(deprecated)]
    fn poser_props(&self, initial_pose: CurrentPose) -> PoserProps {
        let handlers =
            normalize_change_handlers(self.props.on_value_change.as_ref(), self.props.on_change.as_ref());
        PoserProps {
            config: self.props.pose_props.clone(),
            initial_pose,
            values: self.props.values.clone(),
            parent_values: self.props.parent_values.clone(),
            on_change: handlers.values,
        }
    }
}

type Shared<C> = Rc<RefCell<NodeState<C>>>;

fn initial_pose_of<C: PoseController>(state: &Shared<C>) -> CurrentPose {
    let (initial_override, declared, parent) = {
        let s = state.borrow();
        (s.props.initial_pose.clone(), s.props.pose.clone(), s.parent())
    };
    resolve_initial_pose(
        initial_override.as_ref(),
        || parent.and_then(|p| p.initial_pose_from_parent()),
        declared.as_ref(),
    )
}

/// The initial pose the controller was built with, or the one it would be built with now.
fn resolved_initial<C: PoseController>(state: &Shared<C>) -> CurrentPose {
    let constructed = state.borrow().constructed_initial.clone();
    constructed.unwrap_or_else(|| initial_pose_of(state))
}

fn attach<C: PoseController + 'static>(state: &Shared<C>, mut controller: C) {
    let (accepted, parent) = {
        let s = state.borrow();
        (s.live.is_alive() && s.controller.is_none(), s.parent())
    };
    if !accepted {
        warn!("controller delivered to a node that cannot take it; destroying it");
        if let Some(parent) = parent {
            parent.on_unmount(&controller);
        }
        controller.destroy();
        return;
    }

    {
        let mut guard = state.borrow_mut();
        let s = &mut *guard;
        let props = s.element_props();
        controller.set_transition_props(&props);
        s.controller = Some(controller);
        s.lifecycle = LifecycleState::Attached;
    }
    debug!("pose node attached");

    flush_children(state);

    let first = {
        let declared = state.borrow().props.pose.clone();
        resolve_first_transition_pose(declared.as_ref(), &resolved_initial(state))
    };
    if let Some(pose) = first {
        start_transition(state, &pose);
    }
}

/// Drain queued registrations front to back. Registrations arriving while the
/// flush runs join the back of the queue, so order is preserved.
fn flush_children<C: PoseController + 'static>(state: &Shared<C>) {
    {
        let mut s = state.borrow_mut();
        if s.pending_children.is_empty() {
            return;
        }
        debug!("flushing {} queued child registration(s)", s.pending_children.len());
        s.flushing = true;
    }
    loop {
        let next = state.borrow_mut().pending_children.pop_front();
        let Some(registration) = next else {
            break;
        };
        if !registration.is_live() {
            trace!("skipping registration from an unmounted child");
            continue;
        }
        let child = {
            let mut guard = state.borrow_mut();
            match guard.controller.as_mut() {
                Some(controller) => {
                    controller.add_child(&registration.element, &registration.poser_props)
                }
                None => {
                    trace!("controller released during flush; dropping registration");
                    continue;
                }
            }
        };
        registration.complete(child);
    }
    state.borrow_mut().flushing = false;
}

fn start_transition<C: PoseController + 'static>(state: &Shared<C>, pose: &CurrentPose) {
    if pose.is_blank() {
        trace!("pose {pose} has no labels; nothing to do");
        return;
    }
    let (settles, on_complete, live) = {
        let mut guard = state.borrow_mut();
        let s = &mut *guard;
        let Some(controller) = s.controller.as_mut() else {
            return;
        };
        trace!("transition to {pose}");
        let settles: Vec<Settle> = pose.labels().map(|label| controller.set(label)).collect();
        (settles, s.props.on_pose_complete.clone(), s.live.clone())
    };
    join_all(settles, move || {
        if !live.is_alive() {
            trace!("pose settled after unmount; ignoring");
            return;
        }
        if let Some(cb) = on_complete {
            cb.call();
        }
    });
}

fn teardown<C: PoseController>(state: &Shared<C>) {
    let (controller, parent) = {
        let mut s = state.borrow_mut();
        if s.lifecycle == LifecycleState::Destroyed {
            return;
        }
        s.live.kill();
        s.lifecycle = LifecycleState::Unmounting;
        s.pending_children.clear();
        s.pop_cache.clear();
        s.element = None;
        (s.controller.take(), s.parent())
    };

    if let Some(mut controller) = controller {
        if let Some(parent) = parent {
            parent.on_unmount(&controller);
        }
        controller.destroy();
        debug!("pose node destroyed");
    }
    state.borrow_mut().lifecycle = LifecycleState::Destroyed;
}

/// One bound node. Dropping it runs the same teardown as `unmount`.
pub struct PoseNode<C: PoseController> {
    state: Shared<C>,
}

impl<C: PoseController + 'static> PoseNode<C> {
    pub fn new(props: PoseProps<C::Element>, attachment: Attachment<C>) -> Self {
        let config = match &attachment {
            Attachment::Root { config, .. } => Rc::clone(config),
            Attachment::Child(channel) => channel.config(),
        };
        Self {
            state: Rc::new(RefCell::new(NodeState {
                props,
                lifecycle: LifecycleState::Unattached,
                element: None,
                controller: None,
                pending_children: VecDeque::new(),
                flushing: false,
                pop_cache: PopFlowCache::new(),
                constructed_initial: None,
                attachment,
                config,
                live: Liveness::new(),
            })),
        }
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.state.borrow().lifecycle
    }

    pub fn is_attached(&self) -> bool {
        self.lifecycle() == LifecycleState::Attached
    }

    pub fn config(&self) -> Rc<Config> {
        Rc::clone(&self.state.borrow().config)
    }

    /// Channel handed to this node's descendants.
    pub fn channel(&self) -> Rc<dyn RegistrationChannel<C>> {
        Rc::new(NodeChannel {
            state: Rc::downgrade(&self.state),
        })
    }

    /// Number of descendants waiting for this node's controller.
    pub fn pending_children(&self) -> usize {
        self.state.borrow().pending_children.len()
    }

    pub fn initial_pose(&self) -> CurrentPose {
        resolved_initial(&self.state)
    }

    /// Pose the node transitions to on attach, if any.
    pub fn first_transition_pose(&self) -> Option<CurrentPose> {
        let declared = self.state.borrow().props.pose.clone();
        resolve_first_transition_pose(declared.as_ref(), &self.initial_pose())
    }

    /// Controller configuration of the ancestor, if this node has one.
    pub fn parent_pose_props(&self) -> Option<PropMap> {
        let parent = self.state.borrow().parent();
        parent.map(|p| p.parent_pose_props())
    }

    /// Props to apply to the host element for the current render.
    pub fn element_props(&self) -> ElementProps {
        self.state.borrow_mut().element_props()
    }

    /// Run `f` against the controller, if one is attached.
    pub fn with_controller<R>(&self, f: impl FnOnce(&C) -> R) -> Option<R> {
        self.state.borrow().controller.as_ref().map(f)
    }

    /// The host element exists (or never will, when `None`).
    pub fn mount(&self, element: Option<C::Element>) -> Result<(), PoseError> {
        match self.lifecycle() {
            LifecycleState::Unattached => {}
            LifecycleState::Unmounting | LifecycleState::Destroyed => {
                return Err(PoseError::Destroyed)
            }
            state => return Err(PoseError::AlreadyMounted { state }),
        }
        let Some(element) = element else {
            debug!("mounted without an element; node stays unattached");
            return Ok(());
        };

        let inner_ref = {
            let mut s = self.state.borrow_mut();
            s.element = Some(element.clone());
            s.props.inner_ref.clone()
        };
        if let Some(r) = inner_ref {
            r.call(&element);
        }

        let initial = initial_pose_of(&self.state);
        let (poser_props, attachment, live) = {
            let mut s = self.state.borrow_mut();
            s.constructed_initial = Some(initial.clone());
            (s.poser_props(initial), s.attachment.clone(), s.live.clone())
        };

        match attachment {
            Attachment::Root { factory, .. } => {
                debug!("creating root controller");
                let controller = factory.create(&element, &poser_props);
                attach(&self.state, controller);
            }
            Attachment::Child(channel) => {
                self.state.borrow_mut().lifecycle = LifecycleState::AwaitingController;
                let weak = Rc::downgrade(&self.state);
                let registration = ChildRegistration::new(element, poser_props, live, move |c| {
                    match weak.upgrade() {
                        Some(state) => attach(&state, c),
                        None => warn!("controller delivered to a dropped node"),
                    }
                });
                if let Err(err) = channel.register_child(registration) {
                    warn!("registration failed: {err}");
                    self.state.borrow_mut().lifecycle = LifecycleState::Unattached;
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Declared props changed.
    pub fn update(&self, props: PoseProps<C::Element>) -> Result<(), PoseError> {
        let lifecycle = self.lifecycle();
        if matches!(
            lifecycle,
            LifecycleState::Unmounting | LifecycleState::Destroyed
        ) {
            return Err(PoseError::Destroyed);
        }

        let previous_pose = {
            let mut guard = self.state.borrow_mut();
            let s = &mut *guard;
            // Geometry must be captured before the new props are committed.
            if s.config.measures_before(props.pose.as_ref()) {
                if let Some(controller) = s.controller.as_mut() {
                    trace!("measuring before flip");
                    controller.measure();
                }
            }
            std::mem::replace(&mut s.props, props).pose
        };

        if lifecycle != LifecycleState::Attached {
            trace!("props stored; no controller yet");
            return Ok(());
        }

        let retrigger = {
            let mut guard = self.state.borrow_mut();
            let s = &mut *guard;
            let element_props = s.element_props();
            if let Some(controller) = s.controller.as_mut() {
                controller.set_transition_props(&element_props);
            }
            s.props.pose.clone().filter(|pose| {
                !same_pose(Some(pose), previous_pose.as_ref()) || s.config.is_flip(pose)
            })
        };
        if let Some(pose) = retrigger {
            start_transition(&self.state, &pose);
        }
        Ok(())
    }

    /// Tear down. Safe to call in any state; repeated calls are no-ops.
    pub fn unmount(&self) {
        teardown(&self.state);
    }
}

impl<C: PoseController> Drop for PoseNode<C> {
    fn drop(&mut self) {
        let free = self.state.try_borrow_mut().is_ok();
        if free {
            teardown(&self.state);
        } else {
            warn!("pose node dropped while its state was borrowed; skipping teardown");
        }
    }
}

impl<C: PoseController> fmt::Debug for PoseNode<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state.try_borrow() {
            Ok(s) => f
                .debug_struct("PoseNode")
                .field("lifecycle", &s.lifecycle)
                .field("pose", &s.props.pose)
                .field("pending_children", &s.pending_children.len())
                .finish(),
            Err(_) => f.write_str("PoseNode(<borrowed>)"),
        }
    }
}

/// Channel backed by a node. Holds the node weakly.
struct NodeChannel<C: PoseController> {
    state: Weak<RefCell<NodeState<C>>>,
}

impl<C: PoseController + 'static> RegistrationChannel<C> for NodeChannel<C> {
    fn register_child(&self, registration: ChildRegistration<C>) -> Result<(), PoseError> {
        let state = self.state.upgrade().ok_or(PoseError::ChannelClosed)?;
        if !registration.is_live() {
            return Ok(());
        }
        let child = {
            let mut guard = state.borrow_mut();
            let s = &mut *guard;
            if matches!(
                s.lifecycle,
                LifecycleState::Unmounting | LifecycleState::Destroyed
            ) {
                return Err(PoseError::ChannelClosed);
            }
            match s.controller.as_mut() {
                Some(controller) if !s.flushing && s.pending_children.is_empty() => {
                    controller.add_child(&registration.element, &registration.poser_props)
                }
                _ => {
                    s.pending_children.push_back(registration);
                    trace!("child queued ({} pending)", s.pending_children.len());
                    return Ok(());
                }
            }
        };
        registration.complete(child);
        Ok(())
    }

    fn on_unmount(&self, controller: &C) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        let mut s = state.borrow_mut();
        match s.controller.as_mut() {
            Some(parent) => parent.remove_child(controller),
            None => trace!("ancestor already released its controller"),
        }
    }

    fn parent_pose_props(&self) -> PropMap {
        match self.state.upgrade() {
            Some(state) => {
                let s = state.borrow();
                s.props.pose_props.clone()
            }
            None => PropMap::new(),
        }
    }

    fn initial_pose_from_parent(&self) -> Option<CurrentPose> {
        self.state.upgrade().map(|s| resolved_initial(&s))
    }

    fn config(&self) -> Rc<Config> {
        match self.state.upgrade() {
            Some(state) => {
                let s = state.borrow();
                Rc::clone(&s.config)
            }
            None => Rc::new(Config::default()),
        }
    }
}
