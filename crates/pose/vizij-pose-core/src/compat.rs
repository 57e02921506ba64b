//! Legacy prop handling.
//!
//! Older callers passed value-change handlers through `on_change`; the current
//! prop is `on_value_change`, and `on_change` is reserved for a handler on the
//! host element itself. This module maps the old shape onto the new one and
//! keeps binding-only keys out of the element's passthrough attributes.

use log::debug;

use crate::props::{LegacyOnChange, PropMap, ValueCallback, ValueHandlers};

/// Keys that configure the binding and must never reach the host element.
pub const RESERVED_PROPS: &[&str] = &[
    "pose",
    "initial_pose",
    "pose_props",
    "on_pose_complete",
    "on_value_change",
    "on_change",
    "pop_from_flow",
    "values",
    "parent_values",
    "inner_ref",
    "style",
];

/// Change handlers after legacy normalisation.
#[derive(Clone, Debug, Default)]
pub struct ChangeHandlers {
    /// Handlers for animated values, passed to the controller at construction.
    pub values: Option<ValueHandlers>,
    /// Handler forwarded to the host element.
    pub element: Option<ValueCallback>,
}

/// Resolve `on_value_change` and the deprecated `on_change` into one set.
///
/// `on_value_change` wins when both carry value handlers.
pub fn normalize_change_handlers(
    on_value_change: Option<&ValueHandlers>,
    legacy: Option<&LegacyOnChange>,
) -> ChangeHandlers {
    match legacy {
        Some(LegacyOnChange::Values(handlers)) => {
            if on_value_change.is_none() {
                debug!("on_change with value handlers is deprecated; use on_value_change");
            }
            ChangeHandlers {
                values: on_value_change.or(Some(handlers)).cloned(),
                element: None,
            }
        }
        Some(LegacyOnChange::Element(handler)) => ChangeHandlers {
            values: on_value_change.cloned(),
            element: Some(handler.clone()),
        },
        None => ChangeHandlers {
            values: on_value_change.cloned(),
            element: None,
        },
    }
}

/// Copy `attributes` without the reserved binding keys.
pub fn filter_passthrough(attributes: &PropMap) -> PropMap {
    attributes
        .iter()
        .filter(|(k, _)| !RESERVED_PROPS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
