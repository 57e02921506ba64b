//! Positional snapshot for popping a node out of normal flow.
//!
//! When a node is popped it is re-anchored with absolute positioning at the
//! box it last occupied, so it does not collapse while it animates out.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Offset box of an element relative to its offset parent.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OffsetBox {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

/// Host elements that can report their layout box.
///
/// Elements that have no offset box (e.g. vector graphics primitives) return
/// `None` and are never popped.
pub trait LayoutElement {
    fn offset_box(&self) -> Option<OffsetBox>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Absolute,
}

/// Style applied to a popped node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopStyle {
    pub position: Position,
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

impl PopStyle {
    pub fn from_box(b: OffsetBox) -> Self {
        Self {
            position: Position::Absolute,
            top: b.top,
            left: b.left,
            width: b.width,
            height: b.height,
        }
    }

    /// Overlay this snapshot on a style map; snapshot keys win.
    pub fn apply_to(&self, style: &mut IndexMap<String, JsonValue>) {
        style.insert("position".into(), JsonValue::from("absolute"));
        style.insert("top".into(), JsonValue::from(self.top));
        style.insert("left".into(), JsonValue::from(self.left));
        style.insert("width".into(), JsonValue::from(self.width));
        style.insert("height".into(), JsonValue::from(self.height));
    }
}

/// Measure `element` and build its absolute-positioning style.
pub fn compute_snapshot<E: LayoutElement + ?Sized>(element: &E) -> Option<PopStyle> {
    element.offset_box().map(PopStyle::from_box)
}

/// Cached snapshot for one node.
#[derive(Clone, Debug, Default)]
pub struct PopFlowCache {
    cached: Option<PopStyle>,
}

impl PopFlowCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the pop style for the current render.
    ///
    /// While `popped` stays true the first measurement is reused; leaving pop
    /// mode clears the cache so the next entry measures again.
    pub fn resolve<E: LayoutElement + ?Sized>(
        &mut self,
        popped: bool,
        element: Option<&E>,
    ) -> Option<&PopStyle> {
        if !popped {
            self.cached = None;
            return None;
        }
        if self.cached.is_none() {
            self.cached = element.and_then(compute_snapshot);
        }
        self.cached.as_ref()
    }

    pub fn cached(&self) -> Option<&PopStyle> {
        self.cached.as_ref()
    }

    pub fn clear(&mut self) {
        self.cached = None;
    }
}
