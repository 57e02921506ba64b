#![allow(dead_code)]
//! Recording animation engine shared by the integration tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use vizij_pose::{
    Attachment, Config, ElementProps, LayoutElement, OffsetBox, PoseController, PoseNode,
    PoseProps, PoserProps, Settle, Settler,
};

/// One call made by the binding into the engine.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Create(String),
    SetProps(String),
    Set(String, String),
    Measure(String),
    AddChild { parent: String, child: String },
    RemoveChild { parent: String, child: String },
    Destroy(String),
}

pub fn create(name: &str) -> Call {
    Call::Create(name.to_string())
}

pub fn set_props(name: &str) -> Call {
    Call::SetProps(name.to_string())
}

pub fn set(name: &str, label: &str) -> Call {
    Call::Set(name.to_string(), label.to_string())
}

pub fn measure(name: &str) -> Call {
    Call::Measure(name.to_string())
}

pub fn add_child(parent: &str, child: &str) -> Call {
    Call::AddChild {
        parent: parent.to_string(),
        child: child.to_string(),
    }
}

pub fn remove_child(parent: &str, child: &str) -> Call {
    Call::RemoveChild {
        parent: parent.to_string(),
        child: child.to_string(),
    }
}

pub fn destroy(name: &str) -> Call {
    Call::Destroy(name.to_string())
}

#[derive(Default)]
struct Journal {
    calls: RefCell<Vec<Call>>,
    settlers: RefCell<Vec<(String, String, Settler)>>,
    construction: RefCell<HashMap<String, PoserProps>>,
    pushed: RefCell<HashMap<String, ElementProps>>,
    auto_settle: Cell<bool>,
}

/// Handle to the shared journal; cheap to clone.
#[derive(Clone, Default)]
pub struct Engine {
    journal: Rc<Journal>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine whose `set` tokens settle immediately.
    pub fn instant() -> Self {
        let engine = Self::default();
        engine.journal.auto_settle.set(true);
        engine
    }

    pub fn calls(&self) -> Vec<Call> {
        self.journal.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.journal.calls.borrow_mut().clear();
    }

    pub fn count(&self, call: &Call) -> usize {
        self.journal
            .calls
            .borrow()
            .iter()
            .filter(|c| *c == call)
            .count()
    }

    pub fn position(&self, call: &Call) -> Option<usize> {
        self.journal.calls.borrow().iter().position(|c| c == call)
    }

    pub fn pending_settles(&self) -> usize {
        self.journal.settlers.borrow().len()
    }

    /// Settle every outstanding pose instruction, oldest first.
    pub fn settle_all(&self) {
        let settlers = std::mem::take(&mut *self.journal.settlers.borrow_mut());
        for (_, _, settler) in settlers {
            settler.settle();
        }
    }

    /// Settle the outstanding instruction for `label` on controller `name`.
    pub fn settle(&self, name: &str, label: &str) {
        let found = {
            let mut settlers = self.journal.settlers.borrow_mut();
            settlers
                .iter()
                .position(|(n, l, _)| n == name && l == label)
                .map(|i| settlers.remove(i))
        };
        if let Some((_, _, settler)) = found {
            settler.settle();
        }
    }

    pub fn construction_props(&self, name: &str) -> Option<PoserProps> {
        self.journal.construction.borrow().get(name).cloned()
    }

    pub fn last_pushed(&self, name: &str) -> Option<ElementProps> {
        self.journal.pushed.borrow().get(name).cloned()
    }

    fn record(&self, call: Call) {
        self.journal.calls.borrow_mut().push(call);
    }

    fn controller(&self, element: &El, props: &PoserProps) -> Mock {
        self.journal
            .construction
            .borrow_mut()
            .insert(element.name.clone(), props.clone());
        Mock {
            name: element.name.clone(),
            engine: self.clone(),
        }
    }

    pub fn root(&self) -> Attachment<Mock> {
        self.root_with_config(Config::default())
    }

    pub fn root_with_config(&self, config: Config) -> Attachment<Mock> {
        let engine = self.clone();
        Attachment::root_with_config(
            move |element: &El, props: &PoserProps| {
                engine.record(Call::Create(element.name.clone()));
                engine.controller(element, props)
            },
            config,
        )
    }
}

/// Host element double with a mutable offset box.
#[derive(Clone, Debug)]
pub struct El {
    pub name: String,
    pub rect: Rc<Cell<Option<OffsetBox>>>,
    pub measurements: Rc<Cell<usize>>,
}

impl El {
    pub fn new(name: &str) -> Self {
        Self::at(name, 0.0, 0.0, 100.0, 50.0)
    }

    pub fn at(name: &str, top: f32, left: f32, width: f32, height: f32) -> Self {
        Self {
            name: name.to_string(),
            rect: Rc::new(Cell::new(Some(OffsetBox {
                top,
                left,
                width,
                height,
            }))),
            measurements: Rc::new(Cell::new(0)),
        }
    }

    pub fn move_to(&self, top: f32, left: f32) {
        if let Some(mut b) = self.rect.get() {
            b.top = top;
            b.left = left;
            self.rect.set(Some(b));
        }
    }
}

impl LayoutElement for El {
    fn offset_box(&self) -> Option<OffsetBox> {
        self.measurements.set(self.measurements.get() + 1);
        self.rect.get()
    }
}

pub struct Mock {
    pub name: String,
    engine: Engine,
}

impl PoseController for Mock {
    type Element = El;

    fn set_transition_props(&mut self, props: &ElementProps) {
        self.engine.record(Call::SetProps(self.name.clone()));
        self.engine
            .journal
            .pushed
            .borrow_mut()
            .insert(self.name.clone(), props.clone());
    }

    fn set(&mut self, label: &str) -> Settle {
        self.engine
            .record(Call::Set(self.name.clone(), label.to_string()));
        if self.engine.journal.auto_settle.get() {
            return Settle::settled();
        }
        let (settle, settler) = Settle::pending();
        self.engine.journal.settlers.borrow_mut().push((
            self.name.clone(),
            label.to_string(),
            settler,
        ));
        settle
    }

    fn measure(&mut self) {
        self.engine.record(Call::Measure(self.name.clone()));
    }

    fn add_child(&mut self, element: &El, props: &PoserProps) -> Mock {
        self.engine.record(Call::AddChild {
            parent: self.name.clone(),
            child: element.name.clone(),
        });
        self.engine.controller(element, props)
    }

    fn remove_child(&mut self, child: &Mock) {
        self.engine.record(Call::RemoveChild {
            parent: self.name.clone(),
            child: child.name.clone(),
        });
    }

    fn destroy(&mut self) {
        self.engine.record(Call::Destroy(self.name.clone()));
    }
}

pub fn props() -> PoseProps<El> {
    PoseProps::new()
}

pub fn child_of(parent: &PoseNode<Mock>, props: PoseProps<El>) -> PoseNode<Mock> {
    PoseNode::new(props, Attachment::child(parent.channel()))
}
