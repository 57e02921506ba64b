//! Single-threaded completion tokens.
//!
//! `PoseController::set` returns a `Settle` that the animation engine resolves
//! through the paired `Settler` once the pose has been reached. Nothing here
//! blocks: waiters run on the thread that calls `Settler::settle`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Waiter = Box<dyn FnOnce()>;

#[derive(Default)]
struct SettleState {
    settled: bool,
    waiters: Vec<Waiter>,
}

/// Completion token for one pose instruction.
#[derive(Clone)]
pub struct Settle {
    state: Rc<RefCell<SettleState>>,
}

/// Engine-side handle that resolves a `Settle`.
pub struct Settler {
    state: Rc<RefCell<SettleState>>,
}

impl Settle {
    /// A pending token and the handle that resolves it.
    pub fn pending() -> (Settle, Settler) {
        let state = Rc::new(RefCell::new(SettleState::default()));
        (
            Settle {
                state: Rc::clone(&state),
            },
            Settler { state },
        )
    }

    /// An already-resolved token (engines that apply poses instantly).
    pub fn settled() -> Settle {
        Settle {
            state: Rc::new(RefCell::new(SettleState {
                settled: true,
                waiters: Vec::new(),
            })),
        }
    }

    pub fn is_settled(&self) -> bool {
        self.state.borrow().settled
    }

    /// Run `f` once settled; immediately if that already happened.
    pub fn on_settled(&self, f: impl FnOnce() + 'static) {
        {
            let mut state = self.state.borrow_mut();
            if !state.settled {
                state.waiters.push(Box::new(f));
                return;
            }
        }
        f();
    }
}

impl std::fmt::Debug for Settle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settle")
            .field("settled", &self.is_settled())
            .finish()
    }
}

impl Settler {
    /// Resolve the token. Waiters run after the internal borrow is released.
    pub fn settle(self) {
        let waiters = {
            let mut state = self.state.borrow_mut();
            state.settled = true;
            std::mem::take(&mut state.waiters)
        };
        for w in waiters {
            w();
        }
    }
}

/// Run `done` once every token has settled. An empty list completes at once.
pub fn join_all(settles: Vec<Settle>, done: impl FnOnce() + 'static) {
    if settles.is_empty() {
        done();
        return;
    }
    let remaining = Rc::new(Cell::new(settles.len()));
    let done: Rc<RefCell<Option<Waiter>>> = Rc::new(RefCell::new(Some(Box::new(done))));
    for settle in settles {
        let remaining = Rc::clone(&remaining);
        let done = Rc::clone(&done);
        settle.on_settled(move || {
            remaining.set(remaining.get() - 1);
            if remaining.get() == 0 {
                let f = done.borrow_mut().take();
                if let Some(f) = f {
                    f();
                }
            }
        });
    }
}

/// Shared liveness flag for one node.
///
/// Cloned into completion callbacks and child registrations; once killed,
/// late callbacks become no-ops.
#[derive(Clone, Debug)]
pub struct Liveness(Rc<Cell<bool>>);

impl Liveness {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.0.get()
    }

    pub fn kill(&self) {
        self.0.set(false);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}
