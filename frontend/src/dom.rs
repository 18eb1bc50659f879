//! DOM-like seams used by the drag controller
//!
//! The controller only needs pointer listeners, a containment test and two style
//! writes. The browser implementation lives in `web`; tests use `testing`.

use crate::dataflow::Subscription;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
}

impl PointerEventKind {
    /// Browser event name for this kind.
    pub fn event_name(self) -> &'static str {
        match self {
            PointerEventKind::Down => "mousedown",
            PointerEventKind::Move => "mousemove",
            PointerEventKind::Up => "mouseup",
        }
    }
}

/// Pointer event in page coordinates. `target` is the node that received it.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerEvent<T> {
    pub kind: PointerEventKind,
    pub page_x: f64,
    pub page_y: f64,
    pub target: Option<T>,
}

impl<T> PointerEvent<T> {
    pub fn new(kind: PointerEventKind, page_x: f64, page_y: f64) -> Self {
        Self {
            kind,
            page_x,
            page_y,
            target: None,
        }
    }

    pub fn with_target(mut self, target: T) -> Self {
        self.target = Some(target);
        self
    }
}

pub type PointerHandler<T> = Rc<dyn Fn(&PointerEvent<T>)>;

/// Something pointer listeners can be attached to.
pub trait EventSource {
    /// Node type carried in `PointerEvent::target`.
    type Target: 'static;

    /// Attach `handler` for `kind`; the listener is removed when the returned
    /// subscription is released.
    fn listen(&self, kind: PointerEventKind, handler: PointerHandler<Self::Target>) -> Subscription;
}

/// The element being dragged.
pub trait Container: EventSource {
    fn contains(&self, target: &Self::Target) -> bool;

    /// Write `value` in pixels into the style property `property` (`left`/`top`).
    fn set_style_px(&self, property: &'static str, value: f64);
}

/// Exclusively owned, optional handle to the container element.
///
/// Bound once when the owning component is inserted and released when it is
/// removed. Reading it while unbound yields `None`.
pub struct ContainerRef<C> {
    slot: Rc<RefCell<Slot<C>>>,
}

struct Slot<C> {
    element: Option<C>,
    was_bound: bool,
}

impl<C> Clone for ContainerRef<C> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<C> Default for ContainerRef<C> {
    fn default() -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot {
                element: None,
                was_bound: false,
            })),
        }
    }
}

impl<C> ContainerRef<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&self, element: C) {
        let mut slot = self.slot.borrow_mut();
        slot.element = Some(element);
        slot.was_bound = true;
    }

    pub fn release(&self) -> Option<C> {
        self.slot.borrow_mut().element.take()
    }

    pub fn is_bound(&self) -> bool {
        self.slot.borrow().element.is_some()
    }

    /// Whether an element has ever been bound, including one since released.
    pub fn was_bound(&self) -> bool {
        self.slot.borrow().was_bound
    }

    /// Run `f` against the bound element. Unbound is a silent `None`.
    pub fn with<U>(&self, f: impl FnOnce(&C) -> U) -> Option<U> {
        self.slot.borrow().element.as_ref().map(f)
    }
}

impl<C> ContainerRef<C>
where
    C: Clone,
{
    pub fn get(&self) -> Option<C> {
        self.slot.borrow().element.clone()
    }
}

impl<C> fmt::Debug for ContainerRef<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.borrow();
        f.debug_struct("ContainerRef")
            .field("bound", &slot.element.is_some())
            .field("was_bound", &slot.was_bound)
            .finish()
    }
}
