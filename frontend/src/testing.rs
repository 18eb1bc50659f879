//! In-memory DOM used by the unit tests
//!
//! Pointer-down events are dispatched on the element first and then bubble to the
//! document, the way the browser delivers them.

use crate::dataflow::Subscription;
use crate::dom::{Container, EventSource, PointerEvent, PointerEventKind, PointerHandler};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

type ListenerList = Rc<RefCell<Vec<(u64, PointerEventKind, PointerHandler<NodeId>)>>>;

#[derive(Clone, Default)]
pub struct FakeEventSource {
    listeners: ListenerList,
    next_listener_id: Rc<Cell<u64>>,
}

impl FakeEventSource {
    pub fn dispatch(&self, event: &PointerEvent<NodeId>) {
        let handlers: Vec<PointerHandler<NodeId>> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, kind, _)| *kind == event.kind)
            .map(|(_, _, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(event);
        }
    }

    pub fn listener_count(&self, kind: PointerEventKind) -> usize {
        self.listeners.borrow().iter().filter(|(_, listener_kind, _)| *listener_kind == kind).count()
    }

    pub fn total_listeners(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl EventSource for FakeEventSource {
    type Target = NodeId;

    fn listen(&self, kind: PointerEventKind, handler: PointerHandler<NodeId>) -> Subscription {
        let id = self.next_listener_id.get();
        self.next_listener_id.set(id + 1);
        self.listeners.borrow_mut().push((id, kind, handler));

        let listeners = Rc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.borrow_mut().retain(|(listener_id, _, _)| *listener_id != id);
            }
        })
    }
}

#[derive(Clone)]
pub struct FakeElement {
    pub node: NodeId,
    descendants: Rc<Vec<NodeId>>,
    pub events: FakeEventSource,
    style: Rc<RefCell<HashMap<&'static str, String>>>,
}

impl FakeElement {
    pub fn new(node: NodeId, descendants: Vec<NodeId>) -> Self {
        Self {
            node,
            descendants: Rc::new(descendants),
            events: FakeEventSource::default(),
            style: Rc::default(),
        }
    }

    pub fn style(&self, property: &str) -> Option<String> {
        self.style.borrow().get(property).cloned()
    }
}

impl EventSource for FakeElement {
    type Target = NodeId;

    fn listen(&self, kind: PointerEventKind, handler: PointerHandler<NodeId>) -> Subscription {
        self.events.listen(kind, handler)
    }
}

impl Container for FakeElement {
    fn contains(&self, target: &NodeId) -> bool {
        *target == self.node || self.descendants.contains(target)
    }

    fn set_style_px(&self, property: &'static str, value: f64) {
        self.style.borrow_mut().insert(property, format!("{value}px"));
    }
}

/// Document plus helpers that mimic a user driving the pointer.
#[derive(Clone, Default)]
pub struct FakeDom {
    pub document: FakeEventSource,
}

impl FakeDom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press_on(&self, element: &FakeElement, page_x: f64, page_y: f64) {
        let event = PointerEvent::new(PointerEventKind::Down, page_x, page_y).with_target(element.node);
        element.events.dispatch(&event);
        self.document.dispatch(&event);
    }

    pub fn press_outside(&self, node: NodeId, page_x: f64, page_y: f64) {
        let event = PointerEvent::new(PointerEventKind::Down, page_x, page_y).with_target(node);
        self.document.dispatch(&event);
    }

    pub fn move_to(&self, page_x: f64, page_y: f64) {
        self.document.dispatch(&PointerEvent::new(PointerEventKind::Move, page_x, page_y));
    }

    pub fn release(&self, page_x: f64, page_y: f64) {
        self.document.dispatch(&PointerEvent::new(PointerEventKind::Up, page_x, page_y));
    }
}
