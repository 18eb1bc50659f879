//! Browser bindings for the drag controller
//!
//! Listeners are plain `addEventListener` registrations backed by
//! `wasm-bindgen` closures. Releasing the subscription removes the listener; the
//! closure itself is freed on the next task because it may be the one running.

use crate::dataflow::Subscription;
use crate::dom::{Container, EventSource, PointerEvent, PointerEventKind, PointerHandler};
use crate::dragging::DragController;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use zoon::*;

pub type WebDragController = DragController<DocumentElement, HtmlContainer>;

fn listen_on(target: &web_sys::EventTarget, kind: PointerEventKind, handler: PointerHandler<web_sys::Node>) -> Subscription {
    let closure = Closure::<dyn Fn(web_sys::MouseEvent)>::new(move |event: web_sys::MouseEvent| {
        let target = event.target().and_then(|target| target.dyn_into::<web_sys::Node>().ok());
        handler(&PointerEvent {
            kind,
            page_x: f64::from(event.page_x()),
            page_y: f64::from(event.page_y()),
            target,
        });
    });

    if let Err(error) = target.add_event_listener_with_callback(kind.event_name(), closure.as_ref().unchecked_ref()) {
        zoon::eprintln!("Failed to add '{}' listener: {:?}", kind.event_name(), error);
        return Subscription::empty();
    }

    let target = target.clone();
    Subscription::new(move || {
        if let Err(error) = target.remove_event_listener_with_callback(kind.event_name(), closure.as_ref().unchecked_ref()) {
            zoon::eprintln!("Failed to remove '{}' listener: {:?}", kind.event_name(), error);
        }
        Task::start(async move {
            drop(closure);
        });
    })
}

/// `document.documentElement`, the target for document-wide pointer listeners.
#[derive(Clone, Debug)]
pub struct DocumentElement {
    element: web_sys::Element,
}

impl DocumentElement {
    pub fn current() -> Option<Self> {
        let element = web_sys::window()?.document()?.document_element()?;
        Some(Self { element })
    }
}

impl EventSource for DocumentElement {
    type Target = web_sys::Node;

    fn listen(&self, kind: PointerEventKind, handler: PointerHandler<web_sys::Node>) -> Subscription {
        listen_on(self.element.as_ref(), kind, handler)
    }
}

/// The draggable DOM element.
#[derive(Clone, Debug)]
pub struct HtmlContainer {
    element: web_sys::HtmlElement,
}

impl HtmlContainer {
    pub fn new(element: web_sys::HtmlElement) -> Self {
        Self { element }
    }
}

impl EventSource for HtmlContainer {
    type Target = web_sys::Node;

    fn listen(&self, kind: PointerEventKind, handler: PointerHandler<web_sys::Node>) -> Subscription {
        listen_on(self.element.as_ref(), kind, handler)
    }
}

impl Container for HtmlContainer {
    fn contains(&self, target: &web_sys::Node) -> bool {
        self.element.contains(Some(target))
    }

    fn set_style_px(&self, property: &'static str, value: f64) {
        if let Err(error) = self.element.style().set_property(property, &format!("{value}px")) {
            zoon::eprintln!("Failed to set style '{}': {:?}", property, error);
        }
    }
}

/// Absolutely positioned wrapper that binds `controller` to its DOM element for
/// as long as the element is in the document.
pub fn draggable_container(controller: WebDragController, child: impl Element) -> impl Element {
    El::new()
        .update_raw_el(|raw_el| raw_el.style("position", "absolute"))
        .child(child)
        .after_insert({
            let controller = controller.clone();
            move |element: web_sys::HtmlElement| {
                controller.container_ref().bind(HtmlContainer::new(element));
                controller.mount();
            }
        })
        .after_remove(move |_| {
            controller.unmount();
            controller.container_ref().release();
        })
}
