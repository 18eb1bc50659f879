//! Drag controller and property synchronizer wired together the way a
//! draggable/resizable component uses them.
//!
//! Position cells are shared, so a drag emits `update:x` / `update:y` through
//! the synchronizer. The element activates on press and deactivates on a press
//! anywhere outside it.

use crate::dom::{Container, EventSource};
use crate::dragging::{DragController, DragOptions};
use crate::property_sync::{ExternalProps, SyncEvent, SyncedProperties, watch_properties};
use draggable_shared::DragSection;

pub struct DraggableElement<D, C> {
    pub properties: SyncedProperties,
    pub controller: DragController<D, C>,
}

impl<D, C> DraggableElement<D, C>
where
    D: EventSource + 'static,
    C: Container<Target = D::Target> + Clone + 'static,
{
    pub fn new(document: D, drag: &DragSection, props: &ExternalProps, emit: impl Fn(SyncEvent) + 'static) -> Self {
        let properties = watch_properties(props, emit);

        let options = DragOptions::from_config(drag, &properties.enable)
            .x(properties.left.clone())
            .y(properties.top.clone())
            .on_press({
                let set_enable = properties.set_enable.clone();
                move || set_enable.set(true)
            })
            .on_drag_start({
                let set_dragging = properties.set_dragging.clone();
                move |_| set_dragging.set(true)
            })
            .on_drag_end({
                let set_dragging = properties.set_dragging.clone();
                move |_| set_dragging.set(false)
            })
            .on_unselect({
                let set_enable = properties.set_enable.clone();
                move || set_enable.set(false)
            });

        Self {
            controller: DragController::new(document, options),
            properties,
        }
    }

    /// Bind the element and attach listeners.
    pub fn mount(&self, element: C) {
        self.controller.container_ref().bind(element);
        self.controller.mount();
    }

    /// Detach listeners and release the element.
    pub fn unmount(&self) {
        self.controller.unmount();
        self.controller.container_ref().release();
    }

    pub fn activate(&self) {
        self.properties.set_enable.set(true);
    }
}
