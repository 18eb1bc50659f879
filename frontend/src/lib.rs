//! Reactive helpers for draggable/resizable UI elements
//!
//! - [`dragging`] turns pointer events on a container into position updates
//! - [`property_sync`] mirrors parent-owned properties into internal state
//! - [`draggable_element`] wires both together for a component
//!
//! Both helpers sit on the [`dataflow`] primitives and the [`dom`] seams; the
//! browser implementation of those seams lives in `web` (wasm32 only).

pub mod dataflow;
pub mod dom;
pub mod draggable_element;
pub mod dragging;
pub mod property_sync;

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(test)]
pub(crate) mod testing;

pub use draggable_shared::{DragSection, DraggableConfig, LayoutSection, Position};
pub use draggable_element::DraggableElement;
pub use dragging::{DragController, DragOptions, DragSession};
pub use property_sync::{ExternalProps, SyncEvent, SyncedProperties, watch_properties};
